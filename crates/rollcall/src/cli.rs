//! Clap derive structures for the `rollcall` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rollcall_api::{AttendanceStatus, Role};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// rollcall -- classes, students and attendance from the command line
#[derive(Debug, Parser)]
#[command(
    name = "rollcall",
    version,
    about = "Manage classes, students and attendance from the command line",
    long_about = "A command-line client for the school-management backend.\n\n\
        Sign in once with `rollcall login`; the session is kept on disk\n\
        until `rollcall logout`.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "ROLLCALL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, short = 'S', env = "ROLLCALL_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ROLLCALL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "ROLLCALL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "ROLLCALL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and keep the session
    Login(LoginArgs),

    /// End the session (always clears it locally)
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Show the cached identity without contacting the server
        #[arg(long)]
        cached: bool,
    },

    /// Create a new account
    Register(RegisterArgs),

    /// Change the signed-in user's password
    Password,

    /// Manage classes
    #[command(alias = "cls")]
    Classes(ClassesArgs),

    /// Manage students
    #[command(alias = "st")]
    Students(StudentsArgs),

    /// View and record attendance
    #[command(alias = "att")]
    Attendance(AttendanceArgs),

    /// Show dashboard statistics
    Dashboard,

    /// View notifications
    Notifications(NotificationsArgs),

    /// View and manage user accounts
    Users(UsersArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (defaults to the profile's email)
    #[arg(long, short = 'e')]
    pub email: Option<String>,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Account email
    #[arg(long, short = 'e')]
    pub email: String,

    /// Full name
    #[arg(long)]
    pub name: String,

    /// Account role
    #[arg(long, default_value = "teacher")]
    pub role: Role,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLASSES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ClassesArgs {
    #[command(subcommand)]
    pub command: ClassesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClassesCommand {
    /// List classes
    #[command(alias = "ls")]
    List,

    /// Show class details
    Show {
        /// Class ID
        id: i64,
    },

    /// Create a class
    Create {
        /// Class name
        #[arg(long)]
        name: String,

        #[command(flatten)]
        fields: ClassFields,
    },

    /// Update a class
    Update {
        /// Class ID
        id: i64,

        /// New class name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: ClassFields,
    },

    /// Delete a class
    #[command(alias = "rm")]
    Delete {
        /// Class ID
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct ClassFields {
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub grade_level: Option<String>,

    #[arg(long)]
    pub academic_year: Option<String>,

    /// Teacher's user ID
    #[arg(long)]
    pub teacher: Option<i64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STUDENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StudentsArgs {
    #[command(subcommand)]
    pub command: StudentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum StudentsCommand {
    /// List students
    #[command(alias = "ls")]
    List {
        /// Only students in this class
        #[arg(long, short = 'c')]
        class: Option<i64>,

        /// Free-text search term
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show student details
    Show {
        /// Student ID
        id: i64,
    },

    /// Create a student
    Create {
        /// School-issued roll number
        #[arg(long)]
        roll: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[command(flatten)]
        fields: StudentFields,
    },

    /// Update a student
    Update {
        /// Student ID
        id: i64,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        /// Mark the student active or inactive
        #[arg(long)]
        active: Option<bool>,

        #[command(flatten)]
        fields: StudentFields,
    },

    /// Delete a student
    #[command(alias = "rm")]
    Delete {
        /// Student ID
        id: i64,
    },

    /// Search as you type: reads terms from stdin, one per line, and
    /// prints the result for the last one to settle
    Search,
}

#[derive(Debug, Args)]
pub struct StudentFields {
    /// Class ID
    #[arg(long, short = 'c')]
    pub class: Option<i64>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub date_of_birth: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    #[arg(long)]
    pub parent_name: Option<String>,

    #[arg(long)]
    pub parent_phone: Option<String>,

    #[arg(long)]
    pub parent_email: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ATTENDANCE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AttendanceArgs {
    #[command(subcommand)]
    pub command: AttendanceCommand,
}

#[derive(Debug, Subcommand)]
pub enum AttendanceCommand {
    /// Show a class's attendance
    Show {
        /// Class ID
        #[arg(long, short = 'c')]
        class: i64,

        /// Limit to one day (YYYY-MM-DD)
        #[arg(long, short = 'd')]
        date: Option<NaiveDate>,
    },

    /// Show a student's attendance history
    History {
        /// Student ID
        student: i64,
    },

    /// Mark a whole class in one submission
    Mark(MarkArgs),
}

#[derive(Debug, Args)]
pub struct MarkArgs {
    /// Class ID
    #[arg(long, short = 'c')]
    pub class: Option<i64>,

    /// Day to mark (defaults to today)
    #[arg(long, short = 'd')]
    pub date: Option<NaiveDate>,

    /// Status for students not listed below (defaults to the profile's)
    #[arg(long)]
    pub default_status: Option<AttendanceStatus>,

    /// Student IDs to mark absent
    #[arg(long, value_delimiter = ',')]
    pub absent: Vec<i64>,

    /// Student IDs to mark late
    #[arg(long, value_delimiter = ',')]
    pub late: Vec<i64>,

    /// Student IDs to mark excused
    #[arg(long, value_delimiter = ',')]
    pub excused: Vec<i64>,

    /// Student IDs to mark present (when the default is something else)
    #[arg(long, value_delimiter = ',')]
    pub present: Vec<i64>,

    /// Note for a student, as ID=TEXT (repeatable)
    #[arg(long = "note", value_name = "ID=TEXT")]
    pub notes: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NOTIFICATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// List notifications
    #[command(alias = "ls")]
    List {
        /// Only unread notifications
        #[arg(long, short = 'u')]
        unread: bool,
    },

    /// Mark a notification as read
    Read {
        /// Notification ID
        id: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List user accounts
    #[command(alias = "ls")]
    List,

    /// Show a user account
    Show {
        /// User ID
        id: i64,
    },

    /// Update a user account
    Update {
        /// User ID
        id: i64,

        #[arg(long)]
        name: Option<String>,

        /// Enable or disable the account
        #[arg(long)]
        active: Option<bool>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Set a value on the active profile
    Set {
        /// Profile key (e.g. server, email, timeout, default_status)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the account password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
