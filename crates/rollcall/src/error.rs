//! CLI error types with miette diagnostics.
//!
//! Gateways settle every failure into an `Outcome::Error` message; this
//! module turns those messages, and the few assembly errors that can occur
//! before a request is made, into exit codes and actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use rollcall_config::ConfigError;
use rollcall_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Backend ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(rollcall::rejected))]
    Rejected { message: String },

    // ── Session ──────────────────────────────────────────────────────
    #[error("Not logged in")]
    #[diagnostic(
        code(rollcall::not_logged_in),
        help("Sign in first with: rollcall login --profile {profile}")
    )]
    NotLoggedIn { profile: String },

    #[error("Could not open the saved session")]
    #[diagnostic(
        code(rollcall::session),
        help("Check that the session file and its directory are readable and writable.")
    )]
    Session {
        #[source]
        source: CoreError,
    },

    #[error("No password available for profile '{profile}'")]
    #[diagnostic(
        code(rollcall::no_credentials),
        help(
            "Store one with: rollcall config set-password --profile {profile}\n\
             Or set the ROLLCALL_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not set up a client for {url}")]
    #[diagnostic(
        code(rollcall::client_setup),
        help("Check the server URL and TLS settings (ca_cert, --insecure).")
    )]
    ClientSetup {
        url: String,
        #[source]
        source: CoreError,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rollcall::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found")]
    #[diagnostic(
        code(rollcall::no_config),
        help(
            "Create one with: rollcall config init\n\
             Or pass the API root with --server.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(rollcall::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(rollcall::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotLoggedIn { .. } | Self::NoCredentials { .. } | Self::Session { .. } => {
                exit_code::AUTH
            }
            Self::ClientSetup { .. } => exit_code::CONNECTION,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Rejected { .. } | Self::NoConfig { .. } | Self::Config(_) | Self::Io(_) => {
                exit_code::GENERAL
            }
        }
    }
}

// ── Upstream error mapping ───────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::SessionUnavailable { .. } => Self::Session { source: err },
            CoreError::ClientSetup { ref url, .. } => Self::ClientSetup {
                url: url.clone(),
                source: err,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
