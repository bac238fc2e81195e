//! Command dispatch: bridges CLI args -> gateway calls -> output formatting.

pub mod attendance;
pub mod auth;
pub mod classes;
pub mod config_cmd;
pub mod dashboard;
pub mod notifications;
pub mod students;
pub mod users;
pub mod util;

use rollcall_api::SchoolClient;
use rollcall_core::Portal;

use crate::cli::{Command, GlobalOpts};
use crate::config::Profile;
use crate::error::CliError;

/// Everything a server-bound handler needs.
pub struct Context<'a> {
    pub portal: &'a Portal,
    pub profile_name: &'a str,
    pub profile: &'a Profile,
    pub global: &'a GlobalOpts,
}

impl Context<'_> {
    pub fn client(&self) -> &SchoolClient {
        self.portal.client()
    }

    /// Fail early, without a request, when no credential is held.
    pub fn require_login(&self) -> Result<&SchoolClient, CliError> {
        let client = self.client();
        if client.session().has_credential() {
            Ok(client)
        } else {
            Err(CliError::NotLoggedIn {
                profile: self.profile_name.to_owned(),
            })
        }
    }
}

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context<'_>) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(ctx, args).await,
        Command::Logout => auth::logout(ctx).await,
        Command::Whoami { cached } => auth::whoami(ctx, cached).await,
        Command::Register(args) => auth::register(ctx, args).await,
        Command::Password => auth::change_password(ctx).await,
        Command::Classes(args) => classes::handle(ctx, args).await,
        Command::Students(args) => students::handle(ctx, args).await,
        Command::Attendance(args) => attendance::handle(ctx, args).await,
        Command::Dashboard => dashboard::handle(ctx).await,
        Command::Notifications(args) => notifications::handle(ctx, args).await,
        Command::Users(args) => users::handle(ctx, args).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
