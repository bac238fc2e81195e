//! Notification command handlers.

use rollcall_api::Notification;
use tabled::Tabled;

use crate::cli::{NotificationsArgs, NotificationsCommand};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "")]
    unread: &'static str,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Received")]
    received: String,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            unread: if n.is_read { "" } else { "●" },
            title: n.title.clone(),
            message: n.message.clone(),
            received: util::or_dash(n.created_at.as_deref()),
        }
    }
}

pub async fn handle(ctx: &Context<'_>, args: NotificationsArgs) -> Result<(), CliError> {
    let notifications = ctx.require_login()?.notifications();
    let global = ctx.global;

    match args.command {
        NotificationsCommand::List { unread } => {
            let mut all = util::settle(notifications.list().await)?;
            if unread {
                all.retain(|n| !n.is_read);
            }
            let out = output::render_list(&global.output, &all, |n| NotificationRow::from(n), |n| {
                n.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        NotificationsCommand::Read { id } => {
            let ack = util::settle(notifications.mark_read(id).await)?;
            output::print_status(&format!("✓ {}", ack.message), global.quiet);
            Ok(())
        }
    }
}
