//! User account command handlers.

use rollcall_api::{User, UserUpdate};
use tabled::Tabled;

use crate::cli::{UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::auth::user_detail;
use super::{Context, util};

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.full_name.clone(),
            email: u.email.clone(),
            role: u.role.clone(),
            active: output::yes_no(u.is_active),
        }
    }
}

pub async fn handle(ctx: &Context<'_>, args: UsersArgs) -> Result<(), CliError> {
    let auth = ctx.require_login()?.auth();
    let global = ctx.global;

    match args.command {
        UsersCommand::List => {
            let all = util::settle(auth.list_users().await)?;
            let out =
                output::render_list(&global.output, &all, |u| UserRow::from(u), |u| u.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Show { id } => {
            let user = util::settle(auth.get_user(id).await)?;
            let out =
                output::render_single(&global.output, &user, user_detail, |u| u.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Update { id, name, active } => {
            let update = UserUpdate {
                full_name: util::non_blank(name),
                is_active: active,
                ..UserUpdate::default()
            };
            let user = util::settle(auth.update_user(id, &update).await)?;
            output::print_status(&format!("✓ User {} updated", user.id), global.quiet);
            Ok(())
        }
    }
}
