//! Student command handlers.

use std::fmt::Write as _;

use rollcall_api::{NewStudent, Student, StudentFilter, StudentUpdate};
use tabled::Tabled;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::{StudentFields, StudentsArgs, StudentsCommand};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct StudentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Roll")]
    roll: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Active")]
    active: String,
}

impl From<&Student> for StudentRow {
    fn from(s: &Student) -> Self {
        Self {
            id: s.id,
            roll: s.student_id.clone(),
            name: s.full_name(),
            class: s
                .class_name
                .clone()
                .or_else(|| s.class_id.map(|id| id.to_string()))
                .unwrap_or_else(|| "-".into()),
            active: output::yes_no(s.is_active),
        }
    }
}

fn detail(s: &Student) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:            {}", s.id);
    let _ = writeln!(out, "Roll:          {}", s.student_id);
    let _ = writeln!(out, "Name:          {}", s.full_name());
    let _ = writeln!(
        out,
        "Class:         {}",
        util::or_dash(s.class_name.as_deref())
    );
    let _ = writeln!(out, "Email:         {}", util::or_dash(s.email.as_deref()));
    let _ = writeln!(out, "Phone:         {}", util::or_dash(s.phone.as_deref()));
    let _ = writeln!(
        out,
        "Date of birth: {}",
        util::or_dash(s.date_of_birth.as_deref())
    );
    let _ = writeln!(out, "Gender:        {}", util::or_dash(s.gender.as_deref()));
    let _ = writeln!(out, "Address:       {}", util::or_dash(s.address.as_deref()));
    let _ = writeln!(
        out,
        "Parent:        {}",
        util::or_dash(s.parent_name.as_deref())
    );
    let _ = writeln!(
        out,
        "Parent phone:  {}",
        util::or_dash(s.parent_phone.as_deref())
    );
    let _ = writeln!(
        out,
        "Parent email:  {}",
        util::or_dash(s.parent_email.as_deref())
    );
    let _ = write!(out, "Active:        {}", output::yes_no(s.is_active));
    out
}

fn render_students(ctx: &Context<'_>, students: &[Student]) {
    let out = output::render_list(&ctx.global.output, students, |s| StudentRow::from(s), |s| {
        s.id.to_string()
    });
    output::print_output(&out, ctx.global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context<'_>, args: StudentsArgs) -> Result<(), CliError> {
    let students = ctx.require_login()?.students();
    let global = ctx.global;

    match args.command {
        StudentsCommand::List { class, search } => {
            let filter = StudentFilter {
                class_id: class,
                search,
            };
            let all = util::settle(students.list(&filter).await)?;
            render_students(ctx, &all);
            Ok(())
        }

        StudentsCommand::Show { id } => {
            let student = util::settle(students.get(id).await)?;
            let out =
                output::render_single(&global.output, &student, detail, |s| s.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StudentsCommand::Create {
            roll,
            first_name,
            last_name,
            fields,
        } => {
            let StudentFields {
                class,
                email,
                phone,
                date_of_birth,
                gender,
                address,
                parent_name,
                parent_phone,
                parent_email,
            } = fields;
            let new = NewStudent {
                student_id: roll,
                first_name,
                last_name,
                email: util::non_blank(email),
                phone: util::non_blank(phone),
                date_of_birth: util::non_blank(date_of_birth),
                gender: util::non_blank(gender),
                address: util::non_blank(address),
                class_id: class,
                parent_name: util::non_blank(parent_name),
                parent_phone: util::non_blank(parent_phone),
                parent_email: util::non_blank(parent_email),
            };
            let student = util::settle(students.create(&new).await)?;
            output::print_status(
                &format!("✓ Student {} ({}) created", student.id, student.full_name()),
                global.quiet,
            );
            Ok(())
        }

        StudentsCommand::Update {
            id,
            first_name,
            last_name,
            active,
            fields,
        } => {
            let update = StudentUpdate {
                first_name: util::non_blank(first_name),
                last_name: util::non_blank(last_name),
                email: fields.email,
                phone: fields.phone,
                date_of_birth: fields.date_of_birth,
                gender: fields.gender,
                address: fields.address,
                class_id: fields.class,
                parent_name: fields.parent_name,
                parent_phone: fields.parent_phone,
                parent_email: fields.parent_email,
                is_active: active,
            };
            let student = util::settle(students.update(id, &update).await)?;
            output::print_status(&format!("✓ Student {} updated", student.id), global.quiet);
            Ok(())
        }

        StudentsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete student {id}?"), global.yes)? {
                return Ok(());
            }
            let ack = util::settle(students.delete(id).await)?;
            output::print_status(&format!("✓ {}", ack.message), global.quiet);
            Ok(())
        }

        StudentsCommand::Search => search_stdin(ctx).await,
    }
}

/// Feed stdin lines to a debounced search and render the freshest result.
///
/// Intermediate results are reported on stderr as they land.
async fn search_stdin(ctx: &Context<'_>) -> Result<(), CliError> {
    let search = ctx.portal.student_search();

    let mut updates = search.subscribe();
    let quiet = ctx.global.quiet;
    let progress = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            if let Some(result) = snapshot {
                let summary = match &result.outcome {
                    rollcall_api::Outcome::Success { data } => format!("{} match(es)", data.len()),
                    rollcall_api::Outcome::Error { message } => message.clone(),
                    rollcall_api::Outcome::Loading => continue,
                };
                output::print_status(&format!("  '{}': {summary}", result.term), quiet);
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        search.submit(line.trim());
    }

    search.settled().await;
    progress.abort();

    match search.latest() {
        Some(result) => {
            let found = util::settle(result.outcome.clone())?;
            render_students(ctx, &found);
            Ok(())
        }
        None => Ok(()),
    }
}
