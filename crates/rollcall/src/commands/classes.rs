//! Class command handlers.

use std::fmt::Write as _;

use rollcall_api::{ClassRecord, ClassUpdate, NewClass};
use tabled::Tabled;

use crate::cli::{ClassFields, ClassesArgs, ClassesCommand};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClassRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Grade")]
    grade: String,
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "Students")]
    students: u32,
}

impl From<&ClassRecord> for ClassRow {
    fn from(c: &ClassRecord) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            grade: util::or_dash(c.grade_level.as_deref()),
            year: util::or_dash(c.academic_year.as_deref()),
            students: c.student_count,
        }
    }
}

fn detail(c: &ClassRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:          {}", c.id);
    let _ = writeln!(out, "Name:        {}", c.name);
    let _ = writeln!(out, "Description: {}", util::or_dash(c.description.as_deref()));
    let _ = writeln!(out, "Grade:       {}", util::or_dash(c.grade_level.as_deref()));
    let _ = writeln!(out, "Year:        {}", util::or_dash(c.academic_year.as_deref()));
    let _ = writeln!(
        out,
        "Teacher:     {}",
        c.teacher_id.map_or_else(|| "-".into(), |id| id.to_string())
    );
    let _ = write!(out, "Students:    {}", c.student_count);
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context<'_>, args: ClassesArgs) -> Result<(), CliError> {
    let classes = ctx.require_login()?.classes();
    let global = ctx.global;

    match args.command {
        ClassesCommand::List => {
            let all = util::settle(classes.list().await)?;
            let out = output::render_list(&global.output, &all, |c| ClassRow::from(c), |c| {
                c.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClassesCommand::Show { id } => {
            let class = util::settle(classes.get(id).await)?;
            let out = output::render_single(&global.output, &class, detail, |c| c.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClassesCommand::Create { name, fields } => {
            let ClassFields {
                description,
                grade_level,
                academic_year,
                teacher,
            } = fields;
            let new = NewClass {
                name,
                description: util::non_blank(description),
                grade_level: util::non_blank(grade_level),
                academic_year: util::non_blank(academic_year),
                teacher_id: teacher,
            };
            let class = util::settle(classes.create(&new).await)?;
            output::print_status(&format!("✓ Class {} created", class.id), global.quiet);
            Ok(())
        }

        ClassesCommand::Update { id, name, fields } => {
            let update = ClassUpdate {
                name: util::non_blank(name),
                description: fields.description,
                grade_level: fields.grade_level,
                academic_year: fields.academic_year,
                teacher_id: fields.teacher,
            };
            let class = util::settle(classes.update(id, &update).await)?;
            output::print_status(&format!("✓ Class {} updated", class.id), global.quiet);
            Ok(())
        }

        ClassesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete class {id}?"), global.yes)? {
                return Ok(());
            }
            let ack = util::settle(classes.delete(id).await)?;
            output::print_status(&format!("✓ {}", ack.message), global.quiet);
            Ok(())
        }
    }
}
