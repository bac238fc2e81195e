//! Attendance command handlers.

use rollcall_api::{AttendanceEntry, AttendanceStatus, StudentFilter, StudentId};
use rollcall_core::AttendanceSheet;
use tabled::Tabled;

use crate::cli::{AttendanceArgs, AttendanceCommand, MarkArgs};
use crate::error::CliError;
use crate::output;

use super::{Context, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Student")]
    student: String,
    #[tabled(rename = "Class")]
    class: i64,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Notes")]
    notes: String,
}

impl EntryRow {
    fn new(e: &AttendanceEntry, color: bool) -> Self {
        Self {
            date: e.date.to_string(),
            student: e
                .student_name
                .clone()
                .unwrap_or_else(|| e.student_id.to_string()),
            class: e.class_id,
            status: output::paint_status(e.status, color),
            notes: e.notes.clone().unwrap_or_default(),
        }
    }
}

fn render_entries(ctx: &Context<'_>, entries: &[AttendanceEntry]) {
    let color = output::should_color(&ctx.global.color);
    let out = output::render_list(
        &ctx.global.output,
        entries,
        |e| EntryRow::new(e, color),
        |e| format!("{}\t{}\t{}", e.date, e.student_id, e.status),
    );
    output::print_output(&out, ctx.global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context<'_>, args: AttendanceArgs) -> Result<(), CliError> {
    let client = ctx.require_login()?;

    match args.command {
        AttendanceCommand::Show { class, date } => {
            let entries = util::settle(client.attendance().for_class(class, date).await)?;
            render_entries(ctx, &entries);
            Ok(())
        }

        AttendanceCommand::History { student } => {
            let entries = util::settle(client.attendance().for_student(student).await)?;
            render_entries(ctx, &entries);
            Ok(())
        }

        AttendanceCommand::Mark(mark) => mark_class(ctx, mark).await,
    }
}

/// Parse `ID=TEXT` note arguments.
fn parse_note(raw: &str) -> Result<(StudentId, String), CliError> {
    let invalid = || CliError::Validation {
        field: "note".into(),
        reason: format!("expected ID=TEXT, got '{raw}'"),
    };
    let (id, text) = raw.split_once('=').ok_or_else(invalid)?;
    let id = id.trim().parse().map_err(|_| invalid())?;
    Ok((id, text.to_owned()))
}

/// Build the class's sheet from its roster, apply the flags, and submit it
/// as one bulk write.
async fn mark_class(ctx: &Context<'_>, args: MarkArgs) -> Result<(), CliError> {
    let client = ctx.client();
    let global = ctx.global;

    let roster = match args.class {
        Some(class_id) => util::settle(
            client
                .students()
                .list(&StudentFilter::in_class(class_id))
                .await,
        )?,
        None => Vec::new(),
    };

    let mut sheet = match args.default_status {
        Some(status) => AttendanceSheet::for_roster(args.class, &roster, status),
        None => ctx.portal.attendance_sheet(args.class, &roster),
    };
    if let Some(date) = args.date {
        sheet = sheet.with_date(date);
    }

    let groups = [
        (&args.present, AttendanceStatus::Present),
        (&args.absent, AttendanceStatus::Absent),
        (&args.late, AttendanceStatus::Late),
        (&args.excused, AttendanceStatus::Excused),
    ];
    for (ids, status) in groups {
        for id in ids {
            if !sheet.mark(*id, status) {
                return Err(not_on_roster(*id));
            }
        }
    }
    for raw in &args.notes {
        let (id, text) = parse_note(raw)?;
        if !sheet.note(id, text) {
            return Err(not_on_roster(id));
        }
    }

    if !sheet.is_empty() {
        let tally = sheet.tally();
        let prompt = format!(
            "Submit attendance for {} students on {} ({} present, {} absent, {} late, {} excused)?",
            sheet.len(),
            sheet.date(),
            tally.present,
            tally.absent,
            tally.late,
            tally.excused
        );
        if !util::confirm(&prompt, global.yes)? {
            return Ok(());
        }
    }

    let ack = util::settle(sheet.submit(client.attendance()).await)?;
    output::print_status(&format!("✓ {}", ack.message), global.quiet);
    Ok(())
}

fn not_on_roster(id: StudentId) -> CliError {
    CliError::Validation {
        field: "student".into(),
        reason: format!("student {id} is not in this class"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn note_splits_on_first_equals() {
        let (id, text) = parse_note("12=left early = sick").unwrap();
        assert_eq!(id, 12);
        assert_eq!(text, "left early = sick");
    }

    #[test]
    fn note_needs_numeric_id() {
        assert!(parse_note("ada=late bus").is_err());
        assert!(parse_note("no separator").is_err());
    }
}
