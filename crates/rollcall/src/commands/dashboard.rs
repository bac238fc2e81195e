//! Dashboard command handler.

use std::fmt::Write as _;

use rollcall_api::DashboardStats;

use crate::error::CliError;
use crate::output;

use super::{Context, util};

fn detail(stats: &DashboardStats) -> String {
    let today = &stats.attendance_today;
    let mut out = String::new();
    let _ = writeln!(out, "Students:  {}", stats.total_students);
    let _ = writeln!(out, "Classes:   {}", stats.total_classes);
    let _ = writeln!(out, "Teachers:  {}", stats.total_teachers);
    let _ = writeln!(out);
    let _ = writeln!(out, "Today ({} marked)", today.total());
    let _ = writeln!(out, "  present  {}", today.present);
    let _ = writeln!(out, "  absent   {}", today.absent);
    let _ = writeln!(out, "  late     {}", today.late);
    let _ = write!(out, "  excused  {}", today.excused);
    out
}

pub async fn handle(ctx: &Context<'_>) -> Result<(), CliError> {
    let stats = util::settle(ctx.require_login()?.dashboard().stats().await)?;
    let out = output::render_single(&ctx.global.output, &stats, detail, |s| {
        format!(
            "{}\t{}\t{}",
            s.total_students, s.total_classes, s.total_teachers
        )
    });
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
