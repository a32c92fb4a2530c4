//! Summary, calendar and agenda commands.

use chrono::Datelike;
use serde::Serialize;

use crate::calendar::{self, MonthGrid, Snapshot, Summary};
use crate::error::{Error, Result};
use crate::model::parse_date;
use crate::output::{emit_success, emit_text, HumanOutput};

use super::Globals;

pub struct CalendarOptions {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub fn run_summary(globals: &Globals) -> Result<()> {
    let ctx = globals.context()?;
    let snapshot = Snapshot::load(&ctx)?;
    let summary = calendar::summarize(&snapshot, ctx.today, ctx.config.calendar.upcoming_days);

    let mut human = HumanOutput::new(format!("eventops summary: {}", summary.today));
    push_summary_lines(&mut human, &summary);
    if summary.overdue_tasks > 0 {
        human.push_warning(format!("{} task(s) overdue", summary.overdue_tasks));
        human.push_next_step("eventops task list --status \"In progress\"");
    }

    emit_success(globals.output, "summary", &summary, Some(&human))
}

fn push_summary_lines(human: &mut HumanOutput, summary: &Summary) {
    human.push_summary("events", summary.total_events.to_string());
    human.push_summary("ongoing", summary.ongoing.to_string());
    human.push_summary(
        format!("upcoming ({} days)", summary.upcoming_days),
        summary.upcoming.to_string(),
    );
    human.push_summary("overdue tasks", summary.overdue_tasks.to_string());
}

#[derive(Serialize)]
struct CalendarReport {
    summary: Summary,
    #[serde(flatten)]
    grid: MonthGrid,
}

pub fn run_calendar(globals: &Globals, options: CalendarOptions) -> Result<()> {
    let ctx = globals.context()?;
    let year = options.year.unwrap_or_else(|| ctx.today.year());
    let month = options.month.unwrap_or_else(|| ctx.today.month());
    calendar::validate_month(year, month)?;

    let snapshot = Snapshot::load(&ctx)?;
    let grid = calendar::month_grid(
        &snapshot,
        year,
        month,
        ctx.today,
        ctx.config.calendar.max_items_per_day,
    )?;
    let summary = calendar::summarize(&snapshot, ctx.today, ctx.config.calendar.upcoming_days);
    let text = calendar::render_month_text(&grid);
    let (prev_year, prev_month) = calendar::shift_month(year, month, -1);
    let (next_year, next_month) = calendar::shift_month(year, month, 1);
    let footer = format!(
        "previous: eventops calendar --year {prev_year} --month {prev_month}\nnext:     eventops calendar --year {next_year} --month {next_month}"
    );

    let report = CalendarReport { summary, grid };
    emit_text(
        globals.output,
        "calendar",
        &report,
        &format!("{text}\n\n{footer}"),
    )
}

pub fn run_agenda(globals: &Globals, date: Option<&str>) -> Result<()> {
    let ctx = globals.context()?;
    let day = match date {
        Some(raw) => parse_date(raw).ok_or_else(|| {
            Error::InvalidArgument(format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
        })?,
        None => ctx.today,
    };

    let snapshot = Snapshot::load(&ctx)?;
    let agenda = calendar::agenda(&snapshot, day);
    let lines = calendar::agenda_lines(&agenda);
    emit_text(globals.output, "agenda", &agenda, &lines.join("\n"))
}
