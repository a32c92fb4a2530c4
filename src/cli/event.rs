//! eventops event command implementation

use serde::Serialize;

use crate::error::Result;
use crate::events::{self, EventPatch, NewEvent};
use crate::model::Event;
use crate::output::{emit_success, HumanOutput};

use super::referee::assignment_line;
use super::Globals;

#[derive(Serialize)]
struct EventListReport {
    total: usize,
    events: Vec<Event>,
}

pub(crate) fn event_line(event: &Event) -> String {
    let mut line = format!("#{} {}", event.event_id.trim(), event.event_name.trim());
    if !event.location.trim().is_empty() {
        line.push_str(&format!(" @ {}", event.location.trim()));
    }
    line.push_str(&format!(
        " ({} -> {}) [{}]",
        event.start_date.trim(),
        event.end_date.trim(),
        event.status.trim()
    ));
    line
}

fn push_event_summary(human: &mut HumanOutput, event: &Event) {
    human.push_summary("id", event.event_id.trim());
    human.push_summary("name", event.event_name.trim());
    human.push_summary("location", event.location.trim());
    human.push_summary("dates", format!("{} -> {}", event.start_date.trim(), event.end_date.trim()));
    human.push_summary("status", event.status.trim());
}

pub fn run_list(globals: &Globals, status: Option<&str>) -> Result<()> {
    let ctx = globals.context()?;
    let events = events::list_events(&ctx, status)?;

    let mut human = HumanOutput::new(format!("eventops event list: {} event(s)", events.len()));
    if let Some(status) = status {
        human.push_summary("status", status);
    }
    for event in &events {
        human.push_detail(event_line(event));
    }
    if events.is_empty() {
        human.push_next_step("eventops event new --name <name> --start <date> --end <date>");
    }

    let report = EventListReport {
        total: events.len(),
        events,
    };
    emit_success(globals.output, "event list", &report, Some(&human))
}

pub fn run_show(globals: &Globals, id: &str) -> Result<()> {
    let ctx = globals.context()?;
    let detail = events::show_event(&ctx, id)?;

    let mut human = HumanOutput::new(format!(
        "eventops event show: {}",
        detail.event.event_name.trim()
    ));
    push_event_summary(&mut human, &detail.event);
    human.push_summary("tasks", detail.tasks.len().to_string());
    human.push_summary("files", detail.files.len().to_string());
    human.push_summary("reports", detail.reports.len().to_string());
    human.push_summary("referees", detail.assignments.len().to_string());

    for task in &detail.tasks {
        human.push_detail(format!(
            "task #{} {} (due {}, {})",
            task.task_id.trim(),
            task.task_name.trim(),
            task.due_date.trim(),
            task.status.trim()
        ));
    }
    for file in &detail.files {
        human.push_detail(format!("file #{} {} <{}>", file.file_id.trim(), file.title.trim(), file.link.trim()));
    }
    for report in &detail.reports {
        human.push_detail(format!(
            "report #{} {} <{}>",
            report.report_id.trim(),
            report.title.trim(),
            report.link.trim()
        ));
    }
    for view in &detail.assignments {
        human.push_detail(format!("referee {}", assignment_line(view)));
    }

    emit_success(globals.output, "event show", &detail, Some(&human))
}

pub fn run_new(globals: &Globals, input: NewEvent) -> Result<()> {
    let ctx = globals.context()?;
    let event = events::create_event(&ctx, input)?;

    let mut human = HumanOutput::new(format!("eventops event new: created event {}", event.event_id));
    push_event_summary(&mut human, &event);
    human.push_next_step(format!("eventops event show {}", event.event_id));
    human.push_next_step(format!("eventops template apply <name> --event {}", event.event_id));

    emit_success(globals.output, "event new", &event, Some(&human))
}

pub fn run_edit(globals: &Globals, id: &str, patch: EventPatch) -> Result<()> {
    let ctx = globals.context()?;
    let event = events::update_event(&ctx, id, patch)?;

    let mut human = HumanOutput::new(format!("eventops event edit: updated event {}", event.event_id));
    push_event_summary(&mut human, &event);

    emit_success(globals.output, "event edit", &event, Some(&human))
}

pub fn run_delete(globals: &Globals, id: &str) -> Result<()> {
    let ctx = globals.context()?;
    let deleted = events::delete_event(&ctx, id)?;

    let mut human = HumanOutput::new(format!(
        "eventops event delete: deleted event {}",
        deleted.event.event_id
    ));
    human.push_summary("name", deleted.event.event_name.trim());
    if deleted.orphaned_tasks > 0 {
        human.push_warning(format!(
            "{} task(s) still reference event {}",
            deleted.orphaned_tasks, deleted.event.event_id
        ));
        human.push_next_step(format!("eventops task list --event {}", deleted.event.event_id));
    }

    emit_success(globals.output, "event delete", &deleted, Some(&human))
}
