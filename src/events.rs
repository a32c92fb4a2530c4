//! Events: listing, detail view and edits of `events.csv`.

use serde::Serialize;

use crate::config::canonical_choice;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::model::{is_event_scope, parse_date, Event, EventFile, EventReport, Task};
use crate::referees::{assignments_for_event, AssignmentView};
use crate::table::{numeric_id, same_id, Table};

/// Fields for a new event.
#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub name: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub status: Option<String>,
}

/// Fields to change on an existing event; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventDetail {
    pub event: Event,
    pub tasks: Vec<Task>,
    pub files: Vec<EventFile>,
    pub reports: Vec<EventReport>,
    pub assignments: Vec<AssignmentView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedEvent {
    pub event: Event,
    /// Tasks still pointing at the deleted event.
    pub orphaned_tasks: usize,
}

/// Events sorted by start date then id, optionally filtered by status.
pub fn list_events(ctx: &Context, status: Option<&str>) -> Result<Vec<Event>> {
    let table = ctx.data.load::<Event>()?;
    let mut events: Vec<Event> = table
        .rows
        .into_iter()
        .filter(|event| match status {
            Some(status) => event.status.trim().eq_ignore_ascii_case(status.trim()),
            None => true,
        })
        .collect();
    sort_events(&mut events);
    Ok(events)
}

pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        parse_date(&a.start_date)
            .is_none()
            .cmp(&parse_date(&b.start_date).is_none())
            .then_with(|| a.start_date.trim().cmp(b.start_date.trim()))
            .then_with(|| numeric_id(&a.event_id).cmp(&numeric_id(&b.event_id)))
            .then_with(|| a.event_id.cmp(&b.event_id))
    });
}

pub fn show_event(ctx: &Context, id: &str) -> Result<EventDetail> {
    let events = ctx.data.load::<Event>()?;
    let event = events.get(id)?.clone();
    let event_id = event.event_id.clone();

    let tasks = ctx
        .data
        .load::<Task>()?
        .rows
        .into_iter()
        .filter(|task| is_event_scope(&task.normalized_scope()) && same_id(&task.event_id, &event_id))
        .collect();
    let files = ctx
        .data
        .load::<EventFile>()?
        .rows
        .into_iter()
        .filter(|file| same_id(&file.event_id, &event_id))
        .collect();
    let reports = ctx
        .data
        .load::<EventReport>()?
        .rows
        .into_iter()
        .filter(|report| same_id(&report.event_id, &event_id))
        .collect();
    let assignments = assignments_for_event(ctx, &event_id)?;

    Ok(EventDetail {
        event,
        tasks,
        files,
        reports,
        assignments,
    })
}

pub fn create_event(ctx: &Context, input: NewEvent) -> Result<Event> {
    let name = required("event name", &input.name)?;
    let (start, end) = validate_dates(&input.start_date, &input.end_date)?;
    let status = match input.status.as_deref() {
        Some(status) => canonical_choice("event status", status, &ctx.config.events.statuses)?,
        None => ctx.config.events.default_status.clone(),
    };

    let mut table = ctx.data.load::<Event>()?;
    let id = table.push(Event {
        event_id: String::new(),
        event_name: name,
        location: input.location.trim().to_string(),
        start_date: start,
        end_date: end,
        status,
    });
    ctx.data.save(&mut table, &format!("Add event {id}"))?;
    fetch(&table, &id)
}

pub fn update_event(ctx: &Context, id: &str, patch: EventPatch) -> Result<Event> {
    if patch.is_empty() {
        return Err(Error::InvalidArgument("nothing to update".to_string()));
    }

    let mut table = ctx.data.load::<Event>()?;
    let event = table.get_mut(id)?;

    if let Some(name) = patch.name.as_deref() {
        event.event_name = required("event name", name)?;
    }
    if let Some(location) = patch.location.as_deref() {
        event.location = location.trim().to_string();
    }
    // Stored dates are only checked when one of them changes.
    if patch.start_date.is_some() || patch.end_date.is_some() {
        let start = patch.start_date.as_deref().unwrap_or(&event.start_date);
        let end = patch.end_date.as_deref().unwrap_or(&event.end_date);
        let (start, end) = validate_dates(start, end)?;
        event.start_date = start;
        event.end_date = end;
    }
    if let Some(status) = patch.status.as_deref() {
        event.status = canonical_choice("event status", status, &ctx.config.events.statuses)?;
    }

    let event_id = event.event_id.clone();
    ctx.data.save(&mut table, &format!("Update event {event_id}"))?;
    fetch(&table, &event_id)
}

/// Remove the event row. Tasks, links and assignments are left as they are.
pub fn delete_event(ctx: &Context, id: &str) -> Result<DeletedEvent> {
    let mut table = ctx.data.load::<Event>()?;
    let event_id = table.get(id)?.event_id.clone();
    let mut removed = table.remove_ids(&[event_id.clone()]);
    ctx.data.save(&mut table, &format!("Delete event {event_id}"))?;

    let orphaned_tasks = ctx
        .data
        .load::<Task>()?
        .rows
        .iter()
        .filter(|task| same_id(&task.event_id, &event_id))
        .count();
    if orphaned_tasks > 0 {
        tracing::info!(event = %event_id, orphaned_tasks, "deleted event still referenced by tasks");
    }

    Ok(DeletedEvent {
        event: removed.remove(0),
        orphaned_tasks,
    })
}

/// Both dates must be `YYYY-MM-DD` and the end must not precede the start.
pub fn validate_dates(start: &str, end: &str) -> Result<(String, String)> {
    let start_date = parse_date(start).ok_or_else(|| {
        Error::InvalidArgument(format!("start date '{}' is not YYYY-MM-DD", start.trim()))
    })?;
    let end_date = parse_date(end).ok_or_else(|| {
        Error::InvalidArgument(format!("end date '{}' is not YYYY-MM-DD", end.trim()))
    })?;
    if end_date < start_date {
        return Err(Error::InvalidArgument(format!(
            "end date {} is before start date {}",
            end.trim(),
            start.trim()
        )));
    }
    Ok((start.trim().to_string(), end.trim().to_string()))
}

pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

fn fetch(table: &Table<Event>, id: &str) -> Result<Event> {
    table.get(id).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::memory_context;
    use crate::table::tests::MemoryStore;

    const EVENTS: &str = "event_id,event_name,location,start_date,end_date,status\n\
        2,Autumn Cup,Porto,2024-09-01,2024-09-03,Planned\n\
        1,Spring Open,Lisbon,2024-04-10,2024-04-12,Completed\n\
        3,Undated,,,,Planned\n";

    fn memory() -> MemoryStore {
        MemoryStore::default().with_file("data/events.csv", EVENTS)
    }

    #[test]
    fn list_sorts_by_start_and_filters_status() {
        let memory = memory();
        let ctx = memory_context(&memory);
        let ids: Vec<String> = list_events(&ctx, None)
            .unwrap()
            .into_iter()
            .map(|event| event.event_id)
            .collect();
        assert_eq!(ids, ["1", "2", "3"]);

        let planned = list_events(&ctx, Some("planned")).unwrap();
        assert_eq!(planned.len(), 2);
    }

    #[test]
    fn create_validates_and_commits() {
        let memory = memory();
        let ctx = memory_context(&memory);

        let err = create_event(
            &ctx,
            NewEvent {
                name: "Bad".into(),
                start_date: "2024-06-05".into(),
                end_date: "2024-06-01".into(),
                ..NewEvent::default()
            },
        );
        assert!(matches!(err, Err(Error::InvalidArgument(_))));

        let event = create_event(
            &ctx,
            NewEvent {
                name: " Summer Cup ".into(),
                location: "Faro".into(),
                start_date: "2024-06-01".into(),
                end_date: "2024-06-02".into(),
                status: Some("confirmed".into()),
            },
        )
        .unwrap();
        assert_eq!(event.event_id, "4");
        assert_eq!(event.event_name, "Summer Cup");
        assert_eq!(event.status, "Confirmed");
        assert_eq!(memory.messages.borrow().as_slice(), ["Add event 4"]);
    }

    #[test]
    fn update_keeps_unset_fields() {
        let memory = memory();
        let ctx = memory_context(&memory);
        let event = update_event(
            &ctx,
            "2",
            EventPatch {
                status: Some("Ongoing".into()),
                end_date: Some("2024-09-04".into()),
                ..EventPatch::default()
            },
        )
        .unwrap();
        assert_eq!(event.event_name, "Autumn Cup");
        assert_eq!(event.end_date, "2024-09-04");
        assert_eq!(event.status, "Ongoing");
        assert_eq!(memory.messages.borrow().as_slice(), ["Update event 2"]);

        let missing = update_event(
            &ctx,
            "42",
            EventPatch {
                name: Some("x".into()),
                ..EventPatch::default()
            },
        );
        assert!(matches!(missing, Err(Error::NotFound { .. })));
    }

    #[test]
    fn rename_undated_event_skips_date_checks() {
        let memory = memory();
        let ctx = memory_context(&memory);
        let event = update_event(
            &ctx,
            "3",
            EventPatch {
                name: Some("Winter Gala".into()),
                ..EventPatch::default()
            },
        )
        .unwrap();
        assert_eq!(event.event_name, "Winter Gala");
        assert_eq!(event.start_date, "");

        let bad = update_event(
            &ctx,
            "3",
            EventPatch {
                start_date: Some("2024-12-01".into()),
                ..EventPatch::default()
            },
        );
        assert!(matches!(bad, Err(Error::InvalidArgument(_))));
        assert_eq!(memory.messages.borrow().as_slice(), ["Update event 3"]);
    }

    #[test]
    fn delete_reports_orphaned_tasks() {
        let memory = memory().with_file(
            "data/tasks.csv",
            "task_id,scope,event_id,task_name\n1,Event,2,Book hall\n2,,,Order shirts\n",
        );
        let ctx = memory_context(&memory);
        let deleted = delete_event(&ctx, "2").unwrap();
        assert_eq!(deleted.event.event_name, "Autumn Cup");
        assert_eq!(deleted.orphaned_tasks, 1);
        assert_eq!(list_events(&ctx, None).unwrap().len(), 2);
        assert!(memory.text("data/tasks.csv").unwrap().contains("Book hall"));
    }

    #[test]
    fn show_collects_related_rows() {
        let memory = memory()
            .with_file(
                "data/tasks.csv",
                "task_id,scope,event_id,task_name\n1,,2,Book hall\n2,General,2,Budget\n3,Event,1,Other\n",
            )
            .with_file(
                "data/event_files.csv",
                "file_id,event_id,title,link\n1,2,Venue map,https://x\n",
            );
        let ctx = memory_context(&memory);
        let detail = show_event(&ctx, "2").unwrap();
        assert_eq!(detail.tasks.len(), 1);
        assert_eq!(detail.tasks[0].task_name, "Book hall");
        assert_eq!(detail.files.len(), 1);
        assert!(detail.reports.is_empty());
        assert!(detail.assignments.is_empty());
    }
}
