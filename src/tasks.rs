//! Tasks: the joined task list and edits of `tasks.csv`.
//!
//! Tasks are either general office work or tied to an event. Rows written by
//! hand may leave `scope` blank; [`joined_tasks`] normalizes that from the
//! event id before anything filters on it.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;

use crate::config::canonical_choice;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::events::required;
use crate::model::{format_date, is_event_scope, parse_date, Event, Task, SCOPE_EVENT, SCOPE_GENERAL};
use crate::table::same_id;

/// A task row with its event name and overdue flag.
#[derive(Debug, Clone, Serialize)]
pub struct TaskEntry {
    #[serde(flatten)]
    pub task: Task,
    pub event_name: String,
    pub overdue: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScopeFilter {
    #[default]
    All,
    General,
    Event,
}

impl FromStr for ScopeFilter {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "all" => Ok(ScopeFilter::All),
            "general" => Ok(ScopeFilter::General),
            "event" => Ok(ScopeFilter::Event),
            other => Err(format!("unknown scope '{other}' (expected all, general or event)")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub search: Option<String>,
    pub scope: ScopeFilter,
    pub status: Option<String>,
    pub event_id: Option<String>,
}

impl TaskFilter {
    fn matches(&self, entry: &TaskEntry) -> bool {
        let task = &entry.task;
        let scope_ok = match self.scope {
            ScopeFilter::All => true,
            ScopeFilter::Event => is_event_scope(&task.scope),
            ScopeFilter::General => !is_event_scope(&task.scope),
        };
        let status_ok = self
            .status
            .as_deref()
            .map_or(true, |status| task.status.trim().eq_ignore_ascii_case(status.trim()));
        let event_ok = self
            .event_id
            .as_deref()
            .map_or(true, |event_id| same_id(&task.event_id, event_id));
        let search_ok = match self.search.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                let query = query.to_lowercase();
                [&task.task_name, &entry.event_name, &task.owner]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
            }
            _ => true,
        };
        scope_ok && status_ok && event_ok && search_ok
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub event_id: Option<String>,
    pub due_date: Option<String>,
    pub owner: String,
    pub status: Option<String>,
    pub priority: String,
    pub category: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub due_date: Option<String>,
    pub owner: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.due_date.is_none()
            && self.owner.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.notes.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DoneOutcome {
    pub task: Task,
    /// False when the task was already done and nothing was written.
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    pub deleted: Vec<String>,
    pub missing: Vec<String>,
}

/// All tasks with normalized scope, event names and overdue flags.
pub fn joined_tasks(ctx: &Context) -> Result<Vec<TaskEntry>> {
    let events = ctx.data.load::<Event>()?;
    let names: HashMap<String, String> = events
        .rows
        .iter()
        .map(|event| (event.event_id.trim().to_string(), event.event_name.clone()))
        .collect();
    let done_status = &ctx.config.tasks.done_status;

    Ok(ctx
        .data
        .load::<Task>()?
        .rows
        .into_iter()
        .map(|mut task| {
            task.scope = task.normalized_scope();
            let event_name = event_name(&names, &events.rows, &task.event_id);
            let overdue = task.is_overdue(ctx.today, done_status);
            TaskEntry {
                task,
                event_name,
                overdue,
            }
        })
        .collect())
}

fn event_name(names: &HashMap<String, String>, events: &[Event], event_id: &str) -> String {
    let event_id = event_id.trim();
    if event_id.is_empty() {
        return String::new();
    }
    names.get(event_id).cloned().unwrap_or_else(|| {
        events
            .iter()
            .find(|event| same_id(&event.event_id, event_id))
            .map(|event| event.event_name.clone())
            .unwrap_or_default()
    })
}

/// Open tasks first, then by due date and name.
pub fn sort_tasks(entries: &mut [TaskEntry], done_status: &str) {
    entries.sort_by(|a, b| {
        a.task
            .is_done(done_status)
            .cmp(&b.task.is_done(done_status))
            .then_with(|| a.task.due_date.trim().cmp(b.task.due_date.trim()))
            .then_with(|| a.task.task_name.cmp(&b.task.task_name))
    });
}

pub fn list_tasks(ctx: &Context, filter: &TaskFilter) -> Result<Vec<TaskEntry>> {
    let mut entries: Vec<TaskEntry> = joined_tasks(ctx)?
        .into_iter()
        .filter(|entry| filter.matches(entry))
        .collect();
    sort_tasks(&mut entries, &ctx.config.tasks.done_status);
    Ok(entries)
}

pub fn show_task(ctx: &Context, id: &str) -> Result<TaskEntry> {
    joined_tasks(ctx)?
        .into_iter()
        .find(|entry| same_id(&entry.task.task_id, id))
        .ok_or_else(|| Error::not_found("Task", id.trim()))
}

pub fn create_task(ctx: &Context, input: NewTask) -> Result<Task> {
    let name = required("task name", &input.name)?;
    let event_id = match input.event_id.as_deref().map(str::trim) {
        Some(event_id) if !event_id.is_empty() => {
            Some(ctx.data.load::<Event>()?.get(event_id)?.event_id.clone())
        }
        _ => None,
    };
    let due_date = match input.due_date.as_deref() {
        Some(due) => validate_due(due)?,
        None => format_date(ctx.today),
    };
    let status = task_status(ctx, input.status.as_deref())?;

    let mut table = ctx.data.load::<Task>()?;
    let (scope, event) = match &event_id {
        Some(event_id) => (SCOPE_EVENT, event_id.clone()),
        None => (SCOPE_GENERAL, String::new()),
    };
    let id = table.push(Task {
        task_id: String::new(),
        scope: scope.to_string(),
        event_id: event,
        task_name: name,
        due_date,
        owner: input.owner.trim().to_string(),
        status,
        priority: input.priority.trim().to_string(),
        category: input.category.trim().to_string(),
        notes: input.notes.trim().to_string(),
    });
    let message = match &event_id {
        Some(event_id) => format!("Add task {id} for {event_id}"),
        None => format!("Add task {id}"),
    };
    ctx.data.save(&mut table, &message)?;
    table.get(&id).cloned()
}

pub fn update_task(ctx: &Context, id: &str, patch: TaskPatch) -> Result<Task> {
    if patch.is_empty() {
        return Err(Error::InvalidArgument("nothing to update".to_string()));
    }
    let status = match patch.status.as_deref() {
        Some(status) => Some(task_status(ctx, Some(status))?),
        None => None,
    };

    let mut table = ctx.data.load::<Task>()?;
    let task = table.get_mut(id)?;
    if let Some(name) = patch.name.as_deref() {
        task.task_name = required("task name", name)?;
    }
    if let Some(due) = patch.due_date.as_deref() {
        task.due_date = validate_due(due)?;
    }
    if let Some(status) = status {
        task.status = status;
    }
    let trimmed = |value: &Option<String>| value.as_deref().map(|v| v.trim().to_string());
    if let Some(owner) = trimmed(&patch.owner) {
        task.owner = owner;
    }
    if let Some(priority) = trimmed(&patch.priority) {
        task.priority = priority;
    }
    if let Some(category) = trimmed(&patch.category) {
        task.category = category;
    }
    if let Some(notes) = trimmed(&patch.notes) {
        task.notes = notes;
    }

    let task_id = task.task_id.clone();
    ctx.data.save(&mut table, &format!("Update task {task_id}"))?;
    table.get(&task_id).cloned()
}

pub fn mark_done(ctx: &Context, id: &str) -> Result<DoneOutcome> {
    let done_status = ctx.config.tasks.done_status.clone();
    let mut table = ctx.data.load::<Task>()?;
    let task = table.get_mut(id)?;
    if task.is_done(&done_status) {
        return Ok(DoneOutcome {
            task: task.clone(),
            changed: false,
        });
    }
    task.status = done_status;
    let task_id = task.task_id.clone();
    ctx.data.save(&mut table, &format!("Mark task {task_id} done"))?;
    Ok(DoneOutcome {
        task: table.get(&task_id)?.clone(),
        changed: true,
    })
}

pub fn delete_tasks(ctx: &Context, ids: &[String]) -> Result<DeleteOutcome> {
    let mut table = ctx.data.load::<Task>()?;
    let missing: Vec<String> = ids
        .iter()
        .filter(|id| table.find(id).is_none())
        .map(|id| id.trim().to_string())
        .collect();
    let removed = table.remove_ids(ids);
    if removed.is_empty() {
        return Err(Error::InvalidArgument("no tasks matched".to_string()));
    }
    let deleted: Vec<String> = removed.into_iter().map(|task| task.task_id).collect();
    ctx.data
        .save(&mut table, &format!("Delete tasks {}", deleted.join(", ")))?;
    Ok(DeleteOutcome { deleted, missing })
}

fn task_status(ctx: &Context, status: Option<&str>) -> Result<String> {
    match status {
        Some(status) => canonical_choice("task status", status, &ctx.config.tasks.statuses),
        None => Ok(ctx.config.tasks.default_status.clone()),
    }
}

/// A due date is either blank or `YYYY-MM-DD`.
fn validate_due(value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() || parse_date(value).is_some() {
        Ok(value.to_string())
    } else {
        Err(Error::InvalidArgument(format!(
            "due date '{value}' is not YYYY-MM-DD"
        )))
    }
}
