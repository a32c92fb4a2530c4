//! Task templates and applying them to create tasks.

use serde::Serialize;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::events::required;
use crate::model::{
    format_date, parse_date, parse_scope, shift_date, Event, Task, TaskTemplate, SCOPE_EVENT,
    SCOPE_GENERAL,
};
use crate::table::same_id;

/// Largest due offset a template row may carry, in either direction.
pub const MAX_OFFSET_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Default)]
pub struct NewTemplateRow {
    pub template_name: String,
    pub task_name: String,
    pub scope: Option<String>,
    pub offset_days: i64,
    pub owner: String,
    pub category: String,
    pub priority: String,
}

#[derive(Debug, Clone, Default)]
pub struct TemplatePatch {
    pub template_name: Option<String>,
    pub task_name: Option<String>,
    pub scope: Option<String>,
    pub offset_days: Option<i64>,
    pub owner: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppliedTemplate {
    pub template_name: String,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedTemplateRows {
    pub deleted: Vec<String>,
    pub missing: Vec<String>,
}

/// Template rows with blank scopes normalized, optionally filtered by scope.
pub fn list_templates(ctx: &Context, scope: Option<&str>) -> Result<Vec<TaskTemplate>> {
    let scope = scope.map(scope_arg).transpose()?;
    Ok(ctx
        .data
        .load::<TaskTemplate>()?
        .rows
        .into_iter()
        .map(|mut row| {
            row.scope = row.normalized_scope();
            row
        })
        .filter(|row| match scope {
            Some(scope) => row.scope.eq_ignore_ascii_case(scope),
            None => true,
        })
        .collect())
}

pub fn add_template_row(ctx: &Context, input: NewTemplateRow) -> Result<TaskTemplate> {
    let template_name = required("template name", &input.template_name)?;
    let task_name = required("task name", &input.task_name)?;
    let scope = match input.scope.as_deref() {
        Some(scope) => scope_arg(scope)?,
        None => SCOPE_EVENT,
    };
    check_offset(input.offset_days)?;

    let mut table = ctx.data.load::<TaskTemplate>()?;
    let id = table.push(TaskTemplate {
        template_id: String::new(),
        scope: scope.to_string(),
        template_name,
        task_name,
        due_offset_days: input.offset_days.to_string(),
        default_owner: input.owner.trim().to_string(),
        category: input.category.trim().to_string(),
        priority: input.priority.trim().to_string(),
    });
    ctx.data
        .save(&mut table, &format!("Add template row {id}"))?;
    table.get(&id).cloned()
}

pub fn update_template_row(ctx: &Context, id: &str, patch: TemplatePatch) -> Result<TaskTemplate> {
    let scope = patch.scope.as_deref().map(scope_arg).transpose()?;
    if let Some(offset) = patch.offset_days {
        check_offset(offset)?;
    }

    let mut table = ctx.data.load::<TaskTemplate>()?;
    let row = table.get_mut(id)?;
    let mut changed = false;
    if let Some(name) = patch.template_name.as_deref() {
        row.template_name = required("template name", name)?;
        changed = true;
    }
    if let Some(task_name) = patch.task_name.as_deref() {
        row.task_name = required("task name", task_name)?;
        changed = true;
    }
    if let Some(scope) = scope {
        row.scope = scope.to_string();
        changed = true;
    }
    if let Some(offset) = patch.offset_days {
        row.due_offset_days = offset.to_string();
        changed = true;
    }
    for (value, field) in [
        (&patch.owner, &mut row.default_owner),
        (&patch.category, &mut row.category),
        (&patch.priority, &mut row.priority),
    ] {
        if let Some(value) = value {
            *field = value.trim().to_string();
            changed = true;
        }
    }
    if !changed {
        return Err(Error::InvalidArgument("nothing to update".to_string()));
    }

    let row_id = row.template_id.clone();
    ctx.data
        .save(&mut table, &format!("Update template row {row_id}"))?;
    table.get(&row_id).cloned()
}

pub fn delete_template_rows(ctx: &Context, ids: &[String]) -> Result<DeletedTemplateRows> {
    let mut table = ctx.data.load::<TaskTemplate>()?;
    let missing: Vec<String> = ids
        .iter()
        .filter(|id| table.find(id).is_none())
        .map(|id| id.trim().to_string())
        .collect();
    let removed = table.remove_ids(ids);
    if removed.is_empty() {
        return Err(Error::InvalidArgument("no template rows matched".to_string()));
    }
    ctx.data.save(&mut table, "Delete template rows")?;
    Ok(DeletedTemplateRows {
        deleted: removed.into_iter().map(|row| row.template_id).collect(),
        missing,
    })
}

/// Create one task per template row named `name`.
///
/// Without an event, the General rows are applied relative to today. With an
/// event, the Event rows are applied relative to the event's start date.
pub fn apply_template(ctx: &Context, name: &str, event_id: Option<&str>) -> Result<AppliedTemplate> {
    let name = required("template name", name)?;
    let event = match event_id {
        Some(event_id) => Some(ctx.data.load::<Event>()?.get(event_id)?.clone()),
        None => None,
    };

    let (scope, base_date) = match &event {
        Some(event) => {
            let start = parse_date(&event.start_date).ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "event {} has no valid start date",
                    event.event_id.trim()
                ))
            })?;
            (SCOPE_EVENT, start)
        }
        None => (SCOPE_GENERAL, ctx.today),
    };

    let rows: Vec<TaskTemplate> = list_templates(ctx, Some(scope))?
        .into_iter()
        .filter(|row| row.template_name.trim() == name)
        .collect();
    if rows.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "no {scope} template rows named '{name}'"
        )));
    }

    let mut tasks = ctx.data.load::<Task>()?;
    let status = ctx.config.tasks.default_status.clone();
    let event_id = event.as_ref().map(|event| event.event_id.trim().to_string());
    let mut created = Vec::with_capacity(rows.len());
    for row in &rows {
        let offset = row.offset_days();
        let due = shift_date(base_date, offset).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "template row {}: offset {offset} days is out of range",
                row.template_id.trim()
            ))
        })?;
        let id = tasks.push(Task {
            task_id: String::new(),
            scope: scope.to_string(),
            event_id: event_id.clone().unwrap_or_default(),
            task_name: row.task_name.trim().to_string(),
            due_date: format_date(due),
            owner: row.default_owner.trim().to_string(),
            status: status.clone(),
            priority: row.priority.trim().to_string(),
            category: row.category.trim().to_string(),
            notes: format!("From template: {name}"),
        });
        created.push(id);
    }

    let message = match &event_id {
        Some(event_id) => format!("Apply Event template {name} to {event_id}"),
        None => format!("Apply General template {name}"),
    };
    ctx.data.save(&mut tasks, &message)?;

    let tasks = tasks
        .rows
        .into_iter()
        .filter(|task| created.iter().any(|id| same_id(&task.task_id, id)))
        .collect();
    Ok(AppliedTemplate {
        template_name: name,
        scope: scope.to_string(),
        event_id,
        tasks,
    })
}

/// Names of the templates available for a scope, sorted and deduplicated.
pub fn template_names(ctx: &Context, scope: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = list_templates(ctx, Some(scope))?
        .into_iter()
        .map(|row| row.template_name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    Ok(names)
}

fn check_offset(offset: i64) -> Result<()> {
    if !(-MAX_OFFSET_DAYS..=MAX_OFFSET_DAYS).contains(&offset) {
        return Err(Error::InvalidArgument(format!(
            "offset {offset} days is out of range (at most {MAX_OFFSET_DAYS} either way)"
        )));
    }
    Ok(())
}

fn scope_arg(value: &str) -> Result<&'static str> {
    parse_scope(value).ok_or_else(|| {
        Error::InvalidArgument(format!(
            "invalid scope '{}': expected Event or General",
            value.trim()
        ))
    })
}
