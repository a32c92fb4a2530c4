//! eventops template command implementation

use serde::Serialize;

use crate::error::Result;
use crate::model::{TaskTemplate, SCOPE_EVENT, SCOPE_GENERAL};
use crate::output::{emit_success, HumanOutput};
use crate::templates::{self, NewTemplateRow, TemplatePatch};

use super::Globals;

#[derive(Serialize)]
struct TemplateListReport {
    total: usize,
    names: Vec<String>,
    rows: Vec<TaskTemplate>,
}

fn row_line(row: &TaskTemplate) -> String {
    let mut line = format!(
        "#{} [{}] {}: {} (offset {})",
        row.template_id.trim(),
        row.scope.trim(),
        row.template_name.trim(),
        row.task_name.trim(),
        row.offset_days()
    );
    if !row.default_owner.trim().is_empty() {
        line.push_str(&format!(" @{}", row.default_owner.trim()));
    }
    line
}

pub fn run_list(globals: &Globals, scope: Option<&str>) -> Result<()> {
    let ctx = globals.context()?;
    let rows = templates::list_templates(&ctx, scope)?;
    let mut names = Vec::new();
    for scope in [SCOPE_EVENT, SCOPE_GENERAL] {
        names.extend(
            templates::template_names(&ctx, scope)?
                .into_iter()
                .map(|name| format!("{scope}: {name}")),
        );
    }
    if let Some(filter) = scope {
        names.retain(|name| {
            name.to_lowercase()
                .starts_with(&format!("{}:", filter.trim().to_lowercase()))
        });
    }

    let mut human = HumanOutput::new(format!("eventops template list: {} row(s)", rows.len()));
    human.push_summary("templates", if names.is_empty() { "none".to_string() } else { names.join(", ") });
    for row in &rows {
        human.push_detail(row_line(row));
    }

    let report = TemplateListReport {
        total: rows.len(),
        names,
        rows,
    };
    emit_success(globals.output, "template list", &report, Some(&human))
}

pub fn run_add(globals: &Globals, input: NewTemplateRow) -> Result<()> {
    let ctx = globals.context()?;
    let row = templates::add_template_row(&ctx, input)?;

    let mut human = HumanOutput::new(format!("eventops template add: added row {}", row.template_id));
    human.push_detail(row_line(&row));
    let next = if row.scope == SCOPE_GENERAL {
        format!("eventops template apply \"{}\"", row.template_name)
    } else {
        format!("eventops template apply \"{}\" --event <id>", row.template_name)
    };
    human.push_next_step(next);

    emit_success(globals.output, "template add", &row, Some(&human))
}

pub fn run_edit(globals: &Globals, id: &str, patch: TemplatePatch) -> Result<()> {
    let ctx = globals.context()?;
    let row = templates::update_template_row(&ctx, id, patch)?;

    let mut human = HumanOutput::new(format!("eventops template edit: updated row {}", row.template_id));
    human.push_detail(row_line(&row));

    emit_success(globals.output, "template edit", &row, Some(&human))
}

pub fn run_delete(globals: &Globals, ids: &[String]) -> Result<()> {
    let ctx = globals.context()?;
    let deleted = templates::delete_template_rows(&ctx, ids)?;

    let mut human = HumanOutput::new(format!(
        "eventops template delete: deleted {} row(s)",
        deleted.deleted.len()
    ));
    human.push_summary("deleted", deleted.deleted.join(", "));
    for id in &deleted.missing {
        human.push_warning(format!("template row {id} not found"));
    }

    emit_success(globals.output, "template delete", &deleted, Some(&human))
}

pub fn run_apply(globals: &Globals, name: &str, event_id: Option<&str>) -> Result<()> {
    let ctx = globals.context()?;
    let applied = templates::apply_template(&ctx, name, event_id)?;

    let target = match &applied.event_id {
        Some(event_id) => format!(" to event {event_id}"),
        None => String::new(),
    };
    let mut human = HumanOutput::new(format!(
        "eventops template apply: created {} task(s) from {} template {}{target}",
        applied.tasks.len(),
        applied.scope,
        applied.template_name
    ));
    for task in &applied.tasks {
        human.push_detail(format!(
            "#{} {} (due {})",
            task.task_id.trim(),
            task.task_name.trim(),
            task.due_date.trim()
        ));
    }
    human.push_next_step(match &applied.event_id {
        Some(event_id) => format!("eventops task list --event {event_id}"),
        None => "eventops task list --scope general".to_string(),
    });

    emit_success(globals.output, "template apply", &applied, Some(&human))
}
