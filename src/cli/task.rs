//! eventops task command implementation

use serde::Serialize;

use crate::error::Result;
use crate::model::Task;
use crate::output::{emit_success, HumanOutput};
use crate::tasks::{self, NewTask, ScopeFilter, TaskEntry, TaskFilter, TaskPatch};

use super::Globals;

#[derive(Serialize)]
struct TaskListReport {
    total: usize,
    overdue: usize,
    tasks: Vec<TaskEntry>,
}

fn task_line(entry: &TaskEntry) -> String {
    let task = &entry.task;
    let mut line = format!(
        "#{} [{}] {} (due {}, {})",
        task.task_id.trim(),
        task.scope,
        task.task_name.trim(),
        display_or_dash(&task.due_date),
        task.status.trim()
    );
    if !entry.event_name.trim().is_empty() {
        line.push_str(&format!(" - {}", entry.event_name.trim()));
    }
    if !task.owner.trim().is_empty() {
        line.push_str(&format!(" @{}", task.owner.trim()));
    }
    if entry.overdue {
        line.push_str(" OVERDUE");
    }
    line
}

fn display_or_dash(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn push_task_summary(human: &mut HumanOutput, task: &Task) {
    human.push_summary("id", task.task_id.trim());
    human.push_summary("name", task.task_name.trim());
    human.push_summary("scope", task.scope.trim());
    if !task.event_id.trim().is_empty() {
        human.push_summary("event", task.event_id.trim());
    }
    human.push_summary("due", display_or_dash(&task.due_date));
    human.push_summary("owner", display_or_dash(&task.owner));
    human.push_summary("status", task.status.trim());
}

pub fn run_list(globals: &Globals, filter: TaskFilter) -> Result<()> {
    let ctx = globals.context()?;
    let entries = tasks::list_tasks(&ctx, &filter)?;
    let overdue = entries.iter().filter(|entry| entry.overdue).count();

    let mut human = HumanOutput::new(format!("eventops task list: {} task(s)", entries.len()));
    if filter.scope != ScopeFilter::All {
        human.push_summary("scope", format!("{:?}", filter.scope));
    }
    if let Some(search) = &filter.search {
        human.push_summary("search", search.clone());
    }
    human.push_summary("overdue", overdue.to_string());
    for entry in &entries {
        human.push_detail(task_line(entry));
    }
    if overdue > 0 {
        human.push_warning(format!("{overdue} task(s) overdue"));
    }

    let report = TaskListReport {
        total: entries.len(),
        overdue,
        tasks: entries,
    };
    emit_success(globals.output, "task list", &report, Some(&human))
}

pub fn run_show(globals: &Globals, id: &str) -> Result<()> {
    let ctx = globals.context()?;
    let entry = tasks::show_task(&ctx, id)?;

    let mut human = HumanOutput::new(format!("eventops task show: {}", entry.task.task_name.trim()));
    push_task_summary(&mut human, &entry.task);
    if !entry.event_name.trim().is_empty() {
        human.push_summary("event name", entry.event_name.trim());
    }
    for (key, value) in [
        ("priority", &entry.task.priority),
        ("category", &entry.task.category),
        ("notes", &entry.task.notes),
    ] {
        if !value.trim().is_empty() {
            human.push_summary(key, value.trim());
        }
    }
    if entry.overdue {
        human.push_warning(format!("task {} is overdue", entry.task.task_id.trim()));
    }

    emit_success(globals.output, "task show", &entry, Some(&human))
}

pub fn run_new(globals: &Globals, input: NewTask) -> Result<()> {
    let ctx = globals.context()?;
    let task = tasks::create_task(&ctx, input)?;

    let mut human = HumanOutput::new(format!("eventops task new: created task {}", task.task_id));
    push_task_summary(&mut human, &task);
    human.push_next_step(format!("eventops task done {}", task.task_id));

    emit_success(globals.output, "task new", &task, Some(&human))
}

pub fn run_edit(globals: &Globals, id: &str, patch: TaskPatch) -> Result<()> {
    let ctx = globals.context()?;
    let task = tasks::update_task(&ctx, id, patch)?;

    let mut human = HumanOutput::new(format!("eventops task edit: updated task {}", task.task_id));
    push_task_summary(&mut human, &task);

    emit_success(globals.output, "task edit", &task, Some(&human))
}

pub fn run_done(globals: &Globals, id: &str) -> Result<()> {
    let ctx = globals.context()?;
    let outcome = tasks::mark_done(&ctx, id)?;
    let task_id = outcome.task.task_id.trim().to_string();

    let header = if outcome.changed {
        format!("eventops task done: task {task_id} marked done")
    } else {
        format!("eventops task done: task {task_id} unchanged")
    };
    let mut human = HumanOutput::new(header);
    push_task_summary(&mut human, &outcome.task);
    if !outcome.changed {
        human.push_warning(format!("task {task_id} is already done"));
    }

    emit_success(globals.output, "task done", &outcome, Some(&human))
}

pub fn run_delete(globals: &Globals, ids: &[String]) -> Result<()> {
    let ctx = globals.context()?;
    let outcome = tasks::delete_tasks(&ctx, ids)?;

    let mut human = HumanOutput::new(format!(
        "eventops task delete: deleted {} task(s)",
        outcome.deleted.len()
    ));
    human.push_summary("deleted", outcome.deleted.join(", "));
    for id in &outcome.missing {
        human.push_warning(format!("task {id} not found"));
    }

    emit_success(globals.output, "task delete", &outcome, Some(&human))
}
