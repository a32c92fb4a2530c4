//! eventops init command implementation
//!
//! Creates every missing table with its header row and, on request, a
//! default config file.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{Config, CONFIG_FILE};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::model::{Assignment, Event, EventFile, EventReport, Referee, Task, TaskTemplate};
use crate::output::{emit_success, HumanOutput};
use crate::table::Record;

use super::Globals;

#[derive(Serialize)]
struct InitReport {
    store: String,
    created: Vec<String>,
    existing: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<PathBuf>,
}

pub fn run(globals: &Globals, write_config: bool) -> Result<()> {
    let config_path = if write_config {
        let path = std::env::current_dir()?.join(CONFIG_FILE);
        ensure_config(&path)?.then_some(path)
    } else {
        None
    };

    let ctx = globals.context()?;
    let mut created = Vec::new();
    let mut existing = Vec::new();
    let mut track = |ctx: &Context, file: &str, made: bool| {
        let path = format!("{}/{file}", ctx.config.store.data_dir.trim_end_matches('/'));
        if made {
            created.push(path);
        } else {
            existing.push(path);
        }
    };

    track(&ctx, Event::FILE, ctx.data.ensure::<Event>()?);
    track(&ctx, Task::FILE, ctx.data.ensure::<Task>()?);
    track(&ctx, Referee::FILE, ctx.data.ensure::<Referee>()?);
    track(&ctx, Assignment::FILE, ctx.data.ensure::<Assignment>()?);
    track(&ctx, EventFile::FILE, ctx.data.ensure::<EventFile>()?);
    track(&ctx, EventReport::FILE, ctx.data.ensure::<EventReport>()?);
    track(&ctx, TaskTemplate::FILE, ctx.data.ensure::<TaskTemplate>()?);

    let report = InitReport {
        store: ctx.data.describe(),
        created,
        existing,
        config: config_path,
    };

    let header = if report.created.is_empty() && report.config.is_none() {
        "eventops init: nothing to do".to_string()
    } else {
        "eventops init: initialized store".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("store", report.store.clone());
    human.push_summary("created", join_or_none(&report.created));
    human.push_summary("existing", join_or_none(&report.existing));
    if let Some(path) = &report.config {
        human.push_summary("config", path.display().to_string());
    }
    human.push_next_step("eventops event new --name <name> --start <date> --end <date>");
    human.push_next_step("eventops calendar");

    emit_success(globals.output, "init", &report, Some(&human))
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

fn ensure_config(path: &Path) -> Result<bool> {
    if path.exists() {
        if !path.is_file() {
            return Err(Error::OperationFailed(format!(
                "{CONFIG_FILE} exists but is not a file: {}",
                path.display()
            )));
        }
        return Ok(false);
    }
    Config::default().save(path)?;
    Ok(true)
}
