//! `eventops file` and `eventops report`: the same commands over two tables.

use serde::Serialize;

use crate::error::Result;
use crate::links::{self, LinkPatch, LinkRecord, NewLink};
use crate::output::{emit_success, HumanOutput};

use super::{Globals, LinkCommands};

#[derive(Serialize)]
struct LinkListReport<L: Serialize> {
    event_id: String,
    total: usize,
    links: Vec<L>,
}

pub fn run<L: LinkRecord>(globals: &Globals, cmd: LinkCommands) -> Result<()> {
    match cmd {
        LinkCommands::List { event } => run_list::<L>(globals, &event),
        LinkCommands::Add {
            event,
            title,
            link,
            notes,
        } => run_add::<L>(
            globals,
            NewLink {
                event_id: event,
                title,
                link,
                notes,
            },
        ),
        LinkCommands::Edit {
            id,
            title,
            link,
            notes,
        } => run_edit::<L>(globals, &id, LinkPatch { title, link, notes }),
        LinkCommands::Delete { ids } => run_delete::<L>(globals, &ids),
    }
}

fn command(noun: &str, action: &str) -> String {
    format!("{noun} {action}")
}

fn link_line<L: LinkRecord>(row: &L) -> String {
    let fields = row.fields();
    let mut line = format!("#{} {} <{}>", row.id().trim(), fields.title.trim(), fields.link.trim());
    if !fields.notes.trim().is_empty() {
        line.push_str(&format!(" - {}", fields.notes.trim()));
    }
    if !fields.updated_at.trim().is_empty() {
        line.push_str(&format!(" (updated {})", fields.updated_at.trim()));
    }
    line
}

fn run_list<L: LinkRecord>(globals: &Globals, event_id: &str) -> Result<()> {
    let ctx = globals.context()?;
    let rows = links::list_links::<L>(&ctx, event_id)?;

    let mut human = HumanOutput::new(format!(
        "eventops {}: {} {}(s) for event {}",
        command(L::NOUN, "list"),
        rows.len(),
        L::NOUN,
        event_id.trim()
    ));
    for row in &rows {
        human.push_detail(link_line(row));
    }
    if rows.is_empty() {
        human.push_next_step(format!(
            "eventops {} add --event {} --title <title> --link <url>",
            L::NOUN,
            event_id.trim()
        ));
    }

    let report = LinkListReport {
        event_id: event_id.trim().to_string(),
        total: rows.len(),
        links: rows,
    };
    emit_success(globals.output, &command(L::NOUN, "list"), &report, Some(&human))
}

fn run_add<L: LinkRecord>(globals: &Globals, input: NewLink) -> Result<()> {
    let ctx = globals.context()?;
    let row: L = links::add_link(&ctx, input)?;

    let mut human = HumanOutput::new(format!(
        "eventops {}: added {} {} for event {}",
        command(L::NOUN, "add"),
        L::NOUN,
        row.id(),
        row.event_id().trim()
    ));
    human.push_detail(link_line(&row));

    emit_success(globals.output, &command(L::NOUN, "add"), &row, Some(&human))
}

fn run_edit<L: LinkRecord>(globals: &Globals, id: &str, patch: LinkPatch) -> Result<()> {
    let ctx = globals.context()?;
    let row: L = links::update_link(&ctx, id, patch)?;

    let mut human = HumanOutput::new(format!(
        "eventops {}: updated {} {}",
        command(L::NOUN, "edit"),
        L::NOUN,
        row.id()
    ));
    human.push_detail(link_line(&row));

    emit_success(globals.output, &command(L::NOUN, "edit"), &row, Some(&human))
}

fn run_delete<L: LinkRecord>(globals: &Globals, ids: &[String]) -> Result<()> {
    let ctx = globals.context()?;
    let deleted = links::delete_links::<L>(&ctx, ids)?;

    let mut human = HumanOutput::new(format!(
        "eventops {}: deleted {} {}",
        command(L::NOUN, "delete"),
        deleted.deleted.len(),
        L::PLURAL
    ));
    human.push_summary("deleted", deleted.deleted.join(", "));
    for id in &deleted.missing {
        human.push_warning(format!("{} {id} not found", L::NOUN));
    }

    emit_success(globals.output, &command(L::NOUN, "delete"), &deleted, Some(&human))
}
