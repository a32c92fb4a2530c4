//! Document links attached to events: files and reports.
//!
//! Both tables have the same shape, so the operations are written once over
//! [`LinkRecord`].

use serde::Serialize;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::events::required;
use crate::model::{now_stamp, Event, EventFile, EventReport};
use crate::table::{same_id, Record};

/// Common view of `event_files.csv` and `event_reports.csv` rows.
pub trait LinkRecord: Record + Default {
    /// Singular noun used in commit messages, e.g. `file`.
    const NOUN: &'static str;
    /// Plural noun used in commit messages, e.g. `files`.
    const PLURAL: &'static str;

    fn event_id(&self) -> &str;
    fn fields(&self) -> LinkView<'_>;
    fn fields_mut(&mut self) -> LinkFields<'_>;
}

pub struct LinkView<'a> {
    pub title: &'a str,
    pub link: &'a str,
    pub notes: &'a str,
    pub updated_at: &'a str,
}

pub struct LinkFields<'a> {
    pub event_id: &'a mut String,
    pub title: &'a mut String,
    pub link: &'a mut String,
    pub notes: &'a mut String,
    pub updated_at: &'a mut String,
}

impl LinkRecord for EventFile {
    const NOUN: &'static str = "file";
    const PLURAL: &'static str = "files";

    fn event_id(&self) -> &str {
        &self.event_id
    }

    fn fields(&self) -> LinkView<'_> {
        LinkView {
            title: &self.title,
            link: &self.link,
            notes: &self.notes,
            updated_at: &self.updated_at,
        }
    }

    fn fields_mut(&mut self) -> LinkFields<'_> {
        LinkFields {
            event_id: &mut self.event_id,
            title: &mut self.title,
            link: &mut self.link,
            notes: &mut self.notes,
            updated_at: &mut self.updated_at,
        }
    }
}

impl LinkRecord for EventReport {
    const NOUN: &'static str = "report";
    const PLURAL: &'static str = "reports";

    fn event_id(&self) -> &str {
        &self.event_id
    }

    fn fields(&self) -> LinkView<'_> {
        LinkView {
            title: &self.title,
            link: &self.link,
            notes: &self.notes,
            updated_at: &self.updated_at,
        }
    }

    fn fields_mut(&mut self) -> LinkFields<'_> {
        LinkFields {
            event_id: &mut self.event_id,
            title: &mut self.title,
            link: &mut self.link,
            notes: &mut self.notes,
            updated_at: &mut self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewLink {
    pub event_id: String,
    pub title: String,
    pub link: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedLinks {
    pub deleted: Vec<String>,
    pub missing: Vec<String>,
}

pub fn list_links<L: LinkRecord>(ctx: &Context, event_id: &str) -> Result<Vec<L>> {
    let event_id = ctx.data.load::<Event>()?.get(event_id)?.event_id.clone();
    Ok(ctx
        .data
        .load::<L>()?
        .rows
        .into_iter()
        .filter(|row| same_id(row.event_id(), &event_id))
        .collect())
}

pub fn add_link<L: LinkRecord>(ctx: &Context, input: NewLink) -> Result<L> {
    let event_id = ctx.data.load::<Event>()?.get(&input.event_id)?.event_id.clone();
    let title = required("title", &input.title)?;
    let link = required("link", &input.link)?;

    let mut row = L::default();
    {
        let fields = row.fields_mut();
        *fields.event_id = event_id.clone();
        *fields.title = title;
        *fields.link = link;
        *fields.notes = input.notes.trim().to_string();
        *fields.updated_at = now_stamp();
    }

    let mut table = ctx.data.load::<L>()?;
    let id = table.push(row);
    ctx.data.save(
        &mut table,
        &format!("Add {} link {id} for {event_id}", L::NOUN),
    )?;
    table.get(&id).cloned()
}

pub fn update_link<L: LinkRecord>(ctx: &Context, id: &str, patch: LinkPatch) -> Result<L> {
    if patch.title.is_none() && patch.link.is_none() && patch.notes.is_none() {
        return Err(Error::InvalidArgument("nothing to update".to_string()));
    }

    let mut table = ctx.data.load::<L>()?;
    let row = table.get_mut(id)?;
    let row_id = row.id().to_string();
    let event_id = row.event_id().trim().to_string();
    {
        let fields = row.fields_mut();
        if let Some(title) = patch.title.as_deref() {
            *fields.title = required("title", title)?;
        }
        if let Some(link) = patch.link.as_deref() {
            *fields.link = required("link", link)?;
        }
        if let Some(notes) = patch.notes.as_deref() {
            *fields.notes = notes.trim().to_string();
        }
        *fields.updated_at = now_stamp();
    }

    ctx.data
        .save(&mut table, &format!("Update {} for {event_id}", L::PLURAL))?;
    table.get(&row_id).cloned()
}

pub fn delete_links<L: LinkRecord>(ctx: &Context, ids: &[String]) -> Result<DeletedLinks> {
    let mut table = ctx.data.load::<L>()?;
    let missing: Vec<String> = ids
        .iter()
        .filter(|id| table.find(id).is_none())
        .map(|id| id.trim().to_string())
        .collect();
    let removed = table.remove_ids(ids);
    if removed.is_empty() {
        return Err(Error::InvalidArgument(format!("no {} matched", L::PLURAL)));
    }

    let mut events: Vec<String> = Vec::new();
    for row in &removed {
        let event_id = row.event_id().trim().to_string();
        if !events.contains(&event_id) {
            events.push(event_id);
        }
    }
    ctx.data.save(
        &mut table,
        &format!("Delete {} for {}", L::PLURAL, events.join(", ")),
    )?;

    Ok(DeletedLinks {
        deleted: removed.iter().map(|row| row.id().to_string()).collect(),
        missing,
    })
}
