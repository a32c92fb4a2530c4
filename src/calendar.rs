//! Summary metrics, the monthly calendar grid and the day agenda.
//!
//! All three are computed from a [`Snapshot`] of the event and task tables so
//! the dashboard can build them repeatedly without re-reading the store.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::model::{format_date, parse_date, shift_date, Event, Tone};
use crate::tasks::{joined_tasks, TaskEntry};

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const CELL_WIDTH: usize = 14;

/// Events and joined tasks as read at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub events: Vec<Event>,
    pub tasks: Vec<TaskEntry>,
}

impl Snapshot {
    pub fn load(ctx: &Context) -> Result<Self> {
        Ok(Self {
            events: ctx.data.load::<Event>()?.rows,
            tasks: joined_tasks(ctx)?,
        })
    }

    pub fn events_on(&self, day: NaiveDate) -> Vec<&Event> {
        self.events.iter().filter(|event| event.covers(day)).collect()
    }

    pub fn tasks_due(&self, day: NaiveDate) -> Vec<&TaskEntry> {
        self.tasks
            .iter()
            .filter(|entry| parse_date(&entry.task.due_date) == Some(day))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub today: String,
    pub total_events: usize,
    pub ongoing: usize,
    pub upcoming: usize,
    pub upcoming_days: i64,
    pub overdue_tasks: usize,
}

pub fn summarize(snapshot: &Snapshot, today: NaiveDate, upcoming_days: i64) -> Summary {
    let horizon = shift_date(today, upcoming_days).unwrap_or(NaiveDate::MAX);
    let starts: Vec<Option<NaiveDate>> = snapshot
        .events
        .iter()
        .map(|event| parse_date(&event.start_date))
        .collect();

    Summary {
        today: format_date(today),
        total_events: snapshot.events.len(),
        ongoing: snapshot.events.iter().filter(|event| event.covers(today)).count(),
        upcoming: starts
            .iter()
            .flatten()
            .filter(|start| today < **start && **start <= horizon)
            .count(),
        upcoming_days,
        overdue_tasks: snapshot.tasks.iter().filter(|entry| entry.overdue).count(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Event,
    Task,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarItem {
    pub kind: ItemKind,
    pub id: String,
    pub label: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub date: String,
    pub day: u32,
    pub in_month: bool,
    pub is_today: bool,
    pub items: Vec<CalendarItem>,
    /// Items that did not fit in the cell.
    pub more: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<DayCell>>,
}

impl MonthGrid {
    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        let date = format_date(date);
        self.weeks.iter().flatten().find(|cell| cell.date == date)
    }
}

/// Check a year and month the way the calendar accepts them.
pub fn validate_month(year: i32, month: u32) -> Result<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(Error::InvalidArgument(format!(
            "year {year} is outside {MIN_YEAR}-{MAX_YEAR}"
        )));
    }
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidArgument(format!("month {month} is outside 1-12")));
    }
    Ok(())
}

/// Monday-first weeks covering the month, including spill-over days.
pub fn month_weeks(year: i32, month: u32) -> Result<Vec<[NaiveDate; 7]>> {
    validate_month(year, month)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidArgument(format!("invalid month {year}-{month}")))?;
    let mut start = first - Duration::days(i64::from(first.weekday().num_days_from_monday()));

    let mut weeks = Vec::new();
    loop {
        let mut week = [start; 7];
        for (offset, day) in week.iter_mut().enumerate() {
            *day = start + Duration::days(offset as i64);
        }
        weeks.push(week);
        start += Duration::days(7);
        if start.month() != month || start.year() != year {
            break;
        }
    }
    Ok(weeks)
}

pub fn month_grid(
    snapshot: &Snapshot,
    year: i32,
    month: u32,
    today: NaiveDate,
    max_items: usize,
) -> Result<MonthGrid> {
    let weeks = month_weeks(year, month)?
        .into_iter()
        .map(|week| {
            week.into_iter()
                .map(|date| day_cell(snapshot, date, month, today, max_items))
                .collect()
        })
        .collect();
    Ok(MonthGrid { year, month, weeks })
}

fn day_cell(
    snapshot: &Snapshot,
    date: NaiveDate,
    month: u32,
    today: NaiveDate,
    max_items: usize,
) -> DayCell {
    let in_month = date.month() == month;
    let mut cell = DayCell {
        date: format_date(date),
        day: date.day(),
        in_month,
        is_today: date == today,
        items: Vec::new(),
        more: 0,
    };
    if !in_month {
        return cell;
    }

    let items: Vec<CalendarItem> = day_items(snapshot, date);
    cell.more = items.len().saturating_sub(max_items);
    cell.items = items.into_iter().take(max_items).collect();
    cell
}

/// Events running on `date`, then tasks due on it.
pub fn day_items(snapshot: &Snapshot, date: NaiveDate) -> Vec<CalendarItem> {
    let events = snapshot.events_on(date).into_iter().map(|event| CalendarItem {
        kind: ItemKind::Event,
        id: event.event_id.trim().to_string(),
        label: event.event_name.trim().to_string(),
        tone: event.tone(),
    });
    let tasks = snapshot.tasks_due(date).into_iter().map(|entry| CalendarItem {
        kind: ItemKind::Task,
        id: entry.task.task_id.trim().to_string(),
        label: entry.task.task_name.trim().to_string(),
        tone: Tone::for_task_scope(&entry.task.scope),
    });
    events.chain(tasks).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct Agenda {
    pub date: String,
    pub events: Vec<Event>,
    pub tasks: Vec<TaskEntry>,
}

pub fn agenda(snapshot: &Snapshot, date: NaiveDate) -> Agenda {
    Agenda {
        date: format_date(date),
        events: snapshot.events_on(date).into_iter().cloned().collect(),
        tasks: snapshot.tasks_due(date).into_iter().cloned().collect(),
    }
}

/// Move `delta` months from `year`/`month`.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + (month as i32 - 1) + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

/// Plain-text month grid for terminal output.
pub fn render_month_text(grid: &MonthGrid) -> String {
    let separator = vec!["-".repeat(CELL_WIDTH); 7].join("-+-");
    let mut lines = vec![grid.title(), String::new()];
    lines.push(
        DAY_NAMES
            .iter()
            .map(|name| pad(name))
            .collect::<Vec<_>>()
            .join(" | "),
    );

    for week in &grid.weeks {
        lines.push(separator.clone());
        let columns: Vec<Vec<String>> = week.iter().map(cell_lines).collect();
        let height = columns.iter().map(Vec::len).max().unwrap_or(1);
        for row in 0..height {
            let line = columns
                .iter()
                .map(|column| pad(column.get(row).map(String::as_str).unwrap_or("")))
                .collect::<Vec<_>>()
                .join(" | ");
            lines.push(line.trim_end().to_string());
        }
    }
    lines.join("\n")
}

fn cell_lines(cell: &DayCell) -> Vec<String> {
    let header = if cell.is_today && cell.in_month {
        format!("{} *", cell.day)
    } else {
        cell.day.to_string()
    };
    let mut lines = vec![header];
    for item in &cell.items {
        let marker = match item.kind {
            ItemKind::Event => "E",
            ItemKind::Task => "T",
        };
        lines.push(format!("{marker} {}", item.label));
    }
    if cell.more > 0 {
        lines.push(format!("+{} more", cell.more));
    }
    lines
}

fn pad(text: &str) -> String {
    let count = text.chars().count();
    if count > CELL_WIDTH {
        let cut: String = text.chars().take(CELL_WIDTH - 2).collect();
        format!("{cut}..")
    } else {
        format!("{text}{}", " ".repeat(CELL_WIDTH - count))
    }
}

/// Human lines for an agenda.
pub fn agenda_lines(agenda: &Agenda) -> Vec<String> {
    let mut lines = vec![format!("Agenda for {}", agenda.date), String::new()];
    lines.push("Events:".to_string());
    if agenda.events.is_empty() {
        lines.push("- No events.".to_string());
    }
    for event in &agenda.events {
        lines.push(format!(
            "- [{}] {} ({} -> {}) {}",
            event.event_id.trim(),
            event.event_name.trim(),
            event.start_date.trim(),
            event.end_date.trim(),
            event.status.trim()
        ));
    }
    lines.push(String::new());
    lines.push("Tasks due:".to_string());
    if agenda.tasks.is_empty() {
        lines.push("- No tasks.".to_string());
    }
    for entry in &agenda.tasks {
        let task = &entry.task;
        let mut line = format!(
            "- [{}] {} ({})",
            task.task_id.trim(),
            task.task_name.trim(),
            task.status.trim()
        );
        if !entry.event_name.is_empty() {
            line.push_str(&format!(" - {}", entry.event_name));
        }
        lines.push(line);
    }
    lines
}
