//! Record types for the CSV tables and the small amount of normalization the
//! views rely on.
//!
//! Every column is kept as a string, exactly as stored. Dates are parsed on
//! demand with [`parse_date`]; a value that does not parse is treated as
//! "no date" rather than an error, since the files are also edited by hand.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::table::Record;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const SCOPE_EVENT: &str = "Event";
pub const SCOPE_GENERAL: &str = "General";

/// Parse a `YYYY-MM-DD` date, ignoring surrounding whitespace.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `date` moved by `days`, or `None` when the result leaves chrono's range.
pub fn shift_date(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

/// Current UTC time in the `updated_at` column format.
pub fn now_stamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Scope of a task row: a blank scope is `Event` when the row names an event.
pub fn normalize_scope(scope: &str, event_id: &str) -> String {
    let scope = scope.trim();
    if !scope.is_empty() {
        return scope.to_string();
    }
    if event_id.trim().is_empty() {
        SCOPE_GENERAL.to_string()
    } else {
        SCOPE_EVENT.to_string()
    }
}

pub fn is_event_scope(scope: &str) -> bool {
    scope.trim().eq_ignore_ascii_case(SCOPE_EVENT)
}

/// Canonical spelling of a user-supplied scope.
pub fn parse_scope(value: &str) -> Option<&'static str> {
    let value = value.trim();
    if value.eq_ignore_ascii_case(SCOPE_EVENT) {
        Some(SCOPE_EVENT)
    } else if value.eq_ignore_ascii_case(SCOPE_GENERAL) {
        Some(SCOPE_GENERAL)
    } else {
        None
    }
}

/// Display color class for calendar items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Green,
    Grey,
    Red,
    Blue,
    Purple,
    Yellow,
}

impl Tone {
    pub fn for_event_status(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "ongoing" => Tone::Green,
            "completed" => Tone::Grey,
            "cancelled" => Tone::Red,
            _ => Tone::Blue,
        }
    }

    pub fn for_task_scope(scope: &str) -> Self {
        if is_event_scope(scope) {
            Tone::Purple
        } else {
            Tone::Yellow
        }
    }
}

macro_rules! record {
    ($ty:ident, $file:literal, $kind:literal, $id:ident, [$($field:ident),+ $(,)?]) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $ty {
            $(pub $field: String,)+
        }

        impl Record for $ty {
            const FILE: &'static str = $file;
            const KIND: &'static str = $kind;
            const HEADERS: &'static [&'static str] = &[$(stringify!($field)),+];

            fn id(&self) -> &str {
                &self.$id
            }

            fn set_id(&mut self, id: String) {
                self.$id = id;
            }
        }
    };
}

record!(Event, "events.csv", "Event", event_id, [
    event_id, event_name, location, start_date, end_date, status,
]);

record!(Task, "tasks.csv", "Task", task_id, [
    task_id, scope, event_id, task_name, due_date, owner, status, priority, category, notes,
]);

record!(Referee, "referees.csv", "Referee", ref_id, [
    ref_id, first_name, last_name, nf, level,
]);

record!(Assignment, "assignments.csv", "Assignment", assign_id, [
    assign_id, ref_id, event_id, position,
]);

record!(EventFile, "event_files.csv", "File", file_id, [
    file_id, event_id, title, link, notes, updated_at,
]);

record!(EventReport, "event_reports.csv", "Report", report_id, [
    report_id, event_id, title, link, notes, updated_at,
]);

record!(TaskTemplate, "task_templates.csv", "Template", template_id, [
    template_id, scope, template_name, task_name, due_offset_days, default_owner, category,
    priority,
]);

impl Event {
    /// Start and end dates, when both parse.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((parse_date(&self.start_date)?, parse_date(&self.end_date)?))
    }

    /// Whether the event runs on `day` (inclusive on both ends).
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.date_range()
            .map(|(start, end)| start <= day && day <= end)
            .unwrap_or(false)
    }

    pub fn tone(&self) -> Tone {
        Tone::for_event_status(&self.status)
    }
}

impl Task {
    pub fn normalized_scope(&self) -> String {
        normalize_scope(&self.scope, &self.event_id)
    }

    pub fn is_done(&self, done_status: &str) -> bool {
        self.status.trim().eq_ignore_ascii_case(done_status.trim())
    }

    /// Due before `today` and not done.
    pub fn is_overdue(&self, today: NaiveDate, done_status: &str) -> bool {
        match parse_date(&self.due_date) {
            Some(due) => due < today && !self.is_done(done_status),
            None => false,
        }
    }
}

impl Referee {
    /// `#id | Last First | NF`, dropping empty parts.
    pub fn label(&self) -> String {
        let name = [self.last_name.trim(), self.first_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        [format!("#{}", self.ref_id.trim()), name, self.nf.trim().to_string()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl TaskTemplate {
    /// Template rows default to event scope.
    pub fn normalized_scope(&self) -> String {
        let scope = self.scope.trim();
        if scope.is_empty() {
            SCOPE_EVENT.to_string()
        } else {
            scope.to_string()
        }
    }

    /// Offset in days; anything that is not a number counts as zero.
    pub fn offset_days(&self) -> i64 {
        let raw = self.due_offset_days.trim();
        raw.parse::<i64>()
            .ok()
            .or_else(|| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .map(|value| value.trunc() as i64)
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn parse_date_is_strict_but_trims() {
        assert_eq!(parse_date(" 2024-03-01 "), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("01/03/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn blank_scope_follows_event_id() {
        assert_eq!(normalize_scope("", "4"), "Event");
        assert_eq!(normalize_scope("  ", ""), "General");
        assert_eq!(normalize_scope("general", "4"), "general");
        assert!(is_event_scope("EVENT"));
        assert_eq!(parse_scope("general"), Some("General"));
        assert_eq!(parse_scope("all"), None);
    }

    #[test]
    fn tones() {
        assert_eq!(Tone::for_event_status("Ongoing"), Tone::Green);
        assert_eq!(Tone::for_event_status("completed"), Tone::Grey);
        assert_eq!(Tone::for_event_status("Cancelled"), Tone::Red);
        assert_eq!(Tone::for_event_status("Planned"), Tone::Blue);
        assert_eq!(Tone::for_task_scope("Event"), Tone::Purple);
        assert_eq!(Tone::for_task_scope("General"), Tone::Yellow);
    }

    #[test]
    fn headers_follow_field_order() {
        assert_eq!(
            Event::HEADERS,
            &["event_id", "event_name", "location", "start_date", "end_date", "status"]
        );
        assert_eq!(TaskTemplate::HEADERS.len(), 8);
        assert_eq!(EventReport::FILE, "event_reports.csv");
    }

    #[test]
    fn event_covers_inclusive_range() {
        let event = Event {
            start_date: "2024-05-10".into(),
            end_date: "2024-05-12".into(),
            ..Event::default()
        };
        assert!(event.covers(date("2024-05-10")));
        assert!(event.covers(date("2024-05-12")));
        assert!(!event.covers(date("2024-05-13")));

        let undated = Event {
            start_date: "2024-05-10".into(),
            ..Event::default()
        };
        assert!(!undated.covers(date("2024-05-10")));
    }

    #[test]
    fn overdue_ignores_done_and_undated() {
        let today = date("2024-05-10");
        let mut task = Task {
            due_date: "2024-05-09".into(),
            status: "In progress".into(),
            ..Task::default()
        };
        assert!(task.is_overdue(today, "Done"));
        task.status = "done".into();
        assert!(!task.is_overdue(today, "Done"));
        task.status = "Blocked".into();
        task.due_date = "2024-05-10".into();
        assert!(!task.is_overdue(today, "Done"));
        task.due_date = "soon".into();
        assert!(!task.is_overdue(today, "Done"));
    }

    #[test]
    fn referee_label_drops_empty_parts() {
        let referee = Referee {
            ref_id: "7".into(),
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            nf: "POR".into(),
            level: String::new(),
        };
        assert_eq!(referee.label(), "#7 | Silva Ana | POR");

        let bare = Referee {
            ref_id: "8".into(),
            last_name: "Kim".into(),
            ..Referee::default()
        };
        assert_eq!(bare.label(), "#8 | Kim");
    }

    #[test]
    fn template_offset_parsing() {
        let mut template = TaskTemplate {
            due_offset_days: "-7".into(),
            ..TaskTemplate::default()
        };
        assert_eq!(template.offset_days(), -7);
        template.due_offset_days = "3.0".into();
        assert_eq!(template.offset_days(), 3);
        template.due_offset_days = "soon".into();
        assert_eq!(template.offset_days(), 0);
        assert_eq!(template.normalized_scope(), "Event");
    }

    #[test]
    fn shift_date_stays_in_range() {
        let day = parse_date("2024-05-15").unwrap();
        assert_eq!(shift_date(day, -30), parse_date("2024-04-15"));
        assert_eq!(shift_date(day, 99_999_999), None);
        assert_eq!(shift_date(day, i64::MAX), None);
    }
}
