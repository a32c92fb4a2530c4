use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::calendar::{self, CalendarItem, ItemKind, MonthGrid, Snapshot, Summary};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::model::shift_date;
use crate::tasks;

use super::view;

const EVENT_POLL_MS: u64 = 250;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    Calendar,
    Agenda,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

pub struct AppState {
    ctx: Context,
    pub(crate) snapshot: Snapshot,
    pub(crate) selected: NaiveDate,
    pub(crate) focus: Focus,
    pub(crate) agenda_index: usize,
    pub(crate) show_help: bool,
    status: Option<(StatusKind, String)>,
}

impl AppState {
    pub fn new(ctx: Context) -> Result<Self> {
        let snapshot = Snapshot::load(&ctx)?;
        let selected = ctx.today;
        Ok(Self {
            ctx,
            snapshot,
            selected,
            focus: Focus::Calendar,
            agenda_index: 0,
            show_help: false,
            status: None,
        })
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.ctx.today
    }

    pub(crate) fn store_label(&self) -> String {
        self.ctx.data.describe()
    }

    pub(crate) fn summary(&self) -> Summary {
        calendar::summarize(
            &self.snapshot,
            self.ctx.today,
            self.ctx.config.calendar.upcoming_days,
        )
    }

    pub(crate) fn grid(&self) -> Result<MonthGrid> {
        calendar::month_grid(
            &self.snapshot,
            self.selected.year(),
            self.selected.month(),
            self.ctx.today,
            self.ctx.config.calendar.max_items_per_day,
        )
    }

    /// Everything on the selected day, uncapped.
    pub(crate) fn agenda_items(&self) -> Vec<CalendarItem> {
        calendar::day_items(&self.snapshot, self.selected)
    }

    pub(crate) fn status(&self) -> Option<(StatusKind, &str)> {
        self.status
            .as_ref()
            .map(|(kind, message)| (*kind, message.as_str()))
    }

    fn set_info(&mut self, message: impl Into<String>) {
        self.status = Some((StatusKind::Info, message.into()));
    }

    fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some((StatusKind::Error, message.into()));
    }

    fn select(&mut self, date: NaiveDate) {
        let (min, max) = (
            NaiveDate::from_ymd_opt(calendar::MIN_YEAR, 1, 1),
            NaiveDate::from_ymd_opt(calendar::MAX_YEAR, 12, 31),
        );
        let in_range = match (min, max) {
            (Some(min), Some(max)) => min <= date && date <= max,
            _ => false,
        };
        if !in_range {
            self.set_error("date outside the calendar range");
            return;
        }
        if date != self.selected {
            self.selected = date;
            self.agenda_index = 0;
        }
    }

    fn move_days(&mut self, delta: i64) {
        if let Some(day) = shift_date(self.selected, delta) {
            self.select(day);
        }
    }

    /// Jump months, keeping the day of month where the target month allows.
    fn shift_months(&mut self, delta: i32) {
        let (year, month) = calendar::shift_month(self.selected.year(), self.selected.month(), delta);
        let mut day = self.selected.day();
        let target = loop {
            match NaiveDate::from_ymd_opt(year, month, day) {
                Some(date) => break Some(date),
                None if day > 28 => day -= 1,
                None => break None,
            }
        };
        match target {
            Some(date) => self.select(date),
            None => self.set_error("date outside the calendar range"),
        }
    }

    fn move_agenda(&mut self, delta: isize) {
        let len = self.agenda_items().len();
        if len == 0 {
            self.agenda_index = 0;
            return;
        }
        let next = self.agenda_index as isize + delta;
        self.agenda_index = next.clamp(0, len as isize - 1) as usize;
    }

    pub(crate) fn reload(&mut self) {
        match Snapshot::load(&self.ctx) {
            Ok(snapshot) => {
                self.snapshot = snapshot;
                let len = self.agenda_items().len();
                self.agenda_index = self.agenda_index.min(len.saturating_sub(1));
                self.set_info("reloaded");
            }
            Err(err) => self.set_error(format!("reload failed: {err}")),
        }
    }

    pub(crate) fn mark_selected_done(&mut self) {
        let items = self.agenda_items();
        let Some(item) = items.get(self.agenda_index) else {
            self.set_error("nothing selected in the agenda");
            return;
        };
        if item.kind != ItemKind::Task {
            self.set_error("only tasks can be marked done");
            return;
        }

        let id = item.id.clone();
        match tasks::mark_done(&self.ctx, &id) {
            Ok(outcome) if outcome.changed => {
                self.reload();
                self.set_info(format!("task {id} marked done"));
            }
            Ok(_) => self.set_info(format!("task {id} is already done")),
            Err(Error::RevisionConflict(path)) => {
                self.set_error(format!("{path} changed on the server; press r to reload"));
            }
            Err(err) => self.set_error(err.to_string()),
        }
    }

    /// Apply a key press. Returns true when the dashboard should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Char('q')) {
                return true;
            }
            self.show_help = false;
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Calendar => Focus::Agenda,
                    Focus::Agenda => Focus::Calendar,
                };
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_days(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_days(1),
            KeyCode::Up | KeyCode::Char('k') => match self.focus {
                Focus::Calendar => self.move_days(-7),
                Focus::Agenda => self.move_agenda(-1),
            },
            KeyCode::Down | KeyCode::Char('j') => match self.focus {
                Focus::Calendar => self.move_days(7),
                Focus::Agenda => self.move_agenda(1),
            },
            KeyCode::Char('n') => self.shift_months(1),
            KeyCode::Char('p') => self.shift_months(-1),
            KeyCode::Char('t') => {
                let today = self.ctx.today;
                self.select(today);
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('x') => self.mark_selected_done(),
            _ => {}
        }
        false
    }
}

/// Open the full-screen dashboard until the user quits.
pub fn run(ctx: Context) -> Result<()> {
    let mut app = AppState::new(ctx)?;
    run_terminal(&mut app)
}

fn run_terminal(app: &mut AppState) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if app.handle_key(key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
    Ok(())
}
