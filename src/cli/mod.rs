//! Command-line interface for eventops
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::context::{Context, ContextOptions};
use crate::error::Result;
use crate::model::{EventFile, EventReport};
use crate::output::OutputOptions;
use crate::tasks::ScopeFilter;

mod calendar;
mod dashboard;
mod event;
mod init;
mod link;
mod referee;
mod task;
mod template;

/// eventops - event operations over CSV tables in a git repository
///
/// Events, tasks, referee nominations, document links and task templates,
/// stored as CSV files and written back with the revision they were read at.
#[derive(Parser, Debug)]
#[command(name = "eventops")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file (defaults to ./.eventops.toml)
    #[arg(long, global = true, env = "EVENTOPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Use a local git checkout at this path as the store
    #[arg(long, global = true, env = "EVENTOPS_STORE_PATH")]
    pub store_path: Option<PathBuf>,

    /// Override today's date (YYYY-MM-DD)
    #[arg(long, global = true, env = "EVENTOPS_TODAY", hide = true, value_parser = parse_today)]
    pub today: Option<NaiveDate>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create missing tables with their header rows
    Init {
        /// Also write a default .eventops.toml in the current directory
        #[arg(long)]
        write_config: bool,
    },

    /// Event counts and overdue tasks
    Summary,

    /// Monthly calendar of events and task due dates
    Calendar {
        /// Year to show (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,

        /// Month to show, 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
    },

    /// Events and tasks on one day
    Agenda {
        /// Day to show (YYYY-MM-DD, defaults to today)
        date: Option<String>,
    },

    /// Full-screen calendar dashboard
    Dashboard,

    /// Event management
    #[command(subcommand)]
    Event(EventCommands),

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// File links attached to events
    #[command(subcommand)]
    File(LinkCommands),

    /// Report links attached to events
    #[command(subcommand)]
    Report(LinkCommands),

    /// Referee directory
    #[command(subcommand)]
    Referee(RefereeCommands),

    /// Referee nominations to events
    #[command(subcommand)]
    Assign(AssignCommands),

    /// Task templates
    #[command(subcommand)]
    Template(TemplateCommands),
}

/// Event subcommands
#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// List events sorted by start date
    List {
        /// Only events with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show an event with its tasks, links and referees
    Show {
        /// Event ID
        id: String,
    },

    /// Create an event
    New {
        /// Event name
        #[arg(long)]
        name: String,

        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Venue or city
        #[arg(long, default_value = "")]
        location: String,

        /// Initial status (defaults to the configured default)
        #[arg(long)]
        status: Option<String>,
    },

    /// Edit an event
    Edit {
        /// Event ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Delete an event (related rows are kept)
    Delete {
        /// Event ID
        id: String,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks, open ones first
    List {
        /// Case-insensitive match on task name, event name or owner
        #[arg(long)]
        search: Option<String>,

        /// all, general or event
        #[arg(long, default_value = "all")]
        scope: ScopeFilter,

        /// Only tasks with this status
        #[arg(long)]
        status: Option<String>,

        /// Only tasks of this event
        #[arg(long)]
        event: Option<String>,
    },

    /// Show a task
    Show {
        /// Task ID
        id: String,
    },

    /// Create a task
    New {
        /// Task name
        name: String,

        /// Tie the task to an event
        #[arg(long)]
        event: Option<String>,

        /// Due date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        due: Option<String>,

        #[arg(long, default_value = "")]
        owner: String,

        #[arg(long)]
        status: Option<String>,

        #[arg(long, default_value = "")]
        priority: String,

        #[arg(long, default_value = "")]
        category: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Edit a task
    Edit {
        /// Task ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        priority: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Mark a task done
    Done {
        /// Task ID
        id: String,
    },

    /// Delete tasks
    Delete {
        /// Task IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Subcommands shared by `file` and `report`
#[derive(Subcommand, Debug)]
pub enum LinkCommands {
    /// List links of an event
    List {
        /// Event ID
        #[arg(long)]
        event: String,
    },

    /// Attach a link to an event
    Add {
        /// Event ID
        #[arg(long)]
        event: String,

        #[arg(long)]
        title: String,

        /// URL of the document
        #[arg(long)]
        link: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// Edit a link
    Edit {
        /// Link ID
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        link: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete links
    Delete {
        /// Link IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Referee subcommands
#[derive(Subcommand, Debug)]
pub enum RefereeCommands {
    /// List referees
    List,

    /// Add a referee
    New {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// National federation
        #[arg(long, default_value = "")]
        nf: String,

        #[arg(long, default_value = "")]
        level: String,
    },
}

/// Assignment subcommands
#[derive(Subcommand, Debug)]
pub enum AssignCommands {
    /// List referees nominated to an event
    List {
        /// Event ID
        #[arg(long)]
        event: String,
    },

    /// Nominate a referee to an event
    Add {
        /// Event ID
        #[arg(long)]
        event: String,

        /// Referee ID
        #[arg(long = "ref")]
        referee: String,

        /// Position (see referees.positions in config)
        #[arg(long)]
        position: String,
    },

    /// Remove a nomination
    Remove {
        /// Assignment ID
        id: String,
    },
}

/// Template subcommands
#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// List template rows
    List {
        /// Event or General
        #[arg(long)]
        scope: Option<String>,
    },

    /// Add a row to a template
    Add(TemplateRowArgs),

    /// Edit a template row
    Edit {
        /// Template row ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        task: Option<String>,

        #[arg(long)]
        scope: Option<String>,

        #[arg(long, allow_hyphen_values = true)]
        offset: Option<i64>,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        priority: Option<String>,
    },

    /// Delete template rows
    Delete {
        /// Template row IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Create tasks from a template
    Apply {
        /// Template name
        name: String,

        /// Apply the Event template to this event
        #[arg(long)]
        event: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct TemplateRowArgs {
    /// Template name
    #[arg(long)]
    pub name: String,

    /// Task name
    #[arg(long)]
    pub task: String,

    /// Event or General (defaults to Event)
    #[arg(long)]
    pub scope: Option<String>,

    /// Days after the event start (or today) the task is due
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub offset: i64,

    #[arg(long, default_value = "")]
    pub owner: String,

    #[arg(long, default_value = "")]
    pub category: String,

    #[arg(long, default_value = "")]
    pub priority: String,
}

fn parse_today(value: &str) -> std::result::Result<NaiveDate, String> {
    crate::model::parse_date(value).ok_or_else(|| format!("invalid date '{value}' (expected YYYY-MM-DD)"))
}

/// Global flags every command receives.
#[derive(Debug, Clone)]
pub(crate) struct Globals {
    pub context: ContextOptions,
    pub output: OutputOptions,
}

impl Globals {
    pub(crate) fn context(&self) -> Result<Context> {
        Context::load(&self.context)
    }
}

impl Cli {
    fn globals(&self) -> Globals {
        Globals {
            context: ContextOptions {
                config: self.config.clone(),
                store_path: self.store_path.clone(),
                today: self.today,
            },
            output: OutputOptions {
                json: self.json,
                quiet: self.quiet,
            },
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let globals = self.globals();
        tracing::debug!(command = ?self.command, "running command");
        match self.command {
            Commands::Init { write_config } => init::run(&globals, write_config),
            Commands::Summary => calendar::run_summary(&globals),
            Commands::Calendar { year, month } => {
                calendar::run_calendar(&globals, calendar::CalendarOptions { year, month })
            }
            Commands::Agenda { date } => calendar::run_agenda(&globals, date.as_deref()),
            Commands::Dashboard => dashboard::run(&globals),
            Commands::Event(cmd) => match cmd {
                EventCommands::List { status } => event::run_list(&globals, status.as_deref()),
                EventCommands::Show { id } => event::run_show(&globals, &id),
                EventCommands::New {
                    name,
                    start,
                    end,
                    location,
                    status,
                } => event::run_new(
                    &globals,
                    crate::events::NewEvent {
                        name,
                        location,
                        start_date: start,
                        end_date: end,
                        status,
                    },
                ),
                EventCommands::Edit {
                    id,
                    name,
                    location,
                    start,
                    end,
                    status,
                } => event::run_edit(
                    &globals,
                    &id,
                    crate::events::EventPatch {
                        name,
                        location,
                        start_date: start,
                        end_date: end,
                        status,
                    },
                ),
                EventCommands::Delete { id } => event::run_delete(&globals, &id),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::List {
                    search,
                    scope,
                    status,
                    event,
                } => task::run_list(
                    &globals,
                    crate::tasks::TaskFilter {
                        search,
                        scope,
                        status,
                        event_id: event,
                    },
                ),
                TaskCommands::Show { id } => task::run_show(&globals, &id),
                TaskCommands::New {
                    name,
                    event,
                    due,
                    owner,
                    status,
                    priority,
                    category,
                    notes,
                } => task::run_new(
                    &globals,
                    crate::tasks::NewTask {
                        name,
                        event_id: event,
                        due_date: due,
                        owner,
                        status,
                        priority,
                        category,
                        notes,
                    },
                ),
                TaskCommands::Edit {
                    id,
                    name,
                    due,
                    owner,
                    status,
                    priority,
                    category,
                    notes,
                } => task::run_edit(
                    &globals,
                    &id,
                    crate::tasks::TaskPatch {
                        name,
                        due_date: due,
                        owner,
                        status,
                        priority,
                        category,
                        notes,
                    },
                ),
                TaskCommands::Done { id } => task::run_done(&globals, &id),
                TaskCommands::Delete { ids } => task::run_delete(&globals, &ids),
            },
            Commands::File(cmd) => link::run::<EventFile>(&globals, cmd),
            Commands::Report(cmd) => link::run::<EventReport>(&globals, cmd),
            Commands::Referee(cmd) => match cmd {
                RefereeCommands::List => referee::run_list(&globals),
                RefereeCommands::New {
                    first_name,
                    last_name,
                    nf,
                    level,
                } => referee::run_new(
                    &globals,
                    crate::referees::NewReferee {
                        first_name,
                        last_name,
                        nf,
                        level,
                    },
                ),
            },
            Commands::Assign(cmd) => match cmd {
                AssignCommands::List { event } => referee::run_assign_list(&globals, &event),
                AssignCommands::Add {
                    event,
                    referee,
                    position,
                } => referee::run_assign_add(&globals, &event, &referee, &position),
                AssignCommands::Remove { id } => referee::run_assign_remove(&globals, &id),
            },
            Commands::Template(cmd) => match cmd {
                TemplateCommands::List { scope } => template::run_list(&globals, scope.as_deref()),
                TemplateCommands::Add(args) => template::run_add(
                    &globals,
                    crate::templates::NewTemplateRow {
                        template_name: args.name,
                        task_name: args.task,
                        scope: args.scope,
                        offset_days: args.offset,
                        owner: args.owner,
                        category: args.category,
                        priority: args.priority,
                    },
                ),
                TemplateCommands::Edit {
                    id,
                    name,
                    task,
                    scope,
                    offset,
                    owner,
                    category,
                    priority,
                } => template::run_edit(
                    &globals,
                    &id,
                    crate::templates::TemplatePatch {
                        template_name: name,
                        task_name: task,
                        scope,
                        offset_days: offset,
                        owner,
                        category,
                        priority,
                    },
                ),
                TemplateCommands::Delete { ids } => template::run_delete(&globals, &ids),
                TemplateCommands::Apply { name, event } => {
                    template::run_apply(&globals, &name, event.as_deref())
                }
            },
        }
    }
}
