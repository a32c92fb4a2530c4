//! eventops - event operations over CSV tables
//!
//! This library provides the core functionality for the eventops CLI: events,
//! tasks, referee nominations, document links and task templates kept as CSV
//! files in a git repository, read and written through a content store.
//!
//! # Core Concepts
//!
//! - **Tables**: one CSV file per entity, integer ids assigned as max + 1
//! - **Revisions**: every write carries the file SHA it was read at and is
//!   rejected when the file moved on
//! - **Stores**: the GitHub Contents API, or a local git checkout
//! - **Templates**: named task lists applied to an event or to today
//!
//! # Module Organization
//!
//! - `calendar`: Summary metrics, month grid and day agenda
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.eventops.toml`
//! - `context`: Config, opened tables and today's date for a command
//! - `error`: Error types and result aliases
//! - `events`, `tasks`, `links`, `referees`, `templates`: table operations
//! - `git`: Git operations wrapper using libgit2
//! - `lock`: File locking and atomic writes for the local store
//! - `model`: Record types and normalization rules
//! - `output`: Human and JSON output
//! - `store`: Content store backends
//! - `table`: CSV tables with revisions
//! - `ui`: Terminal dashboard

pub mod calendar;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod git;
pub mod links;
pub mod lock;
pub mod model;
pub mod output;
pub mod referees;
pub mod store;
pub mod table;
pub mod tasks;
pub mod templates;
pub mod ui;

pub use error::{Error, Result};
