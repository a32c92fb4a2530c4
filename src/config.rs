//! Configuration loading and management
//!
//! Handles parsing of `.eventops.toml` configuration files and the
//! environment overrides for the GitHub backend.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default configuration file name, looked up in the current directory
pub const CONFIG_FILE: &str = ".eventops.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backing store selection
    #[serde(default)]
    pub store: StoreConfig,

    /// GitHub Contents API backend
    #[serde(default)]
    pub github: GithubConfig,

    /// Local git checkout backend
    #[serde(default)]
    pub git: GitConfig,

    /// Event configuration
    #[serde(default)]
    pub events: EventsConfig,

    /// Tasks configuration
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Referee assignment configuration
    #[serde(default)]
    pub referees: RefereesConfig,

    /// Calendar and summary configuration
    #[serde(default)]
    pub calendar: CalendarConfig,
}

/// Which backend holds the CSV files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Github,
    Git,
}

/// Store-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend holding the tables
    #[serde(default = "default_backend")]
    pub backend: Backend,

    /// Directory (inside the repository) holding the CSV files
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// How long a local write waits for the store lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_backend() -> Backend {
    Backend::Github
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            data_dir: default_data_dir(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// GitHub Contents API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Repository owner (user or organization)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Repository name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Branch the data files live on
    #[serde(default = "default_branch")]
    pub branch: String,

    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Name of the environment variable holding the access token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            branch: default_branch(),
            api_url: default_api_url(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Local git checkout configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitConfig {
    /// Path to the working tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Event configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Allowed event statuses
    #[serde(default = "default_event_statuses")]
    pub statuses: Vec<String>,

    /// Status for new events
    #[serde(default = "default_event_status")]
    pub default_status: String,
}

fn default_event_statuses() -> Vec<String> {
    ["Planned", "Open", "Confirmed", "Ongoing", "Completed", "Cancelled"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_event_status() -> String {
    "Planned".to_string()
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            statuses: default_event_statuses(),
            default_status: default_event_status(),
        }
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Allowed task statuses
    #[serde(default = "default_task_statuses")]
    pub statuses: Vec<String>,

    /// Default status for new tasks
    #[serde(default = "default_task_status")]
    pub default_status: String,

    /// Status set by `eventops task done`
    #[serde(default = "default_done_status")]
    pub done_status: String,
}

fn default_task_statuses() -> Vec<String> {
    ["Not started", "In progress", "Done", "Blocked"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_task_status() -> String {
    "Not started".to_string()
}

fn default_done_status() -> String {
    "Done".to_string()
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            statuses: default_task_statuses(),
            default_status: default_task_status(),
            done_status: default_done_status(),
        }
    }
}

/// Referee assignment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefereesConfig {
    /// Allowed positions for an assignment
    #[serde(default = "default_positions")]
    pub positions: Vec<String>,
}

fn default_positions() -> Vec<String> {
    ["Referee Delegate", "Referee", "Candidate", "Line Judge", "Other"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for RefereesConfig {
    fn default() -> Self {
        Self {
            positions: default_positions(),
        }
    }
}

/// Calendar and summary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Items shown per day cell before collapsing into "+N more"
    #[serde(default = "default_max_items")]
    pub max_items_per_day: usize,

    /// Window for the "upcoming" summary count
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: i64,
}

fn default_max_items() -> usize {
    3
}

const MAX_UPCOMING_DAYS: i64 = 3650;

fn default_upcoming_days() -> i64 {
    14
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            max_items_per_day: default_max_items(),
            upcoming_days: default_upcoming_days(),
        }
    }
}

impl Config {
    /// Load configuration from a `.eventops.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory, or return defaults
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Resolve configuration the way the CLI does: an explicit path must
    /// load cleanly, the implicit one falls back to defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Ok(Self::load_from_dir(&std::env::current_dir()?)),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `GITHUB_OWNER`, `GITHUB_REPO` and `GITHUB_BRANCH` overrides
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(owner) = non_empty("GITHUB_OWNER") {
            self.github.owner = Some(owner);
        }
        if let Some(repo) = non_empty("GITHUB_REPO") {
            self.github.repo = Some(repo);
        }
        if let Some(branch) = non_empty("GITHUB_BRANCH") {
            self.github.branch = branch;
        }
    }

    /// Point the store at a local git checkout
    pub fn use_git_store(&mut self, path: PathBuf) {
        self.store.backend = Backend::Git;
        self.git.path = Some(path);
    }

    fn validate(&self) -> Result<()> {
        validate_status_list("events.statuses", &self.events.statuses)?;
        ensure_listed(
            "events.default_status",
            &self.events.default_status,
            &self.events.statuses,
        )?;
        validate_status_list("tasks.statuses", &self.tasks.statuses)?;
        ensure_listed(
            "tasks.default_status",
            &self.tasks.default_status,
            &self.tasks.statuses,
        )?;
        ensure_listed(
            "tasks.done_status",
            &self.tasks.done_status,
            &self.tasks.statuses,
        )?;
        validate_status_list("referees.positions", &self.referees.positions)?;
        if self.calendar.max_items_per_day == 0 {
            return Err(Error::InvalidConfig(
                "calendar.max_items_per_day must be > 0".to_string(),
            ));
        }
        if !(0..=MAX_UPCOMING_DAYS).contains(&self.calendar.upcoming_days) {
            return Err(Error::InvalidConfig(format!(
                "calendar.upcoming_days must be between 0 and {MAX_UPCOMING_DAYS}"
            )));
        }
        if self.github.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "github.timeout_secs must be > 0".to_string(),
            ));
        }
        if self.store.data_dir.contains("..") {
            return Err(Error::InvalidConfig(
                "store.data_dir cannot contain '..'".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_status_list(field: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(Error::InvalidConfig(format!("{field} cannot be empty")));
    }
    let mut seen = std::collections::HashSet::new();
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "{field} cannot include empty entries"
            )));
        }
        if !seen.insert(trimmed.to_lowercase()) {
            return Err(Error::InvalidConfig(format!(
                "{field} has duplicate entry '{trimmed}'"
            )));
        }
    }
    Ok(())
}

fn ensure_listed(field: &str, value: &str, allowed: &[String]) -> Result<()> {
    if allowed.iter().any(|entry| entry.trim() == value.trim()) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{field} '{value}' is not one of the configured values"
        )))
    }
}

/// Match `input` against `allowed` case-insensitively, returning the canonical spelling.
pub fn canonical_choice(field: &str, input: &str, allowed: &[String]) -> Result<String> {
    let trimmed = input.trim();
    allowed
        .iter()
        .find(|entry| entry.trim().eq_ignore_ascii_case(trimmed))
        .map(|entry| entry.trim().to_string())
        .ok_or_else(|| {
            Error::InvalidArgument(format!(
                "invalid {field} '{trimmed}': expected one of {}",
                allowed.join(", ")
            ))
        })
}
