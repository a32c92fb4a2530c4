//! Content stores: where the CSV files live.
//!
//! Every table is a whole file in a version-controlled store. Reads return the
//! file text together with its revision (the git blob sha); writes replace the
//! whole file and must quote the revision they were based on. A stale revision
//! is rejected with [`Error::RevisionConflict`] and never retried.

mod git;
mod github;

pub use git::GitStore;
pub use github::GithubStore;

use crate::config::{Backend, Config};
use crate::error::{Error, Result};

/// A file read from a store, with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub text: String,
    pub sha: String,
}

/// Seam between the domain modules and the backing store.
pub trait ContentStore {
    /// Read `path`. A missing file is `Ok(None)`.
    fn read(&self, path: &str) -> Result<Option<StoredFile>>;

    /// Replace `path` with `text`, returning the new revision.
    ///
    /// `sha` is the revision observed when the file was read; `None` means the
    /// file is expected not to exist yet.
    fn write(&self, path: &str, text: &str, sha: Option<&str>, message: &str) -> Result<String>;

    /// Human readable location, e.g. `github:owner/repo@main`.
    fn describe(&self) -> String;
}

/// Build the store selected by `config`.
///
/// The GitHub token is read from the environment variable named by
/// `github.token_env`.
pub fn open_store(config: &Config) -> Result<Box<dyn ContentStore>> {
    open_store_with(config, |key| std::env::var(key).ok())
}

pub(crate) fn open_store_with(
    config: &Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Box<dyn ContentStore>> {
    match config.store.backend {
        Backend::Github => {
            let owner = required(config.github.owner.as_deref(), "github.owner", "GITHUB_OWNER")?;
            let repo = required(config.github.repo.as_deref(), "github.repo", "GITHUB_REPO")?;
            let token_env = &config.github.token_env;
            let token = lookup(token_env)
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
                .ok_or_else(|| {
                    Error::MissingCredentials(format!("{token_env} is not set"))
                })?;
            let store = GithubStore::new(&config.github, owner, repo, token)?;
            tracing::debug!(store = %store.describe(), "opened github store");
            Ok(Box::new(store))
        }
        Backend::Git => {
            let path = config.git.path.clone().ok_or_else(|| {
                Error::InvalidConfig(
                    "git.path must be set for the git backend (or pass --store-path)".to_string(),
                )
            })?;
            let store = GitStore::open(&path, config.store.lock_timeout_ms)?;
            tracing::debug!(store = %store.describe(), "opened git store");
            Ok(Box::new(store))
        }
    }
}

fn required(value: Option<&str>, field: &str, env: &str) -> Result<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidConfig(format!("{field} is not set (or export {env})")))
}
