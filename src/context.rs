//! Everything a command needs: configuration, the opened tables and "today".

use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::config::Config;
use crate::error::Result;
use crate::store::{open_store, ContentStore};
use crate::table::DataStore;

pub struct Context {
    pub config: Config,
    pub data: DataStore,
    pub today: NaiveDate,
}

/// Global flags that shape how the context is built.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub config: Option<PathBuf>,
    pub store_path: Option<PathBuf>,
    pub today: Option<NaiveDate>,
}

impl Context {
    /// Resolve config, apply environment overrides and open the store.
    pub fn load(options: &ContextOptions) -> Result<Self> {
        let mut config = Config::resolve(options.config.as_deref())?;
        config.apply_env(|key| std::env::var(key).ok());
        if let Some(path) = options.store_path.clone() {
            config.use_git_store(path);
        }
        let store = open_store(&config)?;
        let today = options.today.unwrap_or_else(|| Local::now().date_naive());
        Ok(Self::with_store(config, store, today))
    }

    pub fn with_store(config: Config, store: Box<dyn ContentStore>, today: NaiveDate) -> Self {
        let data = DataStore::new(store, &config.store.data_dir);
        Self {
            config,
            data,
            today,
        }
    }
}
