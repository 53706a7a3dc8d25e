//! Application state.

use crate::config::AppConfig;
use crate::db::{DbError, SettingsRepository, SqliteRepository};
use crate::dictionary::LocalDictionary;
use anyhow::Context;
use std::path::PathBuf;

/// Open repository plus the configuration it came from.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub repository: SqliteRepository,
}

impl AppState {
    pub fn new(config: AppConfig, repository: SqliteRepository) -> Self {
        Self { config, repository }
    }

    /// Open (and create if needed) the configured database.
    pub fn open(config: AppConfig) -> anyhow::Result<Self> {
        if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        tracing::debug!(path = %config.db_path.display(), "opening database");
        let repository = SqliteRepository::open(&config.db_path)
            .with_context(|| format!("opening database {}", config.db_path.display()))?;
        tracing::debug!(schema_version = ?repository.schema_version()?, "database ready");
        Ok(Self::new(config, repository))
    }

    /// Dictionary location: the saved setting wins over the environment.
    pub fn dictionary_path(&self) -> Result<PathBuf, DbError> {
        let settings = self.repository.get_settings()?;
        Ok(settings
            .dictionary_path
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.dictionary_path.clone()))
    }

    pub fn load_dictionary(&self) -> anyhow::Result<LocalDictionary> {
        let path = self.dictionary_path()?;
        Ok(LocalDictionary::load(path)?)
    }

    /// Close the connection, run `f` on the database file, then reopen.
    pub fn with_closed_database<T>(
        self,
        f: impl FnOnce(&AppConfig) -> anyhow::Result<T>,
    ) -> anyhow::Result<(Self, T)> {
        let Self { config, repository } = self;
        repository.close()?;
        let value = f(&config)?;
        let state = Self::open(config)?;
        Ok((state, value))
    }
}
