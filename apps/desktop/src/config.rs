//! Environment configuration.

use std::path::PathBuf;

pub const DB_ENV: &str = "KANA_REVIEW_DB";
pub const DICTIONARY_ENV: &str = "LOCAL_JAZH_CSV";
pub const BACKUP_DIR_ENV: &str = "KANA_REVIEW_BACKUP_DIR";

const APP_DIR: &str = "kana-review";
const DB_FILE: &str = "vocab.db";
const DICTIONARY_FILE: &str = "jp_zh_dict.csv";

/// File locations used by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub dictionary_path: PathBuf,
    pub backup_dir: PathBuf,
}

impl AppConfig {
    /// Read locations from the environment, falling back to the local data
    /// directory.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };

        let db_path = var(DB_ENV).unwrap_or_else(|| default_data_dir().join(DB_FILE));
        let data_dir = db_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let dictionary_path =
            var(DICTIONARY_ENV).unwrap_or_else(|| data_dir.join(DICTIONARY_FILE));
        let backup_dir = var(BACKUP_DIR_ENV).unwrap_or_else(|| data_dir.join("backups"));

        Self {
            db_path,
            dictionary_path,
            backup_dir,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}
