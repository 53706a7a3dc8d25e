//! Database file backup and restore.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("database file not found: {0}")]
    DatabaseMissing(PathBuf),

    #[error("backup file not found: {0}")]
    BackupMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Copy the database into `dir` as `<stem>_<YYYYmmdd_HHMMSS>.db`.
pub fn backup_db_file(db_path: &Path, dir: &Path) -> Result<PathBuf, BackupError> {
    if !db_path.is_file() {
        return Err(BackupError::DatabaseMissing(db_path.to_path_buf()));
    }
    fs::create_dir_all(dir)?;

    let stem = db_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "vocab".to_string());
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let target = dir.join(format!("{stem}_{stamp}.db"));

    fs::copy(db_path, &target)?;
    tracing::info!(backup = %target.display(), "database backed up");
    Ok(target)
}

/// Copy a backup over the database file. Close the repository first and
/// reopen it afterwards.
pub fn restore_db_file(backup: &Path, db_path: &Path) -> Result<(), BackupError> {
    if !backup.is_file() {
        return Err(BackupError::BackupMissing(backup.to_path_buf()));
    }
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::copy(backup, db_path)?;
    tracing::info!(from = %backup.display(), "database restored");
    Ok(())
}

/// Backups in `dir` for the given database, newest first.
pub fn list_backups(db_path: &Path, dir: &Path) -> Result<Vec<PathBuf>, BackupError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let prefix = db_path
        .file_stem()
        .map(|s| format!("{}_", s.to_string_lossy()))
        .unwrap_or_default();

    let mut backups = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "db")
                && path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with(&prefix))
        })
        .collect::<Vec<_>>();
    backups.sort();
    backups.reverse();
    Ok(backups)
}
