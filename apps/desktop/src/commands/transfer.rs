//! Import, export, backup and restore commands.

use crate::backup::{backup_db_file, list_backups, restore_db_file};
use crate::db::CardRepository;
use crate::state::AppState;
use crate::transfer::{export_cards_to_path, import_cards_from_path, ImportOptions, ImportReport};
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn import<W: Write>(
    state: &AppState,
    path: &Path,
    options: &ImportOptions,
    out: &mut W,
) -> anyhow::Result<ImportReport> {
    let report = import_cards_from_path(&state.repository, path, options)
        .with_context(|| format!("importing {}", path.display()))?;
    writeln!(
        out,
        "Imported {} rows: {} updated, {} new, {} duplicates found, {} skipped.",
        report.imported, report.updated, report.created, report.duplicates, report.skipped
    )?;
    Ok(report)
}

pub fn export<W: Write>(
    state: &AppState,
    path: &Path,
    units: &[String],
    out: &mut W,
) -> anyhow::Result<usize> {
    let cards = state
        .repository
        .list_cards(&super::study::scope_for(units))?;
    export_cards_to_path(path, &cards).with_context(|| format!("exporting to {}", path.display()))?;
    writeln!(out, "Exported {} cards to {}.", cards.len(), path.display())?;
    Ok(cards.len())
}

pub fn backup<W: Write>(state: &AppState, dir: Option<&Path>, out: &mut W) -> anyhow::Result<PathBuf> {
    let dir = dir.unwrap_or(state.config.backup_dir.as_path());
    let path = backup_db_file(&state.config.db_path, dir)?;
    writeln!(out, "Backup written to {}.", path.display())?;
    Ok(path)
}

/// Restore `backup`, or the newest backup when `None`. Returns the reopened
/// state.
pub fn restore<W: Write>(
    state: AppState,
    backup: Option<&Path>,
    out: &mut W,
) -> anyhow::Result<AppState> {
    let source = match backup {
        Some(path) => path.to_path_buf(),
        None => list_backups(&state.config.db_path, &state.config.backup_dir)?
            .into_iter()
            .next()
            .context("no backups found")?,
    };

    let (state, ()) = state.with_closed_database(|config| {
        restore_db_file(&source, &config.db_path)?;
        Ok(())
    })?;
    writeln!(out, "Restored database from {}.", source.display())?;
    Ok(state)
}
