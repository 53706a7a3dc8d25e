//! CSV import and export of cards.

use crate::db::date_utils::format_timestamp;
use crate::db::{CardRepository, DbError, SqliteRepository};
use crate::encoding::read_text;
use crate::models::{NewCard, DEFAULT_UNIT};
use review_core::Card;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

/// Column order of exported files.
pub const EXPORT_HEADERS: [&str; 12] = [
    "unit",
    "kana",
    "kanji",
    "romaji",
    "meaning",
    "created_at",
    "last_review",
    "interval",
    "repetition",
    "ef",
    "due_date",
    "id",
];

const BOM: &[u8] = "\u{feff}".as_bytes();

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("CSV has no kana, kanji or meaning column")]
    MissingColumns,
}

/// What to do with a row matching an existing card in the same unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DuplicatePolicy {
    #[default]
    Skip,
    /// Replace the written forms and meaning of the existing card.
    Overwrite,
    /// Insert a new card next to the existing one.
    KeepBoth,
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub policy: DuplicatePolicy,
    /// Put every row in this unit instead of the unit column.
    pub fixed_unit: Option<String>,
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportReport {
    /// Rows written, either as new cards or as overwrites.
    pub imported: usize,
    pub updated: usize,
    pub created: usize,
    /// Rows that matched an existing card, whatever the policy did with them.
    pub duplicates: usize,
    /// Rows without a kana or kanji form.
    pub skipped: usize,
}

/// Map a header cell to its canonical column name.
pub fn normalize_header(header: &str) -> String {
    let key = header.trim().trim_start_matches('\u{feff}').trim().to_lowercase();
    let canonical = match key.as_str() {
        "单元" => "unit",
        "假名" | "词条" | "term" => "kana",
        "汉字" | "汉字写法" => "kanji",
        "罗马音" | "roma" => "romaji",
        "释义" | "中文" => "meaning",
        "due" => "due_date",
        other => other,
    };
    canonical.to_string()
}

/// Write cards to `writer` as CSV with a UTF-8 byte order mark.
pub fn export_cards<W: Write>(mut writer: W, cards: &[Card]) -> Result<(), CsvError> {
    writer.write_all(BOM)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_HEADERS)?;

    for card in cards {
        let memory = &card.memory;
        csv_writer.write_record([
            card.unit.clone(),
            card.kana.clone(),
            card.kanji.clone().unwrap_or_default(),
            card.romaji.clone().unwrap_or_default(),
            card.meaning.clone(),
            card.created_at.as_ref().map(format_timestamp).unwrap_or_default(),
            memory.last_reviewed_at.as_ref().map(format_timestamp).unwrap_or_default(),
            memory.interval.to_string(),
            memory.repetition.to_string(),
            memory.easiness.to_string(),
            memory.due_at.as_ref().map(format_timestamp).unwrap_or_default(),
            card.id.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_cards_to_path(path: impl AsRef<Path>, cards: &[Card]) -> Result<(), CsvError> {
    let path = path.as_ref();
    export_cards(File::create(path)?, cards)?;
    tracing::info!(path = %path.display(), cards = cards.len(), "exported cards");
    Ok(())
}

/// One parsed import row.
#[derive(Debug, Clone, Default, PartialEq)]
struct ImportRow {
    unit: String,
    kana: String,
    kanji: String,
    romaji: String,
    meaning: String,
}

fn read_rows<R: Read>(reader: R) -> Result<Vec<ImportRow>, CsvError> {
    let text = read_text(reader)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (normalize_header(h), i))
        .collect();
    if !["kana", "kanji", "meaning"]
        .iter()
        .any(|c| columns.contains_key(*c))
    {
        return Err(CsvError::MissingColumns);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |name: &str| {
            columns
                .get(name)
                .and_then(|&i| record.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        rows.push(ImportRow {
            unit: field("unit"),
            kana: field("kana"),
            kanji: field("kanji"),
            romaji: field("romaji"),
            meaning: field("meaning"),
        });
    }
    Ok(rows)
}

/// Import cards from CSV. Memory state columns are ignored; imported cards
/// start fresh.
///
/// The whole file is parsed before anything is written, and the writes run
/// in one transaction, so a failed import leaves the deck untouched.
pub fn import_cards<R: Read>(
    repo: &SqliteRepository,
    reader: R,
    options: &ImportOptions,
) -> Result<ImportReport, CsvError> {
    let rows = read_rows(reader)?;
    let report = repo
        .in_transaction(|repo| write_rows(repo, rows, options))
        .inspect_err(|error| tracing::warn!(%error, "import rolled back"))?;

    tracing::info!(
        imported = report.imported,
        created = report.created,
        duplicates = report.duplicates,
        "import finished"
    );
    Ok(report)
}

fn write_rows<C: CardRepository + ?Sized>(
    repo: &C,
    rows: Vec<ImportRow>,
    options: &ImportOptions,
) -> Result<ImportReport, CsvError> {
    let fixed_unit = options
        .fixed_unit
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());
    let mut report = ImportReport::default();

    for row in rows {
        if row.kana.is_empty() && row.kanji.is_empty() && row.meaning.is_empty() {
            continue;
        }
        let term = if row.kana.is_empty() { &row.kanji } else { &row.kana };
        if term.is_empty() {
            tracing::debug!(meaning = %row.meaning, "skipping row without kana or kanji");
            report.skipped += 1;
            continue;
        }

        let unit = match fixed_unit {
            Some(unit) => unit,
            None if row.unit.is_empty() => DEFAULT_UNIT,
            None => row.unit.as_str(),
        };
        let card = NewCard::new(unit, term.as_str(), row.meaning.as_str())
            .with_kanji(row.kanji.as_str())
            .with_romaji(row.romaji.as_str());

        if let Some(existing) = repo.find_duplicate(unit, &row.kana, &row.kanji)? {
            report.duplicates += 1;
            match options.policy {
                DuplicatePolicy::Skip => continue,
                DuplicatePolicy::Overwrite => {
                    repo.update_card(existing, &card)?;
                    report.imported += 1;
                    report.updated += 1;
                    continue;
                }
                DuplicatePolicy::KeepBoth => {}
            }
        }

        repo.add_card(&card)?;
        report.imported += 1;
        report.created += 1;
    }
    Ok(report)
}

pub fn import_cards_from_path(
    repo: &SqliteRepository,
    path: impl AsRef<Path>,
    options: &ImportOptions,
) -> Result<ImportReport, CsvError> {
    import_cards(repo, File::open(path)?, options)
}
