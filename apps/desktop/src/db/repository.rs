//! Repository pattern for database access.

use crate::db::date_utils::{format_timestamp, local_today, parse_timestamp};
use crate::db::error::DbError;
use crate::models::{AppSettings, NewCard, Overview, StudyStats};
use review_core::{Card, CardId, CardStore, MemoryState, ReviewEvent, ReviewScope, StoreError};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;

type Result<T> = std::result::Result<T, DbError>;

const CARD_COLUMNS: &str =
    "id, unit, term, jp_kanji, jp_kana, meaning, created_at, last_review, interval, repetition, ef, due_date";

/// Repository for card operations.
pub trait CardRepository {
    fn get_card(&self, id: CardId) -> Result<Option<Card>>;
    fn list_cards(&self, scope: &ReviewScope) -> Result<Vec<Card>>;
    fn add_card(&self, card: &NewCard) -> Result<CardId>;
    fn update_card(&self, id: CardId, card: &NewCard) -> Result<()>;
    fn delete_card(&self, id: CardId) -> Result<()>;
    fn list_units(&self) -> Result<Vec<String>>;
    fn count_cards_in_unit(&self, unit: &str) -> Result<usize>;
    fn delete_unit(&self, unit: &str) -> Result<usize>;
    /// A card in `unit` whose term equals `kana` or whose kanji equals
    /// `kanji`. Blank arguments never match.
    fn find_duplicate(&self, unit: &str, kana: &str, kanji: &str) -> Result<Option<CardId>>;
}

/// Repository for memory state and the review log.
pub trait StateRepository {
    fn save_card_state(&self, card_id: CardId, state: &MemoryState) -> Result<()>;
    fn insert_review(&self, event: &ReviewEvent) -> Result<i64>;
    fn count_reviews(&self, card_id: Option<CardId>) -> Result<usize>;
}

/// Repository for settings operations.
pub trait SettingsRepository {
    fn get_settings(&self) -> Result<AppSettings>;
    fn save_settings(&self, settings: &AppSettings) -> Result<()>;
}

/// Repository for statistics operations.
pub trait StatsRepository {
    fn get_overview(&self, scope: &ReviewScope) -> Result<Overview>;
    fn get_study_stats(&self) -> Result<StudyStats>;
}

/// SQLite implementation of repositories.
#[derive(Debug)]
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Close the connection, e.g. before the file is replaced.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e.into())
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(super::schema::SCHEMA)?;
        self.conn.execute_batch(super::schema::INIT_SETTINGS)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![super::schema::SCHEMA_VERSION.to_string()],
        )?;
        Ok(())
    }

    /// Schema version recorded in the database.
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        value
            .map(|v| {
                v.parse()
                    .map_err(|_| DbError::InvalidData(format!("schema_version: {v}")))
            })
            .transpose()
    }

    /// Run `f` in one transaction. Any error from `f` rolls back every
    /// write it made.
    pub fn in_transaction<T, E>(&self, f: impl FnOnce(&Self) -> std::result::Result<T, E>) -> std::result::Result<T, E>
    where
        E: From<DbError>,
    {
        let tx = self.conn.unchecked_transaction().map_err(DbError::from)?;
        let value = f(self)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }

    fn row_to_card(row: &rusqlite::Row) -> rusqlite::Result<Card> {
        let timestamp = |idx: usize| -> rusqlite::Result<_> {
            Ok(row
                .get::<_, Option<String>>(idx)?
                .as_deref()
                .and_then(parse_timestamp))
        };

        Ok(Card {
            id: row.get(0)?,
            unit: row.get(1)?,
            kana: row.get(2)?,
            kanji: row.get(3)?,
            romaji: row.get(4)?,
            meaning: row.get(5)?,
            created_at: timestamp(6)?,
            memory: MemoryState {
                last_reviewed_at: timestamp(7)?,
                interval: row.get(8)?,
                repetition: row.get(9)?,
                easiness: row.get(10)?,
                due_at: timestamp(11)?,
            },
        })
    }

    fn query_cards(&self, sql: &str, args: &[&str]) -> Result<Vec<Card>> {
        let mut stmt = self.conn.prepare(sql)?;
        let cards = stmt
            .query_map(params_from_iter(args.iter()), Self::row_to_card)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(cards)
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

impl CardRepository for SqliteRepository {
    fn get_card(&self, id: CardId) -> Result<Option<Card>> {
        self.conn
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"),
                params![id],
                Self::row_to_card,
            )
            .optional()
            .map_err(Into::into)
    }

    fn list_cards(&self, scope: &ReviewScope) -> Result<Vec<Card>> {
        match scope.normalized() {
            ReviewScope::All => self.query_cards(
                &format!("SELECT {CARD_COLUMNS} FROM cards ORDER BY unit, id"),
                &[],
            ),
            ReviewScope::Unit(unit) => self.query_cards(
                &format!("SELECT {CARD_COLUMNS} FROM cards WHERE unit = ?1 ORDER BY id"),
                &[unit.as_str()],
            ),
            ReviewScope::Units(units) => {
                let placeholders = vec!["?"; units.len()].join(", ");
                let args: Vec<&str> = units.iter().map(String::as_str).collect();
                self.query_cards(
                    &format!(
                        "SELECT {CARD_COLUMNS} FROM cards WHERE unit IN ({placeholders}) ORDER BY unit, id"
                    ),
                    &args,
                )
            }
        }
    }

    fn add_card(&self, card: &NewCard) -> Result<CardId> {
        let term = card.term.trim();
        if term.is_empty() {
            return Err(DbError::InvalidData("card term is empty".into()));
        }
        let unit = non_empty(&card.unit).unwrap_or(crate::models::DEFAULT_UNIT);
        self.conn.execute(
            "INSERT INTO cards (language, unit, term, meaning, created_at, jp_kanji, jp_kana) VALUES ('ja', ?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                unit,
                term,
                card.meaning.trim(),
                format_timestamp(&chrono::Utc::now()),
                non_empty(&card.kanji),
                non_empty(&card.romaji),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_card(&self, id: CardId, card: &NewCard) -> Result<()> {
        let term = card.term.trim();
        if term.is_empty() {
            return Err(DbError::InvalidData("card term is empty".into()));
        }
        let unit = non_empty(&card.unit).unwrap_or(crate::models::DEFAULT_UNIT);
        let changed = self.conn.execute(
            "UPDATE cards SET unit = ?1, term = ?2, meaning = ?3, jp_kanji = ?4, jp_kana = ?5 WHERE id = ?6",
            params![
                unit,
                term,
                card.meaning.trim(),
                non_empty(&card.kanji),
                non_empty(&card.romaji),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(DbError::CardNotFound(id));
        }
        Ok(())
    }

    fn delete_card(&self, id: CardId) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM cards WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DbError::CardNotFound(id));
        }
        Ok(())
    }

    fn list_units(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT unit FROM cards ORDER BY unit")?;
        let units = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(units)
    }

    fn count_cards_in_unit(&self, unit: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM cards WHERE unit = ?1",
            params![unit.trim()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn delete_unit(&self, unit: &str) -> Result<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM cards WHERE unit = ?1", params![unit.trim()])?;
        Ok(deleted)
    }

    fn find_duplicate(&self, unit: &str, kana: &str, kanji: &str) -> Result<Option<CardId>> {
        let (kana, kanji) = (kana.trim(), kanji.trim());
        if kana.is_empty() && kanji.is_empty() {
            return Ok(None);
        }
        self.conn
            .query_row(
                "SELECT id FROM cards
                 WHERE unit = ?1 AND ((?2 <> '' AND term = ?2) OR (?3 <> '' AND jp_kanji = ?3))
                 ORDER BY id LIMIT 1",
                params![unit.trim(), kana, kanji],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }
}

impl StateRepository for SqliteRepository {
    fn save_card_state(&self, card_id: CardId, state: &MemoryState) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE cards SET interval = ?1, repetition = ?2, ef = ?3, last_review = ?4, due_date = ?5 WHERE id = ?6",
            params![
                state.interval,
                state.repetition,
                state.easiness,
                state.last_reviewed_at.as_ref().map(format_timestamp),
                state.due_at.as_ref().map(format_timestamp),
                card_id,
            ],
        )?;
        if changed == 0 {
            return Err(DbError::CardNotFound(card_id));
        }
        Ok(())
    }

    fn insert_review(&self, event: &ReviewEvent) -> Result<i64> {
        let (before, after) = (&event.before, &event.after);
        self.conn.execute(
            "INSERT INTO reviews (
                card_id, session_id, ts, mode, quality, was_correct, typed_answer, elapsed_ms,
                rep_before, rep_after, ef_before, ef_after, int_before, int_after, due_before, due_after
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                event.card_id,
                event.session_id.to_string(),
                format_timestamp(&event.reviewed_at),
                event.direction.to_mode(),
                event.quality.to_value(),
                event.was_correct,
                event.typed_answer,
                event.elapsed_ms.map(|ms| ms as i64),
                before.repetition,
                after.repetition,
                before.easiness,
                after.easiness,
                before.interval,
                after.interval,
                before.due_at.as_ref().map(format_timestamp),
                after.due_at.as_ref().map(format_timestamp),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn count_reviews(&self, card_id: Option<CardId>) -> Result<usize> {
        let count: i64 = match card_id {
            Some(id) => self.conn.query_row(
                "SELECT COUNT(*) FROM reviews WHERE card_id = ?1",
                params![id],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM reviews", [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }
}

impl SettingsRepository for SqliteRepository {
    fn get_settings(&self) -> Result<AppSettings> {
        let (recognition_ratio, session_limit, shuffle_cards, dictionary_path, unit_order) =
            self.conn.query_row(
                "SELECT recognition_ratio, session_limit, shuffle_cards, dictionary_path, unit_order FROM settings WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, bool>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )?;

        Ok(AppSettings {
            recognition_ratio,
            session_limit,
            shuffle_cards,
            dictionary_path,
            unit_order: serde_json::from_str(&unit_order)?,
        }
        .normalized())
    }

    fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let settings = settings.clone().normalized();
        self.conn.execute(
            "UPDATE settings SET recognition_ratio = ?1, session_limit = ?2, shuffle_cards = ?3, dictionary_path = ?4, unit_order = ?5 WHERE id = 1",
            params![
                settings.recognition_ratio,
                settings.session_limit,
                settings.shuffle_cards,
                settings.dictionary_path,
                serde_json::to_string(&settings.unit_order)?,
            ],
        )?;
        Ok(())
    }
}

impl StatsRepository for SqliteRepository {
    fn get_overview(&self, scope: &ReviewScope) -> Result<Overview> {
        let cards = self.list_cards(scope)?;
        Ok(Overview::from_cards(&cards))
    }

    fn get_study_stats(&self) -> Result<StudyStats> {
        let count_on = |date: &str| -> Result<usize> {
            let count: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM reviews WHERE date(ts, 'localtime') = ?1",
                params![date],
                |row| row.get(0),
            )?;
            Ok(count as usize)
        };

        let today = local_today();
        let reviews_today = count_on(&today.format("%Y-%m-%d").to_string())?;
        let total_reviews = self.count_reviews(None)?;

        // Consecutive days with reviews, ending today or yesterday.
        let mut streak_days = 0usize;
        let mut current = today;
        loop {
            if count_on(&current.format("%Y-%m-%d").to_string())? > 0 {
                streak_days += 1;
            } else if !(streak_days == 0 && current == today) {
                break;
            }
            match current.pred_opt() {
                Some(prev) => current = prev,
                None => break,
            }
            if streak_days > 365 {
                break;
            }
        }

        let correct_rate: f64 = self.conn.query_row(
            "SELECT COALESCE(
                CAST(SUM(CASE WHEN quality >= 4 THEN 1 ELSE 0 END) AS REAL) / NULLIF(COUNT(*), 0),
                0.0
            ) FROM reviews",
            [],
            |row| row.get(0),
        )?;

        Ok(StudyStats {
            reviews_today,
            total_reviews,
            streak_days,
            correct_rate,
        })
    }
}

impl CardStore for SqliteRepository {
    fn fetch_cards(&self, scope: &ReviewScope) -> std::result::Result<Vec<Card>, StoreError> {
        self.list_cards(scope).map_err(Into::into)
    }

    fn save_card_state(&self, id: CardId, state: &MemoryState) -> std::result::Result<(), StoreError> {
        StateRepository::save_card_state(self, id, state).map_err(Into::into)
    }

    fn append_review_event(&self, event: &ReviewEvent) -> std::result::Result<(), StoreError> {
        self.insert_review(event).map(|_| ()).map_err(Into::into)
    }
}
