//! SQLite schema definitions.

/// Current schema version, recorded in `meta`.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the vocabulary database.
pub const SCHEMA: &str = r#"
-- Vocabulary cards with their SM-2 memory state
CREATE TABLE IF NOT EXISTS cards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    language TEXT NOT NULL DEFAULT 'ja',
    unit TEXT NOT NULL DEFAULT '未分组',
    term TEXT NOT NULL,
    meaning TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    last_review TEXT,
    interval INTEGER NOT NULL DEFAULT 0,
    repetition INTEGER NOT NULL DEFAULT 0,
    ef REAL NOT NULL DEFAULT 2.5,
    due_date TEXT,
    jp_kanji TEXT,
    jp_kana TEXT,
    jp_ruby TEXT
);

-- Append-only review log (mode 0 = recognition, 1 = recall)
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    card_id INTEGER NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
    session_id TEXT NOT NULL,
    ts TEXT NOT NULL,
    mode INTEGER NOT NULL,
    quality INTEGER NOT NULL,
    was_correct INTEGER NOT NULL,
    typed_answer TEXT,
    elapsed_ms INTEGER,
    rep_before INTEGER,
    rep_after INTEGER,
    ef_before REAL,
    ef_after REAL,
    int_before INTEGER,
    int_after INTEGER,
    due_before TEXT,
    due_after TEXT
);

-- User settings
CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    recognition_ratio REAL NOT NULL DEFAULT 1.0,
    session_limit INTEGER NOT NULL DEFAULT 0,
    shuffle_cards INTEGER NOT NULL DEFAULT 0,
    dictionary_path TEXT,
    unit_order TEXT NOT NULL DEFAULT '[]'
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_cards_unit ON cards(unit);
CREATE INDEX IF NOT EXISTS idx_cards_last_review ON cards(last_review);
CREATE INDEX IF NOT EXISTS idx_cards_due_date ON cards(due_date);
CREATE INDEX IF NOT EXISTS idx_cards_term ON cards(term);
CREATE INDEX IF NOT EXISTS idx_cards_kana ON cards(jp_kana);
CREATE INDEX IF NOT EXISTS idx_cards_kanji ON cards(jp_kanji);
CREATE INDEX IF NOT EXISTS idx_reviews_card_ts ON reviews(card_id, ts);
CREATE INDEX IF NOT EXISTS idx_reviews_ts ON reviews(ts);
"#;

/// Initialize settings if not exists.
pub const INIT_SETTINGS: &str = r#"
INSERT OR IGNORE INTO settings (id) VALUES (1);
"#;
