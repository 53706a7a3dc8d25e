//! Core types for the review engine.

use crate::kana::{contains_kanji, has_kana, is_plain_alphabetic, kana_to_romaji};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable card identifier assigned by the card store.
pub type CardId = i64;

/// Quiz direction for a queued card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Japanese forms shown, meaning withheld.
    Recognition,
    /// Meaning shown, Japanese form typed.
    Recall,
}

impl Direction {
    /// Numeric mode as stored in review events (0 = recognition, 1 = recall).
    pub fn to_mode(self) -> u8 {
        match self {
            Self::Recognition => 0,
            Self::Recall => 1,
        }
    }

    /// Create from stored numeric mode.
    pub fn from_mode(mode: u8) -> Option<Self> {
        match mode {
            0 => Some(Self::Recognition),
            1 => Some(Self::Recall),
            _ => None,
        }
    }
}

/// Judgment quality for a review.
///
/// Only the scores 1, 3, 4 and 5 are ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Again,
    Hard,
    Good,
    Easy,
}

impl Quality {
    /// Scores below this restart the schedule.
    pub const PASS_THRESHOLD: u8 = 3;

    /// Convert to the SM-2 numeric score.
    pub fn to_value(self) -> u8 {
        match self {
            Self::Again => 1,
            Self::Hard => 3,
            Self::Good => 4,
            Self::Easy => 5,
        }
    }

    /// Create from an SM-2 numeric score.
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            3 => Some(Self::Hard),
            4 => Some(Self::Good),
            5 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Map a typed-answer verdict to a quality.
    /// Correct -> Good, wrong -> Again
    pub fn from_recall(correct: bool) -> Self {
        if correct {
            Self::Good
        } else {
            Self::Again
        }
    }

    /// Whether the score keeps the repetition streak alive.
    pub fn is_pass(self) -> bool {
        self.to_value() >= Self::PASS_THRESHOLD
    }

    /// Whether the score counts toward the session's correct total.
    pub fn counts_as_correct(self) -> bool {
        self.to_value() >= 4
    }
}

/// Memory strength of a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    pub interval: u32,
    pub repetition: u32,
    pub easiness: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// Recorded for reporting; never used to filter cards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_at: Option<DateTime<Utc>>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            interval: 0,
            repetition: 0,
            easiness: 2.5,
            last_reviewed_at: None,
            due_at: None,
        }
    }
}

/// A vocabulary card with its written forms and memory state.
///
/// Stores are not consistent about which field carries the kana reading:
/// `romaji` sometimes holds kana. The accessors below pick whichever field
/// actually contains the expected script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub unit: String,
    /// Primary term, normally kana.
    pub kana: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kanji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub romaji: Option<String>,
    pub meaning: String,
    pub memory: MemoryState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Card {
    /// Create a card with default memory state.
    pub fn new(id: CardId, kana: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            id,
            unit: String::new(),
            kana: kana.into(),
            kanji: None,
            romaji: None,
            meaning: meaning.into(),
            memory: MemoryState::default(),
            created_at: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_kanji(mut self, kanji: impl Into<String>) -> Self {
        self.kanji = Some(kanji.into());
        self
    }

    pub fn with_romaji(mut self, romaji: impl Into<String>) -> Self {
        self.romaji = Some(romaji.into());
        self
    }

    pub fn with_memory(mut self, memory: MemoryState) -> Self {
        self.memory = memory;
        self
    }

    /// Canonical kana reading, or empty if no field holds kana.
    pub fn reading_kana(&self) -> &str {
        let romaji = self.romaji.as_deref().unwrap_or("").trim();
        if has_kana(romaji) {
            return romaji;
        }
        let term = self.kana.trim();
        if has_kana(term) {
            term
        } else {
            ""
        }
    }

    /// Kanji spelling, or empty.
    pub fn kanji_form(&self) -> &str {
        self.kanji.as_deref().unwrap_or("").trim()
    }

    /// Romanized reading: the stored romaji when it is plain ASCII,
    /// otherwise derived from the kana reading.
    pub fn reading_romaji(&self) -> String {
        let romaji = self.romaji.as_deref().unwrap_or("").trim();
        if is_plain_alphabetic(romaji) {
            return romaji.to_string();
        }
        kana_to_romaji(self.reading_kana())
    }

    /// Term shown when a card has neither kana nor kanji.
    pub fn fallback_term(&self) -> &str {
        self.kana.trim()
    }

    /// Every written form a typed recall answer may match exactly.
    pub fn answer_forms(&self) -> Vec<&str> {
        let mut forms: Vec<&str> = Vec::with_capacity(3);
        let term = self.kana.trim();
        let candidates = [
            self.reading_kana(),
            self.kanji_form(),
            if has_kana(term) || contains_kanji(term) {
                term
            } else {
                ""
            },
        ];
        for form in candidates {
            if !form.is_empty() && !forms.contains(&form) {
                forms.push(form);
            }
        }
        forms
    }
}

/// Immutable record of one judgment, used for reporting only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub card_id: CardId,
    pub session_id: Uuid,
    pub reviewed_at: DateTime<Utc>,
    pub direction: Direction,
    pub quality: Quality,
    pub was_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typed_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    pub before: MemoryState,
    pub after: MemoryState,
}

/// Which cards a session pulls from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewScope {
    All,
    Unit(String),
    Units(Vec<String>),
}

impl Default for ReviewScope {
    fn default() -> Self {
        Self::All
    }
}

impl ReviewScope {
    /// Trim unit names, drop blanks and duplicates, and fall back to `All`
    /// when nothing remains.
    pub fn normalized(&self) -> Self {
        match self {
            Self::All => Self::All,
            Self::Unit(unit) => {
                let unit = unit.trim();
                if unit.is_empty() {
                    Self::All
                } else {
                    Self::Unit(unit.to_string())
                }
            }
            Self::Units(units) => {
                let mut seen: Vec<String> = Vec::new();
                for unit in units {
                    let unit = unit.trim();
                    if !unit.is_empty() && !seen.iter().any(|u| u == unit) {
                        seen.push(unit.to_string());
                    }
                }
                match seen.len() {
                    0 => Self::All,
                    _ => Self::Units(seen),
                }
            }
        }
    }
}
