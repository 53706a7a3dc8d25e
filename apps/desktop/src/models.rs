//! Data models shared by the repository and the commands.

use chrono::NaiveDate;
use review_core::{Card, SessionConfig};
use serde::{Deserialize, Serialize};

/// Unit assigned to cards that arrive without one.
pub const DEFAULT_UNIT: &str = "未分组";

/// User settings, stored in the single-row `settings` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Share of each session quizzed in the recognition direction.
    pub recognition_ratio: f64,
    /// Cards per session; 0 means no limit.
    pub session_limit: u32,
    pub shuffle_cards: bool,
    /// Overrides the dictionary CSV location from the environment.
    pub dictionary_path: Option<String>,
    /// Preferred display order for units.
    pub unit_order: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            recognition_ratio: 1.0,
            session_limit: 0,
            shuffle_cards: false,
            dictionary_path: None,
            unit_order: Vec::new(),
        }
    }
}

impl AppSettings {
    /// Clamp the ratio to 0.0..=1.0. Non-finite values reset to the default.
    pub fn normalized(mut self) -> Self {
        self.recognition_ratio = if self.recognition_ratio.is_finite() {
            self.recognition_ratio.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.dictionary_path = self
            .dictionary_path
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            recognition_ratio: self.recognition_ratio,
            limit: (self.session_limit > 0).then_some(self.session_limit as usize),
            shuffle_cards: self.shuffle_cards,
        }
    }

    /// Sort unit names by `unit_order`, unlisted units last in their
    /// original order.
    pub fn order_units(&self, mut units: Vec<String>) -> Vec<String> {
        units.sort_by_key(|unit| {
            self.unit_order
                .iter()
                .position(|u| u == unit)
                .unwrap_or(usize::MAX)
        });
        units
    }
}

/// Written forms for a card being created or edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCard {
    pub unit: String,
    /// Primary term, normally kana.
    pub term: String,
    pub kanji: String,
    /// Romaji, or a second kana field in older data.
    pub romaji: String,
    pub meaning: String,
}

impl NewCard {
    pub fn new(unit: impl Into<String>, term: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            term: term.into(),
            meaning: meaning.into(),
            ..Self::default()
        }
    }

    pub fn with_kanji(mut self, kanji: impl Into<String>) -> Self {
        self.kanji = kanji.into();
        self
    }

    pub fn with_romaji(mut self, romaji: impl Into<String>) -> Self {
        self.romaji = romaji.into();
        self
    }
}

/// Summary of a card list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub total: usize,
    pub with_reading: usize,
    pub with_kanji: usize,
    pub with_meaning: usize,
    pub reviewed: usize,
    /// Cards by repetition: 0, 1-2, 3 and above.
    pub repetition_bins: (usize, usize, usize),
    pub last_added: Option<NaiveDate>,
    pub last_reviewed: Option<NaiveDate>,
}

impl Overview {
    pub fn from_cards(cards: &[Card]) -> Self {
        let filled = |s: Option<&str>| s.is_some_and(|s| !s.trim().is_empty());
        let mut overview = Self {
            total: cards.len(),
            ..Self::default()
        };

        for card in cards {
            if filled(card.romaji.as_deref()) {
                overview.with_reading += 1;
            }
            if filled(card.kanji.as_deref()) {
                overview.with_kanji += 1;
            }
            if filled(Some(&card.meaning)) {
                overview.with_meaning += 1;
            }
            if card.memory.last_reviewed_at.is_some() {
                overview.reviewed += 1;
            }
            match card.memory.repetition {
                0 => overview.repetition_bins.0 += 1,
                1..=2 => overview.repetition_bins.1 += 1,
                _ => overview.repetition_bins.2 += 1,
            }
        }

        overview.last_added = cards
            .iter()
            .filter_map(|c| c.created_at)
            .max()
            .map(|dt| dt.with_timezone(&chrono::Local).date_naive());
        overview.last_reviewed = cards
            .iter()
            .filter_map(|c| c.memory.last_reviewed_at)
            .max()
            .map(|dt| dt.with_timezone(&chrono::Local).date_naive());
        overview
    }
}

/// Review history statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudyStats {
    pub reviews_today: usize,
    pub total_reviews: usize,
    pub streak_days: usize,
    /// Share of reviews scored 4 or 5.
    pub correct_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use review_core::MemoryState;

    #[test]
    fn settings_normalization() {
        let settings = AppSettings {
            recognition_ratio: 1.7,
            dictionary_path: Some("  ".into()),
            ..AppSettings::default()
        }
        .normalized();
        assert_eq!(settings.recognition_ratio, 1.0);
        assert_eq!(settings.dictionary_path, None);

        let nan = AppSettings {
            recognition_ratio: f64::NAN,
            ..AppSettings::default()
        };
        assert_eq!(nan.normalized().recognition_ratio, 1.0);
    }

    #[test]
    fn zero_limit_is_unlimited() {
        let settings = AppSettings::default();
        assert_eq!(settings.session_config().limit, None);
        let limited = AppSettings {
            session_limit: 20,
            ..AppSettings::default()
        };
        assert_eq!(limited.session_config().limit, Some(20));
    }

    #[test]
    fn unit_order_puts_listed_units_first() {
        let settings = AppSettings {
            unit_order: vec!["b".into(), "a".into()],
            ..AppSettings::default()
        };
        let units = vec!["a".to_string(), "c".into(), "b".into(), "d".into()];
        assert_eq!(settings.order_units(units), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn overview_counts() {
        let reviewed = MemoryState {
            repetition: 4,
            last_reviewed_at: Some(chrono::Utc::now()),
            ..MemoryState::default()
        };
        let cards = vec![
            Card::new(1, "ねこ", "cat").with_kanji("猫").with_romaji("neko"),
            Card::new(2, "いぬ", "").with_memory(MemoryState {
                repetition: 2,
                ..MemoryState::default()
            }),
            Card::new(3, "とり", "bird").with_memory(reviewed),
        ];
        let overview = Overview::from_cards(&cards);
        assert_eq!(overview.total, 3);
        assert_eq!(overview.with_reading, 1);
        assert_eq!(overview.with_kanji, 1);
        assert_eq!(overview.with_meaning, 2);
        assert_eq!(overview.reviewed, 1);
        assert_eq!(overview.repetition_bins, (1, 1, 1));
        assert!(overview.last_reviewed.is_some());
        assert_eq!(overview.last_added, None);
    }
}
