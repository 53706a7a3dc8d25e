//! Answer matching for recall-mode reviews.
//!
//! A typed answer is accepted when, after trimming, it equals one of the
//! card's written forms exactly. There is no case or script folding, so
//! katakana does not match a hiragana reading. Kanji input gets one more
//! chance through the dictionary: an alternate spelling whose reading is
//! the card's reading is accepted.

use crate::kana::contains_kanji;
use crate::store::Dictionary;
use crate::types::Card;
use serde::{Deserialize, Serialize};

/// Which form a correct answer matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedForm {
    Kana,
    Kanji,
    Term,
    DictionaryAlternate,
}

/// Result of comparing a typed answer to a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// The form that matched, if any.
    pub matched: Option<MatchedForm>,
    /// Trimmed typed answer (for display).
    pub typed_normalized: String,
    /// Every form that would have been accepted exactly.
    pub accepted_forms: Vec<String>,
}

/// Check a typed recall answer against a card.
pub fn check_answer(card: &Card, typed: &str, dictionary: Option<&dyn Dictionary>) -> MatchResult {
    let typed_normalized = typed.trim().to_string();
    let accepted_forms: Vec<String> = card.answer_forms().into_iter().map(String::from).collect();

    let matched = if typed_normalized.is_empty() {
        None
    } else {
        exact_match(card, &typed_normalized)
            .or_else(|| dictionary_match(card, &typed_normalized, dictionary))
    };

    MatchResult {
        is_correct: matched.is_some(),
        matched,
        typed_normalized,
        accepted_forms,
    }
}

fn exact_match(card: &Card, typed: &str) -> Option<MatchedForm> {
    if typed == card.reading_kana() {
        return Some(MatchedForm::Kana);
    }
    if typed == card.kanji_form() {
        return Some(MatchedForm::Kanji);
    }
    card.answer_forms()
        .contains(&typed)
        .then_some(MatchedForm::Term)
}

fn dictionary_match(card: &Card, typed: &str, dictionary: Option<&dyn Dictionary>) -> Option<MatchedForm> {
    let reading = card.reading_kana();
    if reading.is_empty() || !contains_kanji(typed) {
        return None;
    }
    let entry = dictionary?.lookup_by_written_form(typed)?;
    (entry.kana.trim() == reading).then_some(MatchedForm::DictionaryAlternate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DictionaryEntry;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn cat() -> Card {
        Card::new(1, "ねこ", "cat").with_kanji("猫")
    }

    fn dictionary() -> HashMap<String, DictionaryEntry> {
        let mut dict = HashMap::new();
        for (term, kana) in [("貓", "ねこ"), ("犬", "いぬ")] {
            dict.insert(
                term.to_string(),
                DictionaryEntry {
                    term: term.into(),
                    kana: kana.into(),
                    meaning: String::new(),
                },
            );
        }
        dict
    }

    #[test]
    fn accepts_kana_and_kanji() {
        let card = cat();
        assert_eq!(check_answer(&card, "ねこ", None).matched, Some(MatchedForm::Kana));
        assert_eq!(check_answer(&card, " 猫\n", None).matched, Some(MatchedForm::Kanji));
    }

    #[test]
    fn rejects_katakana_and_romaji() {
        let card = cat();
        assert!(!check_answer(&card, "ネコ", None).is_correct);
        assert!(!check_answer(&card, "neko", None).is_correct);
    }

    #[test]
    fn empty_answer_is_wrong() {
        let result = check_answer(&cat(), "   ", None);
        assert!(!result.is_correct);
        assert_eq!(result.typed_normalized, "");
        assert_eq!(result.accepted_forms, vec!["ねこ".to_string(), "猫".to_string()]);
    }

    #[test]
    fn kanji_term_field_is_accepted() {
        let card = Card::new(1, "学校", "school").with_romaji("がっこう");
        assert_eq!(check_answer(&card, "学校", None).matched, Some(MatchedForm::Term));
        assert_eq!(check_answer(&card, "がっこう", None).matched, Some(MatchedForm::Kana));
    }

    #[test]
    fn dictionary_accepts_alternate_kanji() {
        let dict = dictionary();
        let result = check_answer(&cat(), "貓", Some(&dict as &dyn Dictionary));
        assert!(result.is_correct);
        assert_eq!(result.matched, Some(MatchedForm::DictionaryAlternate));
    }

    #[test]
    fn dictionary_rejects_other_reading() {
        let dict = dictionary();
        assert!(!check_answer(&cat(), "犬", Some(&dict as &dyn Dictionary)).is_correct);
        assert!(!check_answer(&cat(), "貓", None).is_correct);
    }

    #[test]
    fn dictionary_not_consulted_for_kana() {
        let mut dict = dictionary();
        dict.insert(
            "ネコ".into(),
            DictionaryEntry {
                term: "ネコ".into(),
                kana: "ねこ".into(),
                meaning: String::new(),
            },
        );
        assert!(!check_answer(&cat(), "ネコ", Some(&dict as &dyn Dictionary)).is_correct);
    }
}
