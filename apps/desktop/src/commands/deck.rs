//! Card and unit management commands.

use crate::db::date_utils::format_local_date;
use crate::db::{CardRepository, SettingsRepository};
use crate::dictionary::LocalDictionary;
use crate::models::{NewCard, DEFAULT_UNIT};
use crate::state::AppState;
use anyhow::bail;
use review_core::kana::{contains_kanji, is_kana_only};
use review_core::{kana_to_romaji, CardId};
use std::io::Write;

/// Fields for `add`. Missing meaning and romaji are filled in when possible.
#[derive(Debug, Clone, Default)]
pub struct AddCard {
    pub term: String,
    pub meaning: Option<String>,
    pub unit: Option<String>,
    pub kanji: Option<String>,
    pub romaji: Option<String>,
}

/// Complete a card from the dictionary and the transliteration tables.
///
/// A dictionary hit moves a kanji headword into the kanji field and makes
/// its kana reading the term, so `学校` is stored as `がっこう` / `学校`.
pub fn autofill(request: &AddCard, dictionary: &LocalDictionary) -> NewCard {
    let typed = request.term.trim();
    let given = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let entry = dictionary.get_full(typed);

    let kanji = given(&request.kanji)
        .or_else(|| {
            entry
                .filter(|e| contains_kanji(&e.term))
                .map(|e| e.term.clone())
        })
        .unwrap_or_default();
    let reading = entry
        .map(|e| e.kana.trim())
        .filter(|kana| is_kana_only(kana))
        .or_else(|| is_kana_only(typed).then_some(typed));
    let term = reading.unwrap_or(typed);

    let meaning = given(&request.meaning)
        .or_else(|| {
            (!kanji.is_empty())
                .then(|| dictionary.get(&kanji))
                .flatten()
                .or_else(|| entry.map(|e| e.meaning.as_str()))
                .map(str::to_string)
        })
        .unwrap_or_default();
    let romaji = given(&request.romaji)
        .or_else(|| reading.map(kana_to_romaji))
        .unwrap_or_default();
    let unit = given(&request.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string());

    NewCard::new(unit, term, meaning)
        .with_kanji(kanji)
        .with_romaji(romaji)
}

pub fn add_card<W: Write>(state: &AppState, request: &AddCard, out: &mut W) -> anyhow::Result<CardId> {
    if request.term.trim().is_empty() {
        bail!("term must not be empty");
    }
    let dictionary = state.load_dictionary()?;
    let card = autofill(request, &dictionary);

    let repo = &state.repository;
    if let Some(existing) = repo.find_duplicate(&card.unit, &card.term, &card.kanji)? {
        writeln!(out, "Note: card {existing} in {} has the same form.", card.unit)?;
    }
    let id = repo.add_card(&card)?;
    tracing::info!(card_id = id, unit = %card.unit, "card added");
    writeln!(
        out,
        "Added card {id}: {} {} ({}) {}",
        card.term, card.kanji, card.romaji, card.meaning
    )?;
    Ok(id)
}

pub fn delete_card<W: Write>(state: &AppState, id: CardId, out: &mut W) -> anyhow::Result<()> {
    state.repository.delete_card(id)?;
    writeln!(out, "Deleted card {id}.")?;
    Ok(())
}

pub fn list_cards<W: Write>(state: &AppState, units: &[String], out: &mut W) -> anyhow::Result<()> {
    let cards = state
        .repository
        .list_cards(&super::study::scope_for(units))?;
    for card in &cards {
        let due = card
            .memory
            .due_at
            .as_ref()
            .map(format_local_date)
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:>5}  {}  {}  {}  {}  {}  due {}",
            card.id,
            card.unit,
            card.kana,
            card.kanji_form(),
            card.reading_romaji(),
            card.meaning,
            due
        )?;
    }
    writeln!(out, "{} cards", cards.len())?;
    Ok(())
}

/// Print units in the saved order with their card counts.
pub fn list_units<W: Write>(state: &AppState, out: &mut W) -> anyhow::Result<()> {
    let repo = &state.repository;
    let settings = repo.get_settings()?;
    for unit in settings.order_units(repo.list_units()?) {
        writeln!(out, "{unit}\t{}", repo.count_cards_in_unit(&unit)?)?;
    }
    Ok(())
}

pub fn delete_unit<W: Write>(state: &AppState, unit: &str, out: &mut W) -> anyhow::Result<usize> {
    let repo = &state.repository;
    let deleted = repo.delete_unit(unit)?;

    let mut settings = repo.get_settings()?;
    let before = settings.unit_order.len();
    settings.unit_order.retain(|u| u != unit.trim());
    if settings.unit_order.len() != before {
        repo.save_settings(&settings)?;
    }

    tracing::info!(unit, deleted, "unit deleted");
    writeln!(out, "Deleted {deleted} cards from {unit}.")?;
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dictionary() -> LocalDictionary {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader("猫,ねこ,猫；猫咪\n学校,がっこう,学校\n".as_bytes());
        LocalDictionary::from_reader(reader).unwrap()
    }

    #[test]
    fn autofill_from_kana() {
        let request = AddCard {
            term: "がっこう".into(),
            ..AddCard::default()
        };
        let card = autofill(&request, &dictionary());
        assert_eq!(card, NewCard::new(DEFAULT_UNIT, "がっこう", "学校").with_kanji("学校").with_romaji("gakkou"));
    }

    #[test]
    fn autofill_from_kanji_keeps_the_reading() {
        let request = AddCard {
            term: "学校".into(),
            ..AddCard::default()
        };
        let card = autofill(&request, &dictionary());
        assert_eq!(card, NewCard::new(DEFAULT_UNIT, "がっこう", "学校").with_kanji("学校").with_romaji("gakkou"));
    }

    #[test]
    fn kanji_without_dictionary_entry_stays_as_typed() {
        let request = AddCard {
            term: "鳥".into(),
            ..AddCard::default()
        };
        let card = autofill(&request, &dictionary());
        assert_eq!(card, NewCard::new(DEFAULT_UNIT, "鳥", ""));
    }

    #[test]
    fn given_fields_win() {
        let request = AddCard {
            term: "ねこ".into(),
            meaning: Some("cat".into()),
            unit: Some("动物".into()),
            kanji: Some("猫".into()),
            romaji: Some("neko!".into()),
        };
        let card = autofill(&request, &dictionary());
        assert_eq!(card, NewCard::new("动物", "ねこ", "cat").with_kanji("猫").with_romaji("neko!"));
    }

    #[test]
    fn unknown_word_keeps_blanks() {
        let request = AddCard {
            term: "とり".into(),
            ..AddCard::default()
        };
        let card = autofill(&request, &LocalDictionary::default());
        assert_eq!(card.meaning, "");
        assert_eq!(card.kanji, "");
        assert_eq!(card.romaji, "tori");
    }
}
