//! Dictionary lookup and romaji preview.

use crate::state::AppState;
use review_core::kana::{has_kana, is_plain_alphabetic};
use review_core::{kana_to_romaji, romaji_to_kana_relaxed, DictionaryEntry};
use std::io::Write;

fn write_entry<W: Write>(out: &mut W, entry: &DictionaryEntry) -> std::io::Result<()> {
    if entry.kana.is_empty() {
        writeln!(out, "{}: {}", entry.term, entry.meaning)
    } else {
        writeln!(out, "{} [{}]: {}", entry.term, entry.kana, entry.meaning)
    }
}

pub fn lookup<W: Write>(
    state: &AppState,
    query: &str,
    by_meaning: bool,
    limit: usize,
    out: &mut W,
) -> anyhow::Result<Vec<DictionaryEntry>> {
    let dictionary = state.load_dictionary()?;
    if dictionary.is_empty() {
        writeln!(out, "Dictionary is empty or missing.")?;
        return Ok(Vec::new());
    }

    let entries = if by_meaning {
        dictionary.search_by_meaning(query, limit)
    } else {
        dictionary.get_full(query).cloned().into_iter().collect()
    };
    if entries.is_empty() {
        writeln!(out, "No match for {query}.")?;
    }
    for entry in &entries {
        write_entry(out, entry)?;
    }
    Ok(entries)
}

/// Preview a conversion: kana input becomes romaji, romaji input becomes
/// hiragana and katakana.
pub fn convert(text: &str) -> String {
    let text = text.trim();
    if has_kana(text) {
        return kana_to_romaji(text);
    }
    if !is_plain_alphabetic(text) {
        return text.to_string();
    }
    let pair = romaji_to_kana_relaxed(text);
    if pair.is_empty() {
        String::new()
    } else {
        format!("{} / {}", pair.hiragana, pair.katakana)
    }
}

pub fn romaji<W: Write>(text: &str, out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "{}", convert(text))?;
    Ok(())
}
