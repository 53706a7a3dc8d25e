//! Local Japanese-Chinese dictionary loaded from CSV.
//!
//! Rows are `term,meaning` or `term,kana,meaning`, in any encoding
//! [`crate::encoding`] recognizes. An optional header row
//! starting with `term` or `词条` is skipped. Entries are indexed by term and
//! by kana (when the kana column really is kana), both as written and in a
//! normalized form, so lookups tolerate full-width punctuation and stray
//! whitespace.

use crate::encoding::read_text;
use review_core::kana::{contains_kanji, is_kana_only};
use review_core::{Dictionary, DictionaryEntry};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to open dictionary {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read dictionary {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// In-memory dictionary keyed by written form.
#[derive(Debug, Default, Clone)]
pub struct LocalDictionary {
    path: Option<PathBuf>,
    entries: HashMap<String, DictionaryEntry>,
}

/// Normalize a lookup key.
pub fn normalize_key(s: &str) -> String {
    let replaced: String = s
        .chars()
        .filter_map(|c| match c {
            '\r' | '［' | '］' => None,
            '\n' | '\u{3000}' => Some(' '),
            '～' => Some('~'),
            '（' => Some('('),
            '）' => Some(')'),
            other => Some(other),
        })
        .collect();
    replaced
        .split(' ')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl LocalDictionary {
    /// Load from `path`. A missing file gives an empty dictionary.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "dictionary file not found");
            return Ok(Self {
                path: Some(path.to_path_buf()),
                ..Self::default()
            });
        }

        let text = std::fs::File::open(path)
            .and_then(read_text)
            .map_err(|source| DictionaryError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut dictionary = Self::from_reader(reader).map_err(|source| DictionaryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        dictionary.path = Some(path.to_path_buf());

        tracing::info!(path = %path.display(), keys = dictionary.len(), "dictionary loaded");
        Ok(dictionary)
    }

    /// Parse dictionary rows from any CSV reader.
    pub fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, csv::Error> {
        let mut dictionary = Self::default();
        for (index, record) in reader.records().enumerate() {
            let record = record?;
            let cell = |i: usize| record.get(i).map(str::trim).unwrap_or("");

            let first = cell(0).trim_start_matches('\u{feff}');
            if index == 0 && matches!(first.to_lowercase().as_str(), "term" | "词条") {
                continue;
            }
            let (kana, meaning) = match record.len() {
                0 | 1 => continue,
                2 => ("", cell(1)),
                _ => (cell(1), cell(2)),
            };
            if first.is_empty() || meaning.is_empty() {
                continue;
            }
            dictionary.insert(DictionaryEntry {
                term: first.to_string(),
                kana: kana.to_string(),
                meaning: meaning.to_string(),
            });
        }
        Ok(dictionary)
    }

    fn insert(&mut self, entry: DictionaryEntry) {
        let mut keys = vec![entry.term.clone(), normalize_key(&entry.term)];
        if is_kana_only(&entry.kana) {
            keys.push(entry.kana.clone());
            keys.push(normalize_key(&entry.kana));
        }
        let mut seen = HashSet::new();
        for key in keys {
            if !key.is_empty() && seen.insert(key.clone()) {
                self.entries.insert(key, entry.clone());
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of lookup keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Meaning for a term or kana, or `None`.
    pub fn get(&self, term: &str) -> Option<&str> {
        self.get_full(term).map(|entry| entry.meaning.as_str())
    }

    /// Full entry for a term or kana. Tries the key as written, then
    /// normalized.
    pub fn get_full(&self, key: &str) -> Option<&DictionaryEntry> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        self.entries
            .get(key)
            .or_else(|| self.entries.get(&normalize_key(key)))
    }

    /// Reverse lookup by meaning, best matches first.
    ///
    /// Exact meaning scores 100, prefix 60, substring 40. Entries with kana
    /// get 3 more and terms containing kanji 2 more. Ties go to the longer
    /// kana, then the longer term.
    pub fn search_by_meaning(&self, query: &str, limit: usize) -> Vec<DictionaryEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut candidates: Vec<(u32, &DictionaryEntry)> = Vec::new();
        for entry in self.entries.values() {
            let meaning = entry.meaning.to_lowercase();
            let mut score = if meaning == query {
                100
            } else if meaning.starts_with(&query) {
                60
            } else if meaning.contains(&query) {
                40
            } else {
                continue;
            };
            if !entry.kana.is_empty() {
                score += 3;
            }
            if contains_kanji(&entry.term) {
                score += 2;
            }
            if seen.insert((&entry.term, &entry.kana, &entry.meaning)) {
                candidates.push((score, entry));
            }
        }

        candidates.sort_by(|(sa, a), (sb, b)| {
            sb.cmp(sa)
                .then_with(|| b.kana.chars().count().cmp(&a.kana.chars().count()))
                .then_with(|| b.term.chars().count().cmp(&a.term.chars().count()))
                .then_with(|| a.term.cmp(&b.term))
        });
        candidates
            .into_iter()
            .take(limit)
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

impl Dictionary for LocalDictionary {
    fn lookup_by_written_form(&self, text: &str) -> Option<DictionaryEntry> {
        self.get_full(text).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(csv_text: &str) -> LocalDictionary {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(csv_text.as_bytes());
        LocalDictionary::from_reader(reader).unwrap()
    }

    const SAMPLE: &str = "\u{feff}term,kana,meaning\n\
        猫,ねこ,猫；猫咪\n\
        学校,がっこう,学校\n\
        ［お］茶,おちゃ,茶\n\
        ねこ舌,ねこじた,怕烫\n\
        bad row\n\
        空,,\n";

    #[test]
    fn normalizes_keys() {
        assert_eq!(normalize_key(" ［お］茶\r\n（名）～ "), "お茶 (名)~");
        assert_eq!(normalize_key("a\u{3000}\u{3000}b"), "a b");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn header_and_bad_rows_are_skipped() {
        let dict = parse(SAMPLE);
        assert!(dict.get("term").is_none());
        assert!(dict.get("空").is_none());
        assert!(dict.get("bad row").is_none());
    }

    #[test]
    fn lookup_by_term_kana_and_normalized_form() {
        let dict = parse(SAMPLE);
        assert_eq!(dict.get("猫"), Some("猫；猫咪"));
        assert_eq!(dict.get(" ねこ "), Some("猫；猫咪"));
        assert_eq!(dict.get("お茶").map(str::to_string), Some("茶".to_string()));
        assert_eq!(dict.get_full("［お］茶").map(|e| e.kana.as_str()), Some("おちゃ"));
        assert!(dict.get("").is_none());
    }

    #[test]
    fn two_column_rows() {
        let dict = parse("犬,狗\nいぬ,狗\n");
        assert_eq!(dict.get("犬"), Some("狗"));
        assert_eq!(dict.get_full("犬").map(|e| e.kana.as_str()), Some(""));
    }

    #[test]
    fn non_kana_reading_is_not_indexed() {
        let dict = parse("犬,inu,狗\n");
        assert!(dict.get("inu").is_none());
        assert_eq!(dict.get("犬"), Some("狗"));
    }

    #[test]
    fn search_ranks_exact_first() {
        let dict = parse(SAMPLE);
        let results = dict.search_by_meaning("猫", 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].term, "猫");

        let results = dict.search_by_meaning("学校", 5);
        assert_eq!(results[0].term, "学校");

        let dict = parse("学生,がくせい,学生\n学校,がっこう,学校\n校,こう,学校的\n");
        let terms: Vec<String> = dict
            .search_by_meaning("学校", 5)
            .into_iter()
            .map(|e| e.term)
            .collect();
        assert_eq!(terms, vec!["学校", "校"]);
        assert!(dict.search_by_meaning("  ", 5).is_empty());
        assert_eq!(dict.search_by_meaning("学", 1).len(), 1);
    }

    #[test]
    fn dictionary_trait_lookup() {
        let dict = parse(SAMPLE);
        let entry = dict.lookup_by_written_form("学校").unwrap();
        assert_eq!(entry.kana, "がっこう");
    }

    #[test]
    fn loads_gb18030_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("dict.csv");
        let (bytes, _, _) = encoding_rs::GB18030.encode("词条,假名,释义\n学校,がっこう,学校\n");
        std::fs::write(&path, &bytes).unwrap();

        let dict = LocalDictionary::load(&path).unwrap();
        assert_eq!(dict.get("がっこう"), Some("学校"));
        assert!(dict.get("词条").is_none());
    }

    #[test]
    fn missing_file_is_empty() {
        let dict = LocalDictionary::load("/nonexistent/dict.csv").unwrap();
        assert!(dict.is_empty());
        assert!(dict.path().is_some());
    }
}
