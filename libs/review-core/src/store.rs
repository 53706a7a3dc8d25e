//! Collaborator contracts the review session depends on.
//!
//! The session never touches storage directly. Front ends hand it a
//! [`CardStore`] and, optionally, a [`Dictionary`].

use crate::error::StoreError;
use crate::types::{Card, CardId, MemoryState, ReviewEvent, ReviewScope};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persistent card storage.
///
/// Implementations serialize their own writes; methods take `&self`.
pub trait CardStore {
    /// Cards for the scope, in the order they should be reviewed.
    fn fetch_cards(&self, scope: &ReviewScope) -> Result<Vec<Card>, StoreError>;

    /// Write back the scheduler output for one card.
    fn save_card_state(&self, id: CardId, state: &MemoryState) -> Result<(), StoreError>;

    /// Append a review record. Callers treat failure as non-fatal.
    fn append_review_event(&self, event: &ReviewEvent) -> Result<(), StoreError>;
}

/// One dictionary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub term: String,
    pub kana: String,
    pub meaning: String,
}

/// Read-only word lookup.
pub trait Dictionary {
    /// Find the entry whose term or kana equals `text`.
    fn lookup_by_written_form(&self, text: &str) -> Option<DictionaryEntry>;
}

impl Dictionary for HashMap<String, DictionaryEntry> {
    fn lookup_by_written_form(&self, text: &str) -> Option<DictionaryEntry> {
        self.get(text.trim()).cloned()
    }
}
