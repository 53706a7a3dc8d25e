//! Review engine for the kana vocabulary trainer.
//!
//! Provides:
//! - Romaji/kana transliteration and script classification
//! - Answer equivalence checking for recall mode
//! - SM-2 spaced repetition scheduling
//! - The review session state machine
//! - Collaborator traits for the card store and dictionary

pub mod algorithm;
pub mod error;
pub mod kana;
pub mod matching;
pub mod session;
pub mod store;
pub mod types;

pub use algorithm::{SchedulingResult, SpacedRepetitionAlgorithm};
pub use error::{Result, ReviewError, StoreError};
pub use kana::{kana_to_romaji, romaji_to_kana, romaji_to_kana_relaxed, KanaPair};
pub use matching::{check_answer, MatchResult, MatchedForm};
pub use session::{
    AnswerView, CardPhase, Controls, JudgeOutcome, Judgment, Prompt, QueueEntry, ReviewSession,
    SessionConfig, SessionStatus, Totals,
};
pub use store::{CardStore, Dictionary, DictionaryEntry};
pub use types::{Card, CardId, Direction, MemoryState, Quality, ReviewEvent, ReviewScope};
