//! Spaced repetition algorithm implementations.

pub mod sm2;

use crate::types::{MemoryState, Quality};
use chrono::{DateTime, Utc};

pub use sm2::Sm2;

/// Result of scheduling a card after review.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulingResult {
    pub new_state: MemoryState,
    pub next_due: DateTime<Utc>,
}

/// Trait for spaced repetition algorithms.
pub trait SpacedRepetitionAlgorithm: Send + Sync {
    /// Algorithm identifier.
    fn name(&self) -> &'static str;

    /// Calculate next review state after a review.
    fn schedule(&self, state: &MemoryState, quality: Quality, now: DateTime<Utc>) -> SchedulingResult;

    /// Initial state for a new card.
    fn initial_state(&self) -> MemoryState;
}

