//! Error types for review-core.

use crate::types::{CardId, Direction};
use thiserror::Error;

/// Result type alias using ReviewError.
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Errors reported by a card store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("card not found: {0}")]
    CardNotFound(CardId),

    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap any backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Errors that can occur while driving a review session.
///
/// Expected outcomes (lapses, empty queues, duplicate judgments) are not
/// errors; they are reported through return values.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("session is not in progress")]
    NotInProgress,

    #[error("operation requires a {expected:?} card, current card is {actual:?}")]
    WrongDirection {
        expected: Direction,
        actual: Direction,
    },

    #[error("operation not allowed while card is {phase}")]
    InvalidPhase { phase: &'static str },

    #[error("could not load cards: {0}")]
    Fetch(#[source] StoreError),

    #[error("card state could not be saved: {0}")]
    Store(#[from] StoreError),
}
