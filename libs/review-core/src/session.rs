//! Review session state machine.
//!
//! A session pulls cards from a [`CardStore`], pairs each with a quiz
//! direction and walks them one at a time:
//!
//! ```text
//! Presented -> Revealed -> Judged -> (next card | Completed)
//! ```
//!
//! Recognition cards are revealed and then rated by the learner. Recall
//! cards go straight from `Presented` to `Judged` when an answer is
//! submitted or the learner gives up. A card is judged at most once per
//! session; repeated judge calls are ignored.

use crate::algorithm::{Sm2, SpacedRepetitionAlgorithm};
use crate::error::{Result, ReviewError};
use crate::matching::{check_answer, MatchResult};
use crate::store::{CardStore, Dictionary};
use crate::types::{Card, Direction, Quality, ReviewEvent, ReviewScope};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

/// How a session builds its queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Share of the queue quizzed in the recognition direction, 0.0..=1.0.
    pub recognition_ratio: f64,
    /// Maximum number of cards. `None` or `Some(0)` means no limit.
    pub limit: Option<usize>,
    /// Shuffle fetched cards before applying the limit.
    pub shuffle_cards: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recognition_ratio: 1.0,
            limit: None,
            shuffle_cards: false,
        }
    }
}

/// A card paired with the direction it is quizzed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub card: Card,
    pub direction: Direction,
}

/// The recorded verdict for one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub quality: Quality,
    pub correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typed_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_result: Option<MatchResult>,
}

/// Per-card state.
#[derive(Debug, Clone, PartialEq)]
pub enum CardPhase {
    /// Prompt shown, answer hidden.
    Presented,
    /// Answer shown before any judgment. For recall cards this is a peek
    /// and typing is disabled until it is hidden again.
    Revealed,
    /// Judgment recorded. Only the answer's visibility can still change.
    Judged {
        judgment: Judgment,
        answer_visible: bool,
    },
}

impl CardPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Presented => "presented",
            Self::Revealed => "revealed",
            Self::Judged { .. } => "judged",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    /// The fetch returned no cards; nothing to review.
    Aborted,
}

/// Running counters for the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub attempted: usize,
    pub correct: usize,
}

/// Outcome of a judge call.
#[derive(Debug, Clone, PartialEq)]
pub enum JudgeOutcome {
    Recorded(Judgment),
    /// The card was already judged; nothing changed.
    Ignored,
}

/// What to show before the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "direction", rename_all = "snake_case")]
pub enum Prompt {
    Recognition {
        kana: String,
        romaji: String,
        kanji: Option<String>,
    },
    Recall {
        meaning: String,
    },
}

/// The revealed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerView {
    pub meaning: String,
    pub kana: String,
    pub romaji: String,
    pub kanji: Option<String>,
    /// Verdict for judged recall cards; `None` for peeks and recognition.
    pub correct: Option<bool>,
}

/// Which actions the current phase accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub toggle_reveal: bool,
    pub rate: bool,
    pub answer_input: bool,
    pub give_up: bool,
    pub advance: bool,
}

/// One pass over a queue of cards.
pub struct ReviewSession<'a, S: CardStore + ?Sized> {
    id: Uuid,
    store: &'a S,
    dictionary: Option<&'a dyn Dictionary>,
    algorithm: Box<dyn SpacedRepetitionAlgorithm>,
    queue: Vec<QueueEntry>,
    index: usize,
    phase: CardPhase,
    status: SessionStatus,
    totals: Totals,
    presented_at: Instant,
}

impl<'a, S: CardStore + ?Sized> ReviewSession<'a, S> {
    /// Fetch cards for `scope` and build the queue.
    ///
    /// An empty fetch is not an error: the session starts in
    /// [`SessionStatus::Aborted`].
    pub fn start<R: Rng + ?Sized>(
        store: &'a S,
        scope: &ReviewScope,
        config: &SessionConfig,
        rng: &mut R,
    ) -> Result<Self> {
        let cards = store
            .fetch_cards(&scope.normalized())
            .map_err(ReviewError::Fetch)?;
        let queue = build_queue(cards, config, rng);
        let status = if queue.is_empty() {
            SessionStatus::Aborted
        } else {
            SessionStatus::InProgress
        };

        let id = Uuid::new_v4();
        tracing::debug!(session_id = %id, cards = queue.len(), ?status, "review session started");

        Ok(Self {
            id,
            store,
            dictionary: None,
            algorithm: Box::new(Sm2::default()),
            queue,
            index: 0,
            phase: CardPhase::Presented,
            status,
            totals: Totals::default(),
            presented_at: Instant::now(),
        })
    }

    /// Enable the alternate-kanji fallback for recall answers.
    pub fn with_dictionary(mut self, dictionary: &'a dyn Dictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn with_algorithm(mut self, algorithm: Box<dyn SpacedRepetitionAlgorithm>) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn queue(&self) -> &[QueueEntry] {
        &self.queue
    }

    /// Zero-based position of the current card.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The card under review, while the session is in progress.
    pub fn current(&self) -> Option<&QueueEntry> {
        match self.status {
            SessionStatus::InProgress => self.queue.get(self.index),
            _ => None,
        }
    }

    pub fn phase(&self) -> Option<&CardPhase> {
        self.current().map(|_| &self.phase)
    }

    pub fn prompt(&self) -> Option<Prompt> {
        let entry = self.current()?;
        let card = &entry.card;
        let prompt = match entry.direction {
            Direction::Recognition => Prompt::Recognition {
                kana: display_kana(card).to_string(),
                romaji: card.reading_romaji(),
                kanji: non_empty(card.kanji_form()),
            },
            Direction::Recall => Prompt::Recall {
                meaning: card.meaning.clone(),
            },
        };
        Some(prompt)
    }

    /// The answer, when the current phase shows it.
    pub fn answer(&self) -> Option<AnswerView> {
        let entry = self.current()?;
        let correct = match &self.phase {
            CardPhase::Presented => return None,
            CardPhase::Revealed => None,
            CardPhase::Judged { answer_visible: false, .. } => return None,
            CardPhase::Judged { judgment, .. } => match entry.direction {
                Direction::Recall => Some(judgment.correct),
                Direction::Recognition => None,
            },
        };
        let card = &entry.card;
        Some(AnswerView {
            meaning: card.meaning.clone(),
            kana: display_kana(card).to_string(),
            romaji: card.reading_romaji(),
            kanji: non_empty(card.kanji_form()),
            correct,
        })
    }

    pub fn controls(&self) -> Controls {
        let Some(entry) = self.current() else {
            return Controls::default();
        };
        let judged = matches!(self.phase, CardPhase::Judged { .. });
        match (entry.direction, &self.phase) {
            (Direction::Recognition, phase) => Controls {
                toggle_reveal: true,
                rate: matches!(phase, CardPhase::Revealed),
                advance: judged,
                ..Controls::default()
            },
            (Direction::Recall, phase) => {
                let open = matches!(phase, CardPhase::Presented);
                Controls {
                    toggle_reveal: true,
                    answer_input: open,
                    give_up: open,
                    advance: judged,
                    ..Controls::default()
                }
            }
        }
    }

    /// Show or hide the answer. Returns whether the answer is now visible.
    ///
    /// Hiding a judged card does not undo its judgment, and never reopens
    /// recall input.
    pub fn toggle_reveal(&mut self) -> Result<bool> {
        self.ensure_in_progress()?;
        let visible = match &mut self.phase {
            CardPhase::Judged { answer_visible, .. } => {
                *answer_visible = !*answer_visible;
                *answer_visible
            }
            phase => {
                let reveal = matches!(phase, CardPhase::Presented);
                *phase = if reveal {
                    CardPhase::Revealed
                } else {
                    CardPhase::Presented
                };
                reveal
            }
        };
        Ok(visible)
    }

    /// Self-rate a revealed recognition card.
    pub fn rate(&mut self, quality: Quality) -> Result<JudgeOutcome> {
        self.expect_direction(Direction::Recognition)?;
        match self.phase {
            CardPhase::Presented => Err(ReviewError::InvalidPhase {
                phase: self.phase.name(),
            }),
            CardPhase::Revealed => self.judge(quality, None, None),
            CardPhase::Judged { .. } => Ok(JudgeOutcome::Ignored),
        }
    }

    /// Check a typed answer for a recall card. Match scores 4, miss scores 1.
    pub fn submit_answer(&mut self, typed: &str) -> Result<JudgeOutcome> {
        let entry = self.expect_direction(Direction::Recall)?;
        match self.phase {
            CardPhase::Presented => {
                let result = check_answer(&entry.card, typed, self.dictionary);
                let quality = Quality::from_recall(result.is_correct);
                let typed_answer = Some(result.typed_normalized.clone());
                self.judge(quality, typed_answer, Some(result))
            }
            CardPhase::Revealed => Err(ReviewError::InvalidPhase {
                phase: self.phase.name(),
            }),
            CardPhase::Judged { .. } => Ok(JudgeOutcome::Ignored),
        }
    }

    /// Fail a recall card without typing.
    pub fn give_up(&mut self) -> Result<JudgeOutcome> {
        self.expect_direction(Direction::Recall)?;
        match self.phase {
            CardPhase::Presented => self.judge(Quality::Again, None, None),
            CardPhase::Revealed => Err(ReviewError::InvalidPhase {
                phase: self.phase.name(),
            }),
            CardPhase::Judged { .. } => Ok(JudgeOutcome::Ignored),
        }
    }

    /// Move past a judged card.
    pub fn advance(&mut self) -> Result<SessionStatus> {
        self.ensure_in_progress()?;
        if !matches!(self.phase, CardPhase::Judged { .. }) {
            return Err(ReviewError::InvalidPhase {
                phase: self.phase.name(),
            });
        }

        self.index += 1;
        if self.index >= self.queue.len() {
            self.status = SessionStatus::Completed;
            tracing::debug!(
                session_id = %self.id,
                attempted = self.totals.attempted,
                correct = self.totals.correct,
                "review session completed"
            );
        } else {
            self.phase = CardPhase::Presented;
            self.presented_at = Instant::now();
        }
        Ok(self.status)
    }

    fn ensure_in_progress(&self) -> Result<()> {
        match self.status {
            SessionStatus::InProgress => Ok(()),
            _ => Err(ReviewError::NotInProgress),
        }
    }

    fn expect_direction(&self, expected: Direction) -> Result<&QueueEntry> {
        let entry = self.current().ok_or(ReviewError::NotInProgress)?;
        if entry.direction != expected {
            return Err(ReviewError::WrongDirection {
                expected,
                actual: entry.direction,
            });
        }
        Ok(entry)
    }

    /// Schedule, persist and record the current card.
    ///
    /// A failed state save leaves the card unjudged so the caller can
    /// retry. A failed event append is only logged.
    fn judge(
        &mut self,
        quality: Quality,
        typed_answer: Option<String>,
        match_result: Option<MatchResult>,
    ) -> Result<JudgeOutcome> {
        let now = Utc::now();
        let elapsed_ms = u64::try_from(self.presented_at.elapsed().as_millis()).ok();
        let entry = self
            .queue
            .get_mut(self.index)
            .ok_or(ReviewError::NotInProgress)?;

        let before = entry.card.memory.clone();
        let scheduled = self.algorithm.schedule(&before, quality, now);
        self.store.save_card_state(entry.card.id, &scheduled.new_state)?;
        entry.card.memory = scheduled.new_state.clone();

        let correct = quality.counts_as_correct();
        let event = ReviewEvent {
            card_id: entry.card.id,
            session_id: self.id,
            reviewed_at: now,
            direction: entry.direction,
            quality,
            was_correct: correct,
            typed_answer: typed_answer.clone(),
            elapsed_ms,
            before,
            after: scheduled.new_state,
        };
        if let Err(err) = self.store.append_review_event(&event) {
            tracing::warn!(
                card_id = event.card_id,
                session_id = %self.id,
                error = %err,
                "review event not recorded"
            );
        }

        self.totals.attempted += 1;
        if correct {
            self.totals.correct += 1;
        }

        let judgment = Judgment {
            quality,
            correct,
            typed_answer,
            match_result,
        };
        self.phase = CardPhase::Judged {
            judgment: judgment.clone(),
            answer_visible: true,
        };
        Ok(JudgeOutcome::Recorded(judgment))
    }
}

/// Split `count` entries into `floor(count * ratio)` recognition entries
/// and recall for the rest, in random order.
pub fn assign_directions<R: Rng + ?Sized>(count: usize, ratio: f64, rng: &mut R) -> Vec<Direction> {
    let ratio = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        1.0
    };
    let recognition = ((count as f64 * ratio).floor() as usize).min(count);
    let mut directions = vec![Direction::Recognition; recognition];
    directions.resize(count, Direction::Recall);
    directions.shuffle(rng);
    directions
}

fn build_queue<R: Rng + ?Sized>(mut cards: Vec<Card>, config: &SessionConfig, rng: &mut R) -> Vec<QueueEntry> {
    if config.shuffle_cards {
        cards.shuffle(rng);
    }
    if let Some(limit) = config.limit.filter(|&limit| limit > 0) {
        cards.truncate(limit);
    }
    let directions = assign_directions(cards.len(), config.recognition_ratio, rng);
    cards
        .into_iter()
        .zip(directions)
        .map(|(card, direction)| QueueEntry { card, direction })
        .collect()
}

fn display_kana(card: &Card) -> &str {
    match card.reading_kana() {
        "" => card.fallback_term(),
        kana => kana,
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
