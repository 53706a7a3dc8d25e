//! SM-2 spaced repetition algorithm.
//!
//! Classic SuperMemo 2: a lapse restarts the schedule, passing scores walk
//! the 1 / 6 / interval x easiness progression, and easiness moves by the
//! standard quadratic adjustment in both cases.

use super::{SchedulingResult, SpacedRepetitionAlgorithm};
use crate::types::{MemoryState, Quality};
use chrono::{DateTime, Duration, Utc};

/// Highest score SM-2 understands.
const MAX_QUALITY: u8 = 5;

/// Longest interval handed out, in days.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// SM-2 algorithm with configurable easiness bounds.
#[derive(Debug, Clone)]
pub struct Sm2 {
    pub initial_easiness: f64,
    pub minimum_easiness: f64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_easiness: 2.5,
            minimum_easiness: 1.3,
        }
    }
}

impl Sm2 {
    /// Recompute `(interval, repetition, easiness)` for a raw score.
    ///
    /// Scores above 5 are treated as 5. The interval multiplier is the
    /// easiness from before this review, and the result never exceeds
    /// [`MAX_INTERVAL_DAYS`].
    pub fn recompute(&self, interval: u32, repetition: u32, easiness: f64, quality: u8) -> (u32, u32, f64) {
        let quality = quality.min(MAX_QUALITY);

        let (interval, repetition) = if quality < Quality::PASS_THRESHOLD {
            (1, 0)
        } else {
            let repetition = repetition.saturating_add(1);
            let interval = match repetition {
                1 => 1,
                2 => 6,
                _ => {
                    let next = (f64::from(interval) * easiness).round();
                    (next.min(f64::from(MAX_INTERVAL_DAYS)) as u32).max(1)
                }
            };
            (interval, repetition)
        };

        let miss = f64::from(MAX_QUALITY - quality);
        let easiness = (easiness + 0.1 - miss * (0.08 + miss * 0.02)).max(self.minimum_easiness);

        (interval, repetition, easiness)
    }
}

impl SpacedRepetitionAlgorithm for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_state(&self) -> MemoryState {
        MemoryState {
            easiness: self.initial_easiness,
            ..MemoryState::default()
        }
    }

    fn schedule(&self, state: &MemoryState, quality: Quality, now: DateTime<Utc>) -> SchedulingResult {
        let (interval, repetition, easiness) = self.recompute(
            state.interval,
            state.repetition,
            state.easiness,
            quality.to_value(),
        );
        let next_due = now
            .checked_add_signed(Duration::days(i64::from(interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        SchedulingResult {
            new_state: MemoryState {
                interval,
                repetition,
                easiness,
                last_reviewed_at: Some(now),
                due_at: Some(next_due),
            },
            next_due,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn progression_one_six_fifteen() {
        let sm2 = Sm2::default();
        let (interval, repetition, _) = sm2.recompute(0, 0, 2.5, 4);
        assert_eq!((interval, repetition), (1, 1));
        let (interval, repetition, _) = sm2.recompute(1, 1, 2.5, 4);
        assert_eq!((interval, repetition), (6, 2));
        let (interval, repetition, easiness) = sm2.recompute(6, 2, 2.5, 4);
        assert_eq!((interval, repetition), (15, 3));
        assert!(close(easiness, 2.5));
    }

    #[test]
    fn lapse_restarts_schedule() {
        let sm2 = Sm2::default();
        for (interval, repetition, easiness) in [(0, 0, 2.5), (15, 3, 2.5), (40, 7, 1.9), (3, 1, 1.3)] {
            let (new_interval, new_repetition, new_easiness) =
                sm2.recompute(interval, repetition, easiness, 1);
            assert_eq!((new_interval, new_repetition), (1, 0));
            assert!(close(new_easiness, (easiness - 0.54).max(1.3)));
        }
    }

    #[test]
    fn easiness_never_below_floor() {
        let sm2 = Sm2::default();
        for quality in [0, 1, 2, 3, 4, 5] {
            let (_, _, easiness) = sm2.recompute(10, 4, 1.3, quality);
            assert!(easiness >= 1.3, "quality {quality} gave {easiness}");
        }
    }

    #[test]
    fn easiness_adjustments() {
        let sm2 = Sm2::default();
        assert!(close(sm2.recompute(1, 1, 2.5, 5).2, 2.6));
        assert!(close(sm2.recompute(1, 1, 2.5, 4).2, 2.5));
        assert!(close(sm2.recompute(1, 1, 2.5, 3).2, 2.36));
    }

    #[test]
    fn interval_uses_easiness_before_update() {
        let sm2 = Sm2::default();
        // 10 * 2.5 = 25 even though easiness rises to 2.6.
        let (interval, _, easiness) = sm2.recompute(10, 3, 2.5, 5);
        assert_eq!(interval, 25);
        assert!(close(easiness, 2.6));
    }

    #[test]
    fn scores_above_five_are_clamped() {
        let sm2 = Sm2::default();
        assert_eq!(sm2.recompute(6, 2, 2.5, 9), sm2.recompute(6, 2, 2.5, 5));
    }

    #[test]
    fn interval_is_capped() {
        let sm2 = Sm2::default();
        let (interval, _, _) = sm2.recompute(30_000, 9, 2.5, 5);
        assert_eq!(interval, MAX_INTERVAL_DAYS);
        let (interval, _, _) = sm2.recompute(u32::MAX, 9, 2.5, 5);
        assert_eq!(interval, MAX_INTERVAL_DAYS);
        let (_, repetition, _) = sm2.recompute(6, u32::MAX, 2.5, 4);
        assert_eq!(repetition, u32::MAX);
    }

    #[test]
    fn long_run_of_easy_ratings_stays_scheduled() {
        let sm2 = Sm2::default();
        let at = now();
        let mut state = sm2.initial_state();
        for _ in 0..50 {
            let result = sm2.schedule(&state, Quality::Easy, at);
            assert!(result.next_due > at);
            state = result.new_state;
        }
        assert_eq!(state.interval, MAX_INTERVAL_DAYS);
        assert_eq!(state.repetition, 50);
        assert_eq!(state.due_at, Some(at + Duration::days(i64::from(MAX_INTERVAL_DAYS))));
    }

    #[test]
    fn due_date_saturates_near_the_end_of_time() {
        let sm2 = Sm2::default();
        let result = sm2.schedule(&sm2.initial_state(), Quality::Good, DateTime::<Utc>::MAX_UTC);
        assert_eq!(result.next_due, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn schedule_stamps_review_and_due_dates() {
        let sm2 = Sm2::default();
        let at = now();
        let state = MemoryState {
            interval: 6,
            repetition: 2,
            ..sm2.initial_state()
        };
        let result = sm2.schedule(&state, Quality::Good, at);
        assert_eq!(result.new_state.interval, 15);
        assert_eq!(result.new_state.last_reviewed_at, Some(at));
        assert_eq!(result.next_due, at + Duration::days(15));
        assert_eq!(result.new_state.due_at, Some(result.next_due));
    }
}
