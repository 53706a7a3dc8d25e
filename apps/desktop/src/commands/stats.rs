//! Statistics commands.

use crate::db::StatsRepository;
use crate::models::{Overview, StudyStats};
use crate::state::AppState;
use std::io::Write;

pub fn stats<W: Write>(
    state: &AppState,
    units: &[String],
    out: &mut W,
) -> anyhow::Result<(Overview, StudyStats)> {
    let repo = &state.repository;
    let overview = repo.get_overview(&super::study::scope_for(units))?;
    let study = repo.get_study_stats()?;

    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
    let (new, learning, mature) = overview.repetition_bins;
    writeln!(out, "Cards:          {}", overview.total)?;
    writeln!(out, "  with reading: {}", overview.with_reading)?;
    writeln!(out, "  with kanji:   {}", overview.with_kanji)?;
    writeln!(out, "  with meaning: {}", overview.with_meaning)?;
    writeln!(out, "  reviewed:     {}", overview.reviewed)?;
    writeln!(out, "Repetitions:    0: {new}  1-2: {learning}  3+: {mature}")?;
    writeln!(out, "Last added:     {}", date(overview.last_added))?;
    writeln!(out, "Last reviewed:  {}", date(overview.last_reviewed))?;
    writeln!(out, "Reviews today:  {}", study.reviews_today)?;
    writeln!(out, "Total reviews:  {}", study.total_reviews)?;
    writeln!(out, "Streak:         {} days", study.streak_days)?;
    writeln!(out, "Correct rate:   {:.0}%", study.correct_rate * 100.0)?;
    Ok((overview, study))
}
