//! Interactive review on a line-based terminal.

use crate::db::SettingsRepository;
use crate::state::AppState;
use rand::rngs::StdRng;
use rand::SeedableRng;
use review_core::{
    AnswerView, CardStore, Direction, JudgeOutcome, Prompt, Quality, ReviewScope, ReviewSession,
    SessionStatus, Totals,
};
use std::io::{BufRead, Write};

/// Options for one `review` invocation. Unset fields fall back to the
/// saved settings.
#[derive(Debug, Clone, Default)]
pub struct ReviewOptions {
    pub units: Vec<String>,
    pub ratio: Option<f64>,
    pub limit: Option<u32>,
    pub seed: Option<u64>,
}

pub fn scope_for(units: &[String]) -> ReviewScope {
    match units {
        [] => ReviewScope::All,
        [unit] => ReviewScope::Unit(unit.clone()),
        many => ReviewScope::Units(many.to_vec()),
    }
}

/// Build a session from the saved settings and run it.
pub fn review<R: BufRead, W: Write>(
    state: &AppState,
    options: &ReviewOptions,
    input: R,
    out: &mut W,
) -> anyhow::Result<Totals> {
    let mut settings = state.repository.get_settings()?;
    if let Some(ratio) = options.ratio {
        settings.recognition_ratio = ratio;
    }
    if let Some(limit) = options.limit {
        settings.session_limit = limit;
    }
    let config = settings.normalized().session_config();

    let dictionary = state.load_dictionary()?;
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let scope = scope_for(&options.units);
    let mut session =
        ReviewSession::start(&state.repository, &scope, &config, &mut rng)?.with_dictionary(&dictionary);
    tracing::info!(session_id = %session.id(), cards = session.len(), "starting review");

    run_review(&mut session, input, out)
}

fn rating_for(key: &str) -> Option<Quality> {
    match key {
        "1" => Some(Quality::Again),
        "2" => Some(Quality::Hard),
        "3" => Some(Quality::Good),
        "4" => Some(Quality::Easy),
        _ => None,
    }
}

fn write_prompt<W: Write>(out: &mut W, position: usize, len: usize, prompt: &Prompt) -> std::io::Result<()> {
    writeln!(out)?;
    match prompt {
        Prompt::Recognition { kana, romaji, kanji } => {
            write!(out, "[{position}/{len}] {kana}")?;
            if let Some(kanji) = kanji {
                write!(out, " {kanji}")?;
            }
            if !romaji.is_empty() {
                write!(out, " ({romaji})")?;
            }
            writeln!(out)?;
            writeln!(out, "Enter: reveal  q: quit")
        }
        Prompt::Recall { meaning } => {
            writeln!(out, "[{position}/{len}] {meaning}")?;
            writeln!(out, "Type the Japanese.  Empty line: give up  ?: peek  q: quit")
        }
    }
}

fn write_answer<W: Write>(out: &mut W, answer: &AnswerView) -> std::io::Result<()> {
    match answer.correct {
        Some(true) => writeln!(out, "Correct!")?,
        Some(false) => writeln!(out, "Not quite.")?,
        None => {}
    }
    write!(out, "  {}", answer.kana)?;
    if let Some(kanji) = &answer.kanji {
        write!(out, " {kanji}")?;
    }
    if !answer.romaji.is_empty() {
        write!(out, " ({})", answer.romaji)?;
    }
    writeln!(out, ": {}", answer.meaning)
}

/// Drive `session` from `input` until it completes, the learner quits or
/// input runs out.
///
/// Recognition cards: Enter toggles the answer, `1`-`4` rate
/// again/hard/good/easy. Recall cards: a line of text is the answer, an
/// empty line gives up, `?` toggles the answer. Once a card is judged,
/// Enter moves on. `q` abandons the session.
pub fn run_review<S, R, W>(
    session: &mut ReviewSession<'_, S>,
    input: R,
    out: &mut W,
) -> anyhow::Result<Totals>
where
    S: CardStore + ?Sized,
    R: BufRead,
    W: Write,
{
    if session.status() == SessionStatus::Aborted {
        writeln!(out, "Nothing to review.")?;
        return Ok(session.totals());
    }

    let mut lines = input.lines();
    let mut shown = None;
    while session.status() == SessionStatus::InProgress {
        if shown != Some(session.position()) {
            if let Some(prompt) = session.prompt() {
                write_prompt(out, session.position() + 1, session.len(), &prompt)?;
            }
            shown = Some(session.position());
        }
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let key = line.trim();
        if key.eq_ignore_ascii_case("q") {
            writeln!(out, "Session abandoned.")?;
            break;
        }

        let controls = session.controls();
        if controls.advance {
            if key.is_empty() {
                session.advance()?;
                continue;
            }
            if key != "?" {
                writeln!(out, "Enter: next card")?;
                continue;
            }
        }

        let Some(direction) = session.current().map(|entry| entry.direction) else {
            break;
        };
        match direction {
            Direction::Recognition if key.is_empty() => toggle(session, out)?,
            Direction::Recognition => match rating_for(key) {
                Some(quality) if controls.rate => {
                    if let JudgeOutcome::Recorded(judgment) = session.rate(quality)? {
                        writeln!(out, "Rated {:?}. Enter: next card", judgment.quality)?;
                    }
                }
                Some(_) => writeln!(out, "Reveal the answer before rating.")?,
                None => writeln!(out, "Rate with 1 (again), 2 (hard), 3 (good) or 4 (easy).")?,
            },
            Direction::Recall if key == "?" => toggle(session, out)?,
            Direction::Recall if controls.answer_input => {
                let outcome = if key.is_empty() {
                    session.give_up()?
                } else {
                    session.submit_answer(key)?
                };
                if let JudgeOutcome::Recorded(_) = outcome {
                    if let Some(answer) = session.answer() {
                        write_answer(out, &answer)?;
                    }
                    writeln!(out, "Enter: next card")?;
                }
            }
            Direction::Recall => writeln!(out, "Hide the answer with ? to type again.")?,
        }
    }

    let totals = session.totals();
    writeln!(out, "Reviewed {} cards, {} correct.", totals.attempted, totals.correct)?;
    out.flush()?;
    tracing::info!(
        session_id = %session.id(),
        attempted = totals.attempted,
        correct = totals.correct,
        status = ?session.status(),
        "review finished"
    );
    Ok(totals)
}

fn toggle<S, W>(session: &mut ReviewSession<'_, S>, out: &mut W) -> anyhow::Result<()>
where
    S: CardStore + ?Sized,
    W: Write,
{
    if session.toggle_reveal()? {
        if let Some(answer) = session.answer() {
            write_answer(out, &answer)?;
        }
        if session.controls().rate {
            writeln!(out, "1: again  2: hard  3: good  4: easy")?;
        }
    } else {
        writeln!(out, "(answer hidden)")?;
    }
    Ok(())
}
