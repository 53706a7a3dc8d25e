pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod dictionary;
pub mod encoding;
pub mod models;
pub mod state;
pub mod transfer;

use clap::Parser;
use std::io::Write;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::commands::{AddCard, ReviewOptions, SettingsUpdate};
use crate::config::AppConfig;
use crate::state::AppState;
use crate::transfer::ImportOptions;

pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    let state = AppState::open(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    dispatch(state, cli.command, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Run one subcommand against `state`, writing user output to `out`.
pub fn dispatch<W: Write>(state: AppState, command: Commands, out: &mut W) -> anyhow::Result<()> {
    match command {
        Commands::Review {
            units,
            ratio,
            limit,
            seed,
        } => {
            let options = ReviewOptions {
                units,
                ratio,
                limit,
                seed,
            };
            let stdin = std::io::stdin();
            commands::review(&state, &options, stdin.lock(), out)?;
        }
        Commands::Add {
            term,
            meaning,
            unit,
            kanji,
            romaji,
        } => {
            let request = AddCard {
                term,
                meaning,
                unit,
                kanji,
                romaji,
            };
            commands::add_card(&state, &request, out)?;
        }
        Commands::Delete { id } => commands::delete_card(&state, id, out)?,
        Commands::List { units } => commands::list_cards(&state, &units, out)?,
        Commands::Units { delete: Some(unit) } => {
            commands::delete_unit(&state, &unit, out)?;
        }
        Commands::Units { delete: None } => commands::list_units(&state, out)?,
        Commands::Import { path, policy, unit } => {
            let options = ImportOptions {
                policy,
                fixed_unit: unit,
            };
            commands::import(&state, &path, &options, out)?;
        }
        Commands::Export { path, units } => {
            commands::export(&state, &path, &units, out)?;
        }
        Commands::Stats { units } => {
            commands::stats(&state, &units, out)?;
        }
        Commands::Backup { dir } => {
            commands::backup(&state, dir.as_deref(), out)?;
        }
        Commands::Restore { path } => {
            commands::restore(state, path.as_deref(), out)?;
        }
        Commands::Lookup {
            query,
            meaning,
            limit,
        } => {
            commands::lookup(&state, &query, meaning, limit, out)?;
        }
        Commands::Romaji { text } => commands::romaji(&text, out)?,
        Commands::Settings {
            ratio,
            limit,
            shuffle,
            dictionary,
            unit_order,
        } => {
            let update = SettingsUpdate {
                recognition_ratio: ratio,
                session_limit: limit,
                shuffle_cards: shuffle,
                dictionary_path: dictionary,
                unit_order,
            };
            commands::settings(&state, update, out)?;
        }
    }
    Ok(())
}
