//! Command-line interface.

use crate::transfer::DuplicatePolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kana-review")]
#[command(version, about = "Japanese vocabulary trainer with spaced repetition")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Review cards interactively
    Review {
        /// Restrict to these units (repeatable)
        #[arg(long = "unit")]
        units: Vec<String>,

        /// Share of cards quizzed Japanese-first, 0.0 to 1.0
        #[arg(long)]
        ratio: Option<f64>,

        /// Maximum cards in this session (0 for no limit)
        #[arg(long)]
        limit: Option<u32>,

        /// Seed for the queue shuffle
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Add a card
    Add {
        /// Kana form of the word
        term: String,

        /// Meaning; looked up in the dictionary when omitted
        meaning: Option<String>,

        #[arg(long)]
        unit: Option<String>,

        #[arg(long)]
        kanji: Option<String>,

        /// Romaji; derived from the kana when omitted
        #[arg(long)]
        romaji: Option<String>,
    },

    /// Delete a card by id
    Delete { id: i64 },

    /// List cards
    List {
        #[arg(long = "unit")]
        units: Vec<String>,
    },

    /// List units with card counts, or delete one
    Units {
        /// Delete this unit and all of its cards
        #[arg(long)]
        delete: Option<String>,
    },

    /// Import cards from CSV
    Import {
        path: PathBuf,

        /// What to do with rows matching an existing card
        #[arg(long, value_enum, default_value_t = DuplicatePolicy::Skip)]
        policy: DuplicatePolicy,

        /// Import every row into this unit
        #[arg(long)]
        unit: Option<String>,
    },

    /// Export cards to CSV
    Export {
        path: PathBuf,

        #[arg(long = "unit")]
        units: Vec<String>,
    },

    /// Show collection and review statistics
    Stats {
        #[arg(long = "unit")]
        units: Vec<String>,
    },

    /// Copy the database into the backup directory
    Backup {
        /// Backup directory (defaults to the configured one)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Replace the database with a backup
    Restore {
        /// Backup file; the newest backup when omitted
        path: Option<PathBuf>,
    },

    /// Look up a word in the local dictionary
    Lookup {
        query: String,

        /// Search meanings instead of written forms
        #[arg(long)]
        meaning: bool,

        #[arg(long, default_value_t = 8)]
        limit: usize,
    },

    /// Convert between romaji and kana
    Romaji { text: String },

    /// Show or change settings
    Settings {
        #[arg(long)]
        ratio: Option<f64>,

        /// Cards per session (0 for no limit)
        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        shuffle: Option<bool>,

        /// Dictionary CSV; an empty string clears the override
        #[arg(long)]
        dictionary: Option<String>,

        /// Preferred unit order, comma separated
        #[arg(long, value_delimiter = ',')]
        unit_order: Option<Vec<String>>,
    },
}
