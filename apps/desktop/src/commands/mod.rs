//! Terminal commands behind the CLI subcommands.

pub mod deck;
pub mod dictionary;
pub mod settings;
pub mod stats;
pub mod study;
pub mod transfer;

pub use deck::{add_card, delete_card, delete_unit, list_cards, list_units, AddCard};
pub use dictionary::{lookup, romaji};
pub use settings::{settings, SettingsUpdate};
pub use stats::stats;
pub use study::{review, run_review, ReviewOptions};
pub use transfer::{backup, export, import, restore};
