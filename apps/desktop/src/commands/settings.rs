//! Settings commands.

use crate::db::SettingsRepository;
use crate::models::AppSettings;
use crate::state::AppState;
use std::io::Write;

/// Requested changes; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub recognition_ratio: Option<f64>,
    pub session_limit: Option<u32>,
    pub shuffle_cards: Option<bool>,
    /// An empty string clears the override.
    pub dictionary_path: Option<String>,
    pub unit_order: Option<Vec<String>>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.recognition_ratio.is_none()
            && self.session_limit.is_none()
            && self.shuffle_cards.is_none()
            && self.dictionary_path.is_none()
            && self.unit_order.is_none()
    }

    pub fn apply(self, mut settings: AppSettings) -> AppSettings {
        if let Some(ratio) = self.recognition_ratio {
            settings.recognition_ratio = ratio;
        }
        if let Some(limit) = self.session_limit {
            settings.session_limit = limit;
        }
        if let Some(shuffle) = self.shuffle_cards {
            settings.shuffle_cards = shuffle;
        }
        if let Some(path) = self.dictionary_path {
            settings.dictionary_path = Some(path);
        }
        if let Some(order) = self.unit_order {
            settings.unit_order = order
                .into_iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect();
        }
        settings.normalized()
    }
}

/// Apply `update` (if any) and print the resulting settings.
pub fn settings<W: Write>(
    state: &AppState,
    update: SettingsUpdate,
    out: &mut W,
) -> anyhow::Result<AppSettings> {
    let repo = &state.repository;
    let mut settings = repo.get_settings()?;
    if !update.is_empty() {
        settings = update.apply(settings);
        repo.save_settings(&settings)?;
        tracing::info!("settings saved");
    }

    writeln!(out, "recognition_ratio = {}", settings.recognition_ratio)?;
    writeln!(
        out,
        "session_limit     = {}",
        match settings.session_limit {
            0 => "unlimited".to_string(),
            n => n.to_string(),
        }
    )?;
    writeln!(out, "shuffle_cards     = {}", settings.shuffle_cards)?;
    writeln!(
        out,
        "dictionary_path   = {}",
        settings
            .dictionary_path
            .clone()
            .unwrap_or_else(|| format!("{} (default)", state.config.dictionary_path.display()))
    )?;
    writeln!(out, "unit_order        = {}", settings.unit_order.join(", "))?;
    Ok(settings)
}
