//! Session configuration and player preferences
//!
//! Preferences are persisted under their own storage key, separate from the
//! high score.

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::persistence::Storage;
use crate::sim::effects::Effect;
use crate::sim::question::{Difficulty, Operator};

/// Highest table offered on the selection screen
pub const MAX_TABLE: u32 = 10;
/// Table used when a table-based operator has none selected
const DEFAULT_TABLE: u32 = 3;

/// What the player picked before starting a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    /// Multiplication tables in 1..=10, sorted
    pub selected_tables: Vec<u32>,
    /// At least one operator, no duplicates
    pub selected_operators: Vec<Operator>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            selected_tables: vec![2, 3, 4, 5],
            selected_operators: vec![Operator::Multiply],
        }
    }
}

impl SessionConfig {
    pub fn new(difficulty: Difficulty, tables: Vec<u32>, operators: Vec<Operator>) -> Self {
        Self {
            difficulty,
            selected_tables: tables,
            selected_operators: operators,
        }
        .sanitized()
    }

    /// Build from raw operator symbols; unknown symbols are dropped
    pub fn from_symbols(difficulty: Difficulty, tables: Vec<u32>, symbols: &[&str]) -> Self {
        let operators = symbols
            .iter()
            .filter_map(|s| {
                let op = Operator::from_symbol(s);
                if op.is_none() {
                    log::warn!("Ignoring unknown operator '{}'", s);
                }
                op
            })
            .collect();
        Self::new(difficulty, tables, operators)
    }

    /// Normalize a possibly hand-edited config.
    ///
    /// Tables are restricted to 1..=10 and deduplicated, and only kept while a
    /// table-based operator is selected. Operators are deduplicated; an empty
    /// set falls back to multiplication.
    pub fn sanitized(mut self) -> Self {
        self.selected_tables.retain(|t| (1..=MAX_TABLE).contains(t));
        self.selected_tables.sort_unstable();
        self.selected_tables.dedup();

        self.selected_operators.sort();
        self.selected_operators.dedup();
        if self.selected_operators.is_empty() {
            log::warn!("No operators selected, defaulting to multiplication");
            self.selected_operators.push(Operator::Multiply);
        }

        if !self.needs_tables() {
            self.selected_tables.clear();
        } else if self.selected_tables.is_empty() {
            log::warn!("No valid tables selected, defaulting to 3");
            self.selected_tables.push(DEFAULT_TABLE);
        }
        self
    }

    /// Whether any selected operator draws from the tables
    pub fn needs_tables(&self) -> bool {
        self.selected_operators.iter().any(|op| op.uses_tables())
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Camera shake on hits and wrong answers
    pub screen_shake: bool,
    /// Full-screen flashes (level-up, spell)
    pub flashes: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Accessibility ===
    /// Reduced motion (no shake, flashes or frost overlay)
    pub reduced_motion: bool,

    /// Selection from the last session, offered again on the start screen
    pub last_session: Option<SessionConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_shake: true,
            flashes: true,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            reduced_motion: false,
            last_session: None,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective flashes (respects reduced_motion)
    pub fn effective_flashes(&self) -> bool {
        self.flashes && !self.reduced_motion
    }

    /// Whether the presentation layer should play this effect at all
    pub fn allows(&self, effect: &Effect) -> bool {
        match effect {
            Effect::CameraShake { .. } => self.effective_screen_shake(),
            Effect::Flash { .. } | Effect::FrostOverlay { .. } => self.effective_flashes(),
            Effect::Sound { .. } => self.sfx_volume > 0.0 && self.master_volume > 0.0,
            Effect::PlayMusic { .. } => self.music_volume > 0.0 && self.master_volume > 0.0,
            _ => true,
        }
    }

    /// Final volume for a sound request's base volume
    pub fn sfx_gain(&self, base: f32) -> f32 {
        (base * self.sfx_volume * self.master_volume).clamp(0.0, 1.0)
    }

    /// Load settings, falling back to defaults on a missing or bad entry
    pub fn load(storage: &dyn Storage) -> Self {
        if let Some(json) = storage.get_item(SETTINGS_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings; failures are logged and otherwise ignored
    pub fn save(&self, storage: &mut dyn Storage) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize settings: {}", e);
                return;
            }
        };
        match storage.set_item(SETTINGS_KEY, &json) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::sim::effects::SoundCue;

    #[test]
    fn test_sanitized_tables_and_operators() {
        let config = SessionConfig::new(
            Difficulty::Hard,
            vec![0, 5, 11, 3, 5],
            vec![Operator::Divide, Operator::Add, Operator::Divide],
        );
        assert_eq!(config.selected_tables, vec![3, 5]);
        assert_eq!(config.selected_operators, vec![Operator::Add, Operator::Divide]);
    }

    #[test]
    fn test_empty_operators_default_to_multiply() {
        let config = SessionConfig::from_symbols(Difficulty::Normal, vec![], &["%", "?"]);
        assert_eq!(config.selected_operators, vec![Operator::Multiply]);
        assert_eq!(config.selected_tables, vec![3]);
    }

    #[test]
    fn test_addition_only_clears_tables() {
        let config = SessionConfig::from_symbols(Difficulty::Normal, vec![4, 7], &["+", "-"]);
        assert!(config.selected_tables.is_empty());
        assert!(!config.needs_tables());
    }

    #[test]
    fn test_reduced_motion_blocks_motion_effects() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.allows(&Effect::shake(0.1, 0.01)));
        assert!(!settings.allows(&Effect::FrostOverlay { duration: 0.3 }));
        assert!(settings.allows(&Effect::sound(SoundCue::Correct)));
        assert!(settings.allows(&Effect::InputError { duration: 0.3 }));
    }

    #[test]
    fn test_settings_round_trip_through_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(Settings::load(&storage), Settings::default());

        let settings = Settings {
            music_volume: 0.2,
            last_session: Some(SessionConfig::default()),
            ..Default::default()
        };
        settings.save(&mut storage);
        assert_eq!(Settings::load(&storage), settings);

        storage.set_item(SETTINGS_KEY, "garbage").unwrap();
        assert_eq!(Settings::load(&storage), Settings::default());
    }
}
