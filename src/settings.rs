//! Game settings and preferences
//!
//! Persisted separately from highscores in the key-value store. The JSON shape
//! matches what the settings view produces:
//! `{"round":60,"difficulty":"normal","size":"medium","sound":"on",...}`.

use serde::{Deserialize, Serialize};

use crate::config::ROUND_LENGTHS;
use crate::persistence::{KeyValueStore, StorageError};

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Target size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl TargetSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetSize::Small => "small",
            TargetSize::Medium => "medium",
            TargetSize::Large => "large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" => Some(TargetSize::Small),
            "medium" => Some(TargetSize::Medium),
            "large" => Some(TargetSize::Large),
            _ => None,
        }
    }
}

/// An on/off preference, serialized as `"on"` / `"off"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(&self) -> bool {
        *self == Switch::On
    }

    pub fn toggled(&self) -> Self {
        match self {
            Switch::On => Switch::Off,
            Switch::Off => Switch::On,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Switch::On => "on",
            Switch::Off => "off",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "on" => Some(Switch::On),
            "off" => Some(Switch::Off),
            _ => None,
        }
    }
}

impl From<bool> for Switch {
    fn from(on: bool) -> Self {
        if on { Switch::On } else { Switch::Off }
    }
}

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Round length in seconds (one of `ROUND_LENGTHS`)
    pub round: u32,
    pub difficulty: Difficulty,
    pub size: TargetSize,
    pub sound: Switch,
    pub theme: Theme,
    /// Debug overlay on the arena
    pub debug: Switch,
    /// Zen mode: no score, no highscore
    pub zen: Switch,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            round: 60,
            difficulty: Difficulty::Normal,
            size: TargetSize::Medium,
            sound: Switch::On,
            theme: Theme::Dark,
            debug: Switch::Off,
            zen: Switch::Off,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "reflex-settings";

    pub fn zen(&self) -> bool {
        self.zen.is_on()
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound.is_on()
    }

    /// Whether `round` is one of the offered round lengths
    pub fn has_known_round(&self) -> bool {
        ROUND_LENGTHS.contains(&self.round)
    }

    /// Full round clock in tenths of a second
    pub fn round_tenths(&self) -> u32 {
        self.round.saturating_mul(10)
    }

    /// Load settings from the store, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) if settings.has_known_round() => {
                    log::info!("Loaded settings from storage");
                    return settings;
                }
                Ok(settings) => log::warn!(
                    "Stored round length {}s not offered, using defaults",
                    settings.round
                ),
                Err(e) => log::warn!("Stored settings unreadable, using defaults: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings storage unavailable: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.set_item(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
