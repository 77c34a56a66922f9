//! Reflex Raid - A timed reflex-clicking arcade game
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (scheduler, spawning, scoring)
//! - `config`: Static balance tables (difficulties, sizes, scoring)
//! - `game`: Application shell tying rounds to settings and highscores
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Key-value storage (LocalStorage on web)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod config;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use highscores::HighScores;
pub use settings::{Difficulty, Settings, Switch, TargetSize, Theme};

/// Game timing and layout constants
pub mod consts {
    /// Round timer period (ms)
    pub const ROUND_TICK_MS: u64 = 100;
    /// Time removed from the round clock per round tick, in tenths of a second
    pub const ROUND_TICK_TENTHS: u32 = 1;

    /// Delay between countdown steps (ms)
    pub const COUNTDOWN_STEP_MS: u64 = 850;
    /// Countdown labels shown before a round starts
    pub const COUNTDOWN_STEPS: [&str; 4] = ["3", "2", "1", "GO!"];

    /// Inner margin between a target and the arena edge (px)
    pub const ARENA_MARGIN: f32 = 12.0;
    /// Default arena dimensions, used until the view reports its real size
    pub const DEFAULT_ARENA_WIDTH: f32 = 800.0;
    pub const DEFAULT_ARENA_HEIGHT: f32 = 500.0;

    /// How long a toast stays visible (ms)
    pub const TOAST_MS: u64 = 1600;
    /// How long the miss shake lasts (ms)
    pub const SHAKE_MS: u64 = 200;
}

/// Average of a list of samples, `None` when empty
pub fn average(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Format a millisecond value for display ("231ms")
pub fn format_ms(value: f64) -> String {
    format!("{}ms", value.round() as i64)
}

/// Format a second value with one decimal ("12.3s")
pub fn format_seconds(value: f32) -> String {
    format!("{:.1}s", value)
}
