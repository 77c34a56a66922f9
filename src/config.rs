//! Static balance tables
//!
//! Round lengths, difficulty parameters, target sizes, scoring constants and
//! target-type weights. Nothing here changes at runtime.

use crate::settings::{Difficulty, TargetSize};
use crate::sim::TargetKind;

/// Offered round lengths (seconds)
pub const ROUND_LENGTHS: [u32; 3] = [30, 60, 90];

/// Per-difficulty parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyParams {
    pub label: &'static str,
    /// How long a target stays up before it counts as "too slow" (ms)
    pub visible_ms: u64,
    /// Spawn loop polling period (ms)
    pub spawn_gap_ms: u64,
    /// Round time removed on a miss, in tenths of a second.
    /// Easy 1.5s, normal 2s, hard 2.5s.
    pub penalty_tenths: u32,
    /// Highest reachable combo level
    pub combo_cap: u32,
}

impl DifficultyParams {
    /// Miss penalty in seconds
    pub fn penalty_secs(&self) -> f32 {
        self.penalty_tenths as f32 / 10.0
    }
}

const EASY: DifficultyParams = DifficultyParams {
    label: "Easy",
    visible_ms: 1200,
    spawn_gap_ms: 520,
    penalty_tenths: 15,
    combo_cap: 6,
};

const NORMAL: DifficultyParams = DifficultyParams {
    label: "Normal",
    visible_ms: 950,
    spawn_gap_ms: 450,
    penalty_tenths: 20,
    combo_cap: 8,
};

const HARD: DifficultyParams = DifficultyParams {
    label: "Hard",
    visible_ms: 700,
    spawn_gap_ms: 380,
    penalty_tenths: 25,
    combo_cap: 10,
};

impl Difficulty {
    pub fn params(&self) -> &'static DifficultyParams {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Normal => &NORMAL,
            Difficulty::Hard => &HARD,
        }
    }
}

impl TargetSize {
    /// Target diameter (px)
    pub fn diameter(&self) -> f32 {
        match self {
            TargetSize::Small => 44.0,
            TargetSize::Medium => 64.0,
            TargetSize::Large => 84.0,
        }
    }
}

/// Scoring constants
pub mod score {
    /// Flat score for every hit
    pub const BASE: f64 = 120.0;
    /// Speed bonus for an instant hit
    pub const BONUS_MAX: f64 = 90.0;
    /// Speed bonus floor for slow hits
    pub const BONUS_MIN: f64 = 20.0;
    /// Extra score for golden targets
    pub const GOLDEN_BONUS: f64 = 160.0;
    /// Defined alongside the others but never applied; a fake click costs
    /// time and combo, not score.
    pub const FAKE_PENALTY: f64 = 140.0;
    /// Score amplification per combo level
    pub const COMBO_STEP: f64 = 0.1;
}

/// Target-type draw weights (sum to 1.0)
pub const TARGET_WEIGHTS: [(TargetKind, f64); 3] = [
    (TargetKind::Normal, 0.75),
    (TargetKind::Golden, 0.15),
    (TargetKind::Fake, 0.1),
];

/// Tone frequencies (Hz) and lengths (s) for audio cues
pub mod tones {
    pub const HIT: f32 = 620.0;
    pub const HIT_GOLDEN: f32 = 880.0;
    pub const HIT_DURATION: f32 = 0.12;
    pub const MISS: f32 = 240.0;
    pub const MISS_DURATION: f32 = 0.15;
    /// Countdown step `i` plays `COUNTDOWN_BASE + i * COUNTDOWN_STEP`
    pub const COUNTDOWN_BASE: f32 = 440.0;
    pub const COUNTDOWN_STEP: f32 = 120.0;
    pub const COUNTDOWN_DURATION: f32 = 0.18;
}
