//! Round state and core simulation types
//!
//! Everything a round mutates lives in `RoundState`, owned by the controller.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::average;
use crate::settings::Settings;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No round yet (or reset)
    Idle,
    /// Scripted 3-2-1-GO before the round starts
    Countdown,
    /// Round running, targets spawning
    Running,
    /// Round suspended in place
    Paused,
    /// Round over, summary available
    Finished,
}

/// Target variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Normal,
    /// Extra score
    Golden,
    /// Looks like a target, always counts as a miss
    Fake,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Normal => "normal",
            TargetKind::Golden => "golden",
            TargetKind::Fake => "fake",
        }
    }
}

/// A live target in the arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub kind: TargetKind,
    /// Top-left corner inside the arena (px)
    pub pos: Vec2,
    /// Diameter (px)
    pub size: f32,
    /// Virtual time the target appeared (ms)
    pub spawned_at: u64,
}

/// Score and reaction statistics for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundStats {
    pub score: u64,
    /// Current combo level, always within `[1, combo_cap]`
    pub combo: u32,
    pub max_combo: u32,
    pub hits: u32,
    pub misses: u32,
    /// Reaction time of every hit, in order (ms)
    pub reaction_times: Vec<f64>,
    pub best_reaction: Option<f64>,
}

impl Default for RoundStats {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 1,
            max_combo: 1,
            hits: 0,
            misses: 0,
            reaction_times: Vec::new(),
            best_reaction: None,
        }
    }
}

impl RoundStats {
    pub fn average_reaction(&self) -> Option<f64> {
        average(&self.reaction_times)
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            score: self.score,
            hits: self.hits,
            misses: self.misses,
            average_reaction_ms: self.average_reaction(),
            best_reaction_ms: self.best_reaction,
            max_combo: self.max_combo,
        }
    }
}

/// Final numbers shown on the result screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub score: u64,
    pub hits: u32,
    pub misses: u32,
    pub average_reaction_ms: Option<f64>,
    pub best_reaction_ms: Option<f64>,
    pub max_combo: u32,
}

/// Complete round state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    /// Settings copied in when the round was configured
    pub settings: Settings,
    pub phase: RoundPhase,
    /// Round clock in tenths of a second
    pub remaining_tenths: u32,
    /// The one live target, if any
    pub target: Option<Target>,
    pub stats: RoundStats,
    /// Next target ID
    next_id: u32,
}

impl RoundState {
    pub fn new(settings: Settings) -> Self {
        Self {
            remaining_tenths: settings.round_tenths(),
            settings,
            phase: RoundPhase::Idle,
            target: None,
            stats: RoundStats::default(),
            next_id: 1,
        }
    }

    /// Allocate a new target ID
    pub fn next_target_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Running or paused
    pub fn is_running(&self) -> bool {
        matches!(self.phase, RoundPhase::Running | RoundPhase::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.phase == RoundPhase::Paused
    }

    /// Running and not paused: the only phase in which input counts
    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    pub fn remaining_secs(&self) -> f32 {
        self.remaining_tenths as f32 / 10.0
    }

    /// Reset statistics and the clock for a fresh round
    pub fn reset_stats(&mut self) {
        self.stats = RoundStats::default();
        self.remaining_tenths = self.settings.round_tenths();
    }
}
