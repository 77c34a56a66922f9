//! Intents emitted by the simulation
//!
//! The core never touches the DOM or audio directly. It queues these and the
//! presentation layer drains them after every input or `advance` call.

use glam::Vec2;

use super::state::{RoundSummary, TargetKind};

/// Something the presentation layer should show or play
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Countdown label to display ("3", "2", "1", "GO!")
    CountdownStep(&'static str),
    /// Countdown finished, round is now running
    RoundStarted,
    /// A target appeared
    ShowTarget {
        id: u32,
        kind: TargetKind,
        pos: Vec2,
        size: f32,
    },
    /// A target left the arena (hit, miss or cleanup)
    RemoveTarget { id: u32 },
    /// Burst animation where a target was hit
    HitBurst { pos: Vec2, size: f32 },
    /// Short sine tone
    PlayTone { frequency: f32, duration: f32 },
    /// Arena shake after a miss
    ScreenShake,
    /// Transient message
    Toast(String),
    /// Round clock changed (seconds)
    TimeChanged(f32),
    /// Score/combo/hit/miss counters changed
    StatsChanged,
    Paused,
    Resumed,
    /// Round reset to idle (settings change, back to menu)
    RoundReset,
    /// Round over
    RoundFinished(RoundSummary),
    /// Highscore recorded at this 1-indexed rank
    HighScoreSaved { rank: usize },
}
