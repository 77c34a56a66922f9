//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual time only (the caller feeds `advance`)
//! - Seeded RNG only
//! - At most one live target
//! - No rendering, audio or platform dependencies (intents only)

pub mod events;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;

pub use events::GameEvent;
pub use scoring::{MissReason, combo_score, hit_delta, register_hit, register_miss, speed_bonus};
pub use spawn::{Arena, choose_target_kind, place_target, spawn_target};
pub use state::{RoundPhase, RoundState, RoundStats, RoundSummary, Target, TargetKind};
pub use tick::RoundController;
