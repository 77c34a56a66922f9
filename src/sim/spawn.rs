//! Target spawning
//!
//! Type selection is a cumulative-probability draw over `TARGET_WEIGHTS`.
//! Placement keeps the whole target inside the arena with `ARENA_MARGIN` of
//! padding, clamping out-of-range draws instead of rerolling.

use glam::Vec2;
use rand::Rng;

use super::events::GameEvent;
use super::state::{RoundState, Target, TargetKind};
use crate::config::TARGET_WEIGHTS;
use crate::consts::{ARENA_MARGIN, DEFAULT_ARENA_HEIGHT, DEFAULT_ARENA_WIDTH};

/// The region targets may appear in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: DEFAULT_ARENA_WIDTH,
            height: DEFAULT_ARENA_HEIGHT,
        }
    }
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Largest top-left coordinate that keeps a target of `size` inside
    pub fn max_corner(&self, size: f32) -> Vec2 {
        Vec2::new(
            self.width - size - ARENA_MARGIN,
            self.height - size - ARENA_MARGIN,
        )
    }
}

/// Pick a target type for a uniform roll in [0, 1)
pub fn choose_target_kind(roll: f64) -> TargetKind {
    let mut sum = 0.0;
    for (kind, weight) in TARGET_WEIGHTS {
        sum += weight;
        if roll <= sum {
            return kind;
        }
    }
    // Rounding left the roll above the cumulative sum
    TargetKind::Normal
}

/// Map two uniform rolls to a top-left corner inside the arena
pub fn place_target(arena: &Arena, size: f32, roll_x: f32, roll_y: f32) -> Vec2 {
    let max = arena.max_corner(size);
    // max() then min() rather than clamp(): an arena narrower than the target
    // pins it to the far edge instead of panicking.
    Vec2::new(
        (roll_x * max.x).max(ARENA_MARGIN).min(max.x),
        (roll_y * max.y).max(ARENA_MARGIN).min(max.y),
    )
}

/// Create the next target and make it the active one.
///
/// The caller clears any previous target (and its expiry) first.
pub fn spawn_target<R: Rng>(
    state: &mut RoundState,
    arena: &Arena,
    rng: &mut R,
    now_ms: u64,
    events: &mut Vec<GameEvent>,
) -> Target {
    let size = state.settings.size.diameter();
    let pos = place_target(arena, size, rng.random::<f32>(), rng.random::<f32>());
    let kind = choose_target_kind(rng.random::<f64>());

    let target = Target {
        id: state.next_target_id(),
        kind,
        pos,
        size,
        spawned_at: now_ms,
    };

    log::debug!(
        "Spawned {} target #{} at ({:.0}, {:.0})",
        kind.as_str(),
        target.id,
        pos.x,
        pos.y
    );

    events.push(GameEvent::ShowTarget {
        id: target.id,
        kind,
        pos,
        size,
    });
    state.target = Some(target.clone());
    target
}
