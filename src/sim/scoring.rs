//! Hit and miss scoring
//!
//! A hit is worth `BASE + speed bonus (+ GOLDEN_BONUS)`, amplified by 10% per
//! combo level. Any miss resets the combo and costs round time.

use super::events::GameEvent;
use super::state::{RoundState, Target, TargetKind};
use crate::config::{score, tones};

/// Why a miss was registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// Clicked empty arena space
    EmptyClick,
    /// Clicked a fake target
    FakeTarget,
    /// Target expired before it was clicked
    TooSlow,
}

impl MissReason {
    pub fn label(&self) -> &'static str {
        match self {
            MissReason::EmptyClick => "Missed",
            MissReason::FakeTarget => "Fake target",
            MissReason::TooSlow => "Too slow",
        }
    }
}

/// Speed bonus for a reaction time: 90 at 0ms, falling 1 per 10ms, floored at 20
pub fn speed_bonus(reaction_ms: f64) -> f64 {
    (score::BONUS_MAX - reaction_ms / 10.0).clamp(score::BONUS_MIN, score::BONUS_MAX)
}

/// Unamplified score for a hit
pub fn hit_delta(kind: TargetKind, reaction_ms: f64, zen: bool) -> f64 {
    if zen {
        return 0.0;
    }
    let mut delta = score::BASE + speed_bonus(reaction_ms);
    if kind == TargetKind::Golden {
        delta += score::GOLDEN_BONUS;
    }
    delta
}

/// Score actually added for `delta` at `combo`
pub fn combo_score(delta: f64, combo: u32) -> u64 {
    (delta * combo as f64 * score::COMBO_STEP + delta).round() as u64
}

/// Apply a hit on a non-fake target. Returns the score added.
pub fn register_hit(
    state: &mut RoundState,
    target: &Target,
    reaction_ms: f64,
    events: &mut Vec<GameEvent>,
) -> u64 {
    debug_assert!(target.kind != TargetKind::Fake);
    let cap = state.settings.difficulty.params().combo_cap;
    let stats = &mut state.stats;

    stats.hits += 1;
    stats.combo = (stats.combo + 1).min(cap);
    stats.max_combo = stats.max_combo.max(stats.combo);
    stats.reaction_times.push(reaction_ms);
    stats.best_reaction = Some(match stats.best_reaction {
        Some(best) => best.min(reaction_ms),
        None => reaction_ms,
    });

    let delta = hit_delta(target.kind, reaction_ms, state.settings.zen());
    let gained = combo_score(delta, stats.combo);
    stats.score += gained;

    let frequency = if target.kind == TargetKind::Golden {
        tones::HIT_GOLDEN
    } else {
        tones::HIT
    };
    events.push(GameEvent::PlayTone {
        frequency,
        duration: tones::HIT_DURATION,
    });
    events.push(GameEvent::HitBurst {
        pos: target.pos,
        size: target.size,
    });
    events.push(GameEvent::StatsChanged);

    gained
}

/// Apply a miss: combo back to 1, round time penalty, miss cues.
///
/// Does not end the round even if the clock hits zero; the caller does that.
pub fn register_miss(state: &mut RoundState, reason: MissReason, events: &mut Vec<GameEvent>) {
    let penalty = state.settings.difficulty.params().penalty_tenths;

    state.stats.misses += 1;
    state.stats.combo = 1;
    state.remaining_tenths = state.remaining_tenths.saturating_sub(penalty);

    events.push(GameEvent::StatsChanged);
    events.push(GameEvent::TimeChanged(state.remaining_secs()));
    events.push(GameEvent::ScreenShake);
    events.push(GameEvent::PlayTone {
        frequency: tones::MISS,
        duration: tones::MISS_DURATION,
    });
    events.push(GameEvent::Toast(format!("{}: combo reset", reason.label())));
}
