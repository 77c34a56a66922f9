//! Round controller and virtual-time scheduler
//!
//! One driving clock replaces the four browser timers of a round:
//! - countdown step (every `COUNTDOWN_STEP_MS` before the round)
//! - round timer (every `ROUND_TICK_MS`, takes 0.1s off the clock)
//! - target expiry (one-shot, the difficulty's visible time)
//! - spawn loop (every spawn gap, spawns when no target is up)
//!
//! `advance` walks virtual time forward and fires whichever deadline is due
//! first. Deadlines due at the same millisecond fire in the order above.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::events::GameEvent;
use super::scoring::{MissReason, register_hit, register_miss};
use super::spawn::{Arena, spawn_target};
use super::state::{RoundPhase, RoundState, RoundSummary, TargetKind};
use crate::config::tones;
use crate::consts::*;
use crate::settings::Settings;

/// Timer kinds, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimerKind {
    Countdown,
    Round,
    Expiry,
    Spawn,
}

/// Pending deadlines (virtual ms). `None` means cancelled.
#[derive(Debug, Clone, Default)]
struct Timers {
    countdown: Option<u64>,
    round: Option<u64>,
    expiry: Option<u64>,
    spawn: Option<u64>,
}

impl Timers {
    /// Earliest deadline at or before `limit`
    fn next_due(&self, limit: u64) -> Option<(u64, TimerKind)> {
        [
            (self.countdown, TimerKind::Countdown),
            (self.round, TimerKind::Round),
            (self.expiry, TimerKind::Expiry),
            (self.spawn, TimerKind::Spawn),
        ]
        .into_iter()
        .filter_map(|(due, kind)| due.filter(|&d| d <= limit).map(|d| (d, kind)))
        .min()
    }

    fn cancel_all(&mut self) {
        *self = Self::default();
    }
}

/// Owns one round: its state, RNG, clock and timers
#[derive(Debug, Clone)]
pub struct RoundController {
    state: RoundState,
    arena: Arena,
    rng: Pcg32,
    /// Virtual time (ms)
    clock_ms: u64,
    timers: Timers,
    /// Next countdown label to show
    countdown_index: usize,
    /// Expiry time left on the target when the round was paused
    frozen_expiry_ms: Option<u64>,
    paused_at: Option<u64>,
    events: Vec<GameEvent>,
}

impl RoundController {
    /// Create an idle controller with the given settings and RNG seed
    pub fn new(settings: Settings, seed: u64) -> Self {
        Self {
            state: RoundState::new(settings),
            arena: Arena::default(),
            rng: Pcg32::seed_from_u64(seed),
            clock_ms: 0,
            timers: Timers::default(),
            countdown_index: 0,
            frozen_expiry_ms: None,
            paused_at: None,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> u64 {
        self.clock_ms
    }

    /// Update the arena bounds used for the next spawn
    pub fn set_arena(&mut self, arena: Arena) {
        self.arena = arena;
    }

    /// Take all queued intents
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> RoundSummary {
        self.state.stats.summary()
    }

    /// Stop everything and go back to idle with fresh stats and `settings`
    pub fn reset(&mut self, settings: Settings) {
        self.timers.cancel_all();
        self.clear_target();
        self.paused_at = None;
        self.countdown_index = 0;
        self.state.settings = settings;
        self.state.phase = RoundPhase::Idle;
        self.state.reset_stats();
        self.events.push(GameEvent::RoundReset);
        self.events.push(GameEvent::StatsChanged);
        self.events.push(GameEvent::TimeChanged(self.state.remaining_secs()));
    }

    /// Start a countdown from idle or the result screen. Ignored otherwise.
    pub fn start(&mut self, settings: Settings) -> bool {
        match self.state.phase {
            RoundPhase::Idle | RoundPhase::Finished => {
                self.restart(settings);
                true
            }
            phase => {
                log::debug!("Start ignored in {:?}", phase);
                false
            }
        }
    }

    /// Reset and begin a new countdown, whatever the current phase
    pub fn restart(&mut self, settings: Settings) {
        self.reset(settings);
        self.state.phase = RoundPhase::Countdown;
        log::info!(
            "Countdown started ({}s, {})",
            self.state.settings.round,
            self.state.settings.difficulty.as_str()
        );
        self.countdown_step();
    }

    /// Suspend a running round in place
    pub fn pause(&mut self) {
        if self.state.phase != RoundPhase::Running {
            log::debug!("Pause ignored in {:?}", self.state.phase);
            return;
        }
        self.state.phase = RoundPhase::Paused;
        self.paused_at = Some(self.clock_ms);
        if let Some(due) = self.timers.expiry.take() {
            self.frozen_expiry_ms = Some(due.saturating_sub(self.clock_ms));
        }
        self.events.push(GameEvent::Paused);
    }

    /// Continue a paused round
    pub fn resume(&mut self) {
        if self.state.phase != RoundPhase::Paused {
            log::debug!("Resume ignored in {:?}", self.state.phase);
            return;
        }
        self.state.phase = RoundPhase::Running;
        // Pause time counts toward neither the target's lifetime nor its
        // reaction time.
        if let Some(paused_at) = self.paused_at.take() {
            let paused_for = self.clock_ms - paused_at;
            if let Some(target) = self.state.target.as_mut() {
                target.spawned_at += paused_for;
            }
        }
        if let Some(left) = self.frozen_expiry_ms.take() {
            self.timers.expiry = Some(self.clock_ms + left);
        }
        self.events.push(GameEvent::Resumed);
    }

    /// Player clicked the target with `id`
    pub fn click_target(&mut self, id: u32) {
        if !self.state.is_active() {
            return;
        }
        let Some(target) = self.state.target.clone().filter(|t| t.id == id) else {
            log::debug!("Click on stale target #{}", id);
            return;
        };
        let reaction_ms = (self.clock_ms - target.spawned_at) as f64;

        if target.kind == TargetKind::Fake {
            self.miss(MissReason::FakeTarget);
            return;
        }

        register_hit(&mut self.state, &target, reaction_ms, &mut self.events);
        self.clear_target();
    }

    /// Player clicked empty arena space
    pub fn click_arena(&mut self) {
        if !self.state.is_active() {
            return;
        }
        self.miss(MissReason::EmptyClick);
    }

    /// Move virtual time forward by `dt_ms`, firing due timers in order
    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.clock_ms + dt_ms;
        while let Some((due, kind)) = self.timers.next_due(until) {
            self.clock_ms = self.clock_ms.max(due);
            self.fire(kind);
        }
        self.clock_ms = until;
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Countdown => {
                self.timers.countdown = None;
                self.countdown_step();
            }
            TimerKind::Round => {
                self.timers.round = Some(self.clock_ms + ROUND_TICK_MS);
                self.round_tick();
            }
            TimerKind::Expiry => {
                self.timers.expiry = None;
                if self.state.is_active() && self.state.target.is_some() {
                    self.miss(MissReason::TooSlow);
                }
            }
            TimerKind::Spawn => {
                let gap = self.state.settings.difficulty.params().spawn_gap_ms;
                self.timers.spawn = Some(self.clock_ms + gap);
                if self.state.is_active() && self.state.target.is_none() {
                    self.spawn();
                }
            }
        }
    }

    fn countdown_step(&mut self) {
        if self.state.phase != RoundPhase::Countdown {
            return;
        }
        match COUNTDOWN_STEPS.get(self.countdown_index) {
            Some(&label) => {
                self.events.push(GameEvent::CountdownStep(label));
                self.events.push(GameEvent::PlayTone {
                    frequency: tones::COUNTDOWN_BASE
                        + self.countdown_index as f32 * tones::COUNTDOWN_STEP,
                    duration: tones::COUNTDOWN_DURATION,
                });
                self.countdown_index += 1;
                self.timers.countdown = Some(self.clock_ms + COUNTDOWN_STEP_MS);
            }
            None => self.start_round(),
        }
    }

    fn start_round(&mut self) {
        self.timers.cancel_all();
        self.clear_target();
        self.state.phase = RoundPhase::Running;
        self.state.remaining_tenths = self.state.settings.round_tenths();

        let gap = self.state.settings.difficulty.params().spawn_gap_ms;
        self.timers.round = Some(self.clock_ms + ROUND_TICK_MS);
        self.timers.spawn = Some(self.clock_ms + gap);

        log::info!("Round started at {}ms", self.clock_ms);
        self.events.push(GameEvent::RoundStarted);
        self.events.push(GameEvent::TimeChanged(self.state.remaining_secs()));
        self.events.push(GameEvent::StatsChanged);
    }

    fn round_tick(&mut self) {
        if !self.state.is_active() {
            return;
        }
        self.state.remaining_tenths = self
            .state
            .remaining_tenths
            .saturating_sub(ROUND_TICK_TENTHS);
        self.events
            .push(GameEvent::TimeChanged(self.state.remaining_secs()));
        if self.state.remaining_tenths == 0 {
            self.finish();
        }
    }

    fn spawn(&mut self) {
        self.clear_target();
        let visible = self.state.settings.difficulty.params().visible_ms;
        spawn_target(
            &mut self.state,
            &self.arena,
            &mut self.rng,
            self.clock_ms,
            &mut self.events,
        );
        self.timers.expiry = Some(self.clock_ms + visible);
    }

    fn miss(&mut self, reason: MissReason) {
        register_miss(&mut self.state, reason, &mut self.events);
        self.clear_target();
        if self.state.remaining_tenths == 0 {
            self.finish();
        }
    }

    /// Remove the live target and cancel its expiry. Safe to call twice.
    fn clear_target(&mut self) {
        if let Some(target) = self.state.target.take() {
            self.events.push(GameEvent::RemoveTarget { id: target.id });
        }
        self.timers.expiry = None;
        self.frozen_expiry_ms = None;
    }

    fn finish(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.timers.cancel_all();
        self.clear_target();
        self.paused_at = None;
        self.state.phase = RoundPhase::Finished;

        let summary = self.state.stats.summary();
        log::info!(
            "Round finished: score {}, {} hits, {} misses",
            summary.score,
            summary.hits,
            summary.misses
        );
        self.events.push(GameEvent::RoundFinished(summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Difficulty, Switch};
    use proptest::prelude::*;

    /// Countdown length: four labels plus the final gap
    const COUNTDOWN_TOTAL_MS: u64 = COUNTDOWN_STEP_MS * 4;

    fn running(settings: Settings, seed: u64) -> RoundController {
        let mut round = RoundController::new(settings.clone(), seed);
        assert!(round.start(settings));
        round.advance(COUNTDOWN_TOTAL_MS);
        assert_eq!(round.phase(), RoundPhase::Running);
        round.drain_events();
        round
    }

    fn normal_60() -> Settings {
        Settings {
            round: 60,
            difficulty: Difficulty::Normal,
            ..Default::default()
        }
    }

    /// Advance until the next target is up, then force its kind
    fn next_target(round: &mut RoundController, kind: TargetKind) -> u32 {
        for _ in 0..10_000 {
            if let Some(target) = round.state.target.as_mut() {
                target.kind = kind;
                return target.id;
            }
            round.advance(1);
        }
        panic!("no target appeared");
    }

    fn count_finished(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::RoundFinished(_)))
            .count()
    }

    #[test]
    fn test_countdown_sequence() {
        let mut round = RoundController::new(normal_60(), 1);
        round.start(normal_60());
        assert_eq!(round.phase(), RoundPhase::Countdown);

        let mut labels = Vec::new();
        for _ in 0..4 {
            for event in round.drain_events() {
                if let GameEvent::CountdownStep(label) = event {
                    labels.push(label);
                }
            }
            round.advance(COUNTDOWN_STEP_MS);
        }
        assert_eq!(labels, vec!["3", "2", "1", "GO!"]);
        assert_eq!(round.phase(), RoundPhase::Running);
        assert!(round.drain_events().contains(&GameEvent::RoundStarted));
    }

    #[test]
    fn test_start_ignored_while_counting_down_or_running() {
        let mut round = RoundController::new(normal_60(), 1);
        assert!(round.start(normal_60()));
        assert!(!round.start(normal_60()));
        round.advance(COUNTDOWN_TOTAL_MS);
        assert!(!round.start(normal_60()));
        assert_eq!(round.phase(), RoundPhase::Running);
    }

    #[test]
    fn test_first_spawn_after_one_gap() {
        let mut round = running(normal_60(), 3);
        round.advance(449);
        assert!(round.state().target.is_none());
        round.advance(1);
        assert!(round.state().target.is_some());
    }

    #[test]
    fn test_timer_counts_down_in_tenths() {
        let mut round = running(normal_60(), 3);
        round.advance(1000);
        // Targets expire unclicked in the meantime; add back their penalty
        let penalty = round.state().stats.misses * 20;
        assert_eq!(round.state().remaining_tenths + penalty, 590);
    }

    #[test]
    fn test_hit_scenario_normal_200ms() {
        let mut round = running(normal_60(), 11);
        let id = next_target(&mut round, TargetKind::Normal);
        let score_before = round.state().stats.score;
        let combo_before = round.state().stats.combo;
        assert_eq!(combo_before, 1);

        round.advance(200);
        round.click_target(id);

        assert_eq!(round.state().stats.score - score_before, 228);
        assert_eq!(round.state().stats.combo, 2);
        assert_eq!(round.state().stats.hits, 1);
        assert!(round.state().target.is_none());
        assert_eq!(round.state().stats.reaction_times, vec![200.0]);
    }

    #[test]
    fn test_expiry_scenario_costs_penalty() {
        let mut round = running(normal_60(), 5);
        round.advance(450);
        let target = round.state().target.clone().unwrap();
        let at_spawn = round.state().remaining_tenths;
        round.drain_events();

        // Expiry fires at spawn + 950ms; ticks fire 9 times before then and
        // the tick at the same millisecond fires first.
        round.advance(950);

        assert_eq!(round.state().stats.misses, 1);
        assert_eq!(round.state().stats.combo, 1);
        assert_eq!(at_spawn - round.state().remaining_tenths, 10 + 20);
        let events = round.drain_events();
        assert!(events.contains(&GameEvent::RemoveTarget { id: target.id }));
        assert!(events.contains(&GameEvent::Toast("Too slow: combo reset".into())));
    }

    #[test]
    fn test_fake_target_is_always_a_miss() {
        let mut round = running(normal_60(), 21);
        let id = next_target(&mut round, TargetKind::Fake);
        round.click_target(id);
        assert_eq!(round.state().stats.hits, 0);
        assert_eq!(round.state().stats.misses, 1);
        assert_eq!(round.state().stats.combo, 1);
        assert!(round.state().target.is_none());
    }

    #[test]
    fn test_arena_click_misses_and_clears_target() {
        let mut round = running(normal_60(), 2);
        round.advance(450);
        assert!(round.state().target.is_some());
        round.click_arena();
        assert_eq!(round.state().stats.misses, 1);
        assert!(round.state().target.is_none());
    }

    #[test]
    fn test_stale_click_ignored() {
        let mut round = running(normal_60(), 2);
        round.advance(450);
        let id = round.state().target.as_ref().unwrap().id;
        round.click_target(id + 100);
        assert_eq!(round.state().stats.hits, 0);
        assert_eq!(round.state().stats.misses, 0);
        assert!(round.state().target.is_some());
    }

    #[test]
    fn test_pause_freezes_clock_spawns_and_expiry() {
        let mut round = running(normal_60(), 8);
        round.advance(450);
        let target = round.state().target.clone().unwrap();
        let remaining = round.state().remaining_tenths;

        round.pause();
        round.advance(10_000);
        assert_eq!(round.phase(), RoundPhase::Paused);
        assert_eq!(round.state().remaining_tenths, remaining);
        assert_eq!(round.state().target.as_ref().map(|t| t.id), Some(target.id));
        assert_eq!(round.state().stats.misses, 0);

        // Clicks while paused do nothing
        round.click_target(target.id);
        round.click_arena();
        assert_eq!(round.state().stats.hits, 0);
        assert_eq!(round.state().stats.misses, 0);

        // The target keeps its remaining 950ms of visibility after resume
        round.resume();
        round.advance(949);
        assert_eq!(round.state().stats.misses, 0);
        round.advance(1);
        assert_eq!(round.state().stats.misses, 1);
    }

    #[test]
    fn test_reaction_excludes_pause_time() {
        let mut round = running(normal_60(), 11);
        let id = next_target(&mut round, TargetKind::Normal);
        round.advance(100);
        round.pause();
        round.advance(5_000);
        round.resume();
        round.advance(100);
        round.click_target(id);
        assert_eq!(round.state().stats.reaction_times, vec![200.0]);
    }

    #[test]
    fn test_pause_resume_ignored_in_wrong_phase() {
        let mut round = RoundController::new(normal_60(), 1);
        round.pause();
        assert_eq!(round.phase(), RoundPhase::Idle);
        round.resume();
        assert_eq!(round.phase(), RoundPhase::Idle);
        assert!(round.drain_events().is_empty());
    }

    #[test]
    fn test_round_ends_exactly_once() {
        let settings = Settings {
            round: 30,
            ..normal_60()
        };
        let mut round = running(settings, 4);
        let mut events = Vec::new();
        for _ in 0..400 {
            round.advance(100);
            events.extend(round.drain_events());
        }
        assert_eq!(round.phase(), RoundPhase::Finished);
        assert_eq!(count_finished(&events), 1);
        assert_eq!(round.state().remaining_tenths, 0);
        assert!(round.state().target.is_none());

        let stats = round.state().stats.clone();
        round.click_arena();
        round.advance(10_000);
        assert_eq!(round.state().stats, stats);
        assert!(round.drain_events().is_empty());
    }

    #[test]
    fn test_penalty_to_zero_ends_round_immediately() {
        let mut round = running(normal_60(), 4);
        round.advance(450);
        let id = round.state().target.as_ref().map(|t| t.id).unwrap();
        round.state.remaining_tenths = 15;
        round.click_arena();
        assert_eq!(round.state().remaining_tenths, 0);
        assert_eq!(round.phase(), RoundPhase::Finished);
        assert_eq!(count_finished(&round.drain_events()), 1);

        // Nothing scores after the clock ran out
        let stats = round.state().stats.clone();
        round.click_target(id);
        round.advance(1_000);
        assert_eq!(round.state().stats, stats);
        assert_eq!(count_finished(&round.drain_events()), 0);
    }

    #[test]
    fn test_restart_from_running_resets_everything() {
        let mut round = running(normal_60(), 9);
        round.advance(450);
        round.click_arena();
        assert_eq!(round.state().stats.misses, 1);

        round.restart(normal_60());
        assert_eq!(round.phase(), RoundPhase::Countdown);
        assert_eq!(round.state().stats.misses, 0);
        assert!(round.state().target.is_none());

        // No stale round tick or spawn during the new countdown
        let remaining = round.state().remaining_tenths;
        round.advance(COUNTDOWN_TOTAL_MS - 1);
        assert_eq!(round.state().remaining_tenths, remaining);
        assert!(round.state().target.is_none());
    }

    #[test]
    fn test_zen_round_scores_nothing() {
        let settings = Settings {
            zen: Switch::On,
            ..normal_60()
        };
        let mut round = running(settings, 13);
        for _ in 0..20 {
            let id = next_target(&mut round, TargetKind::Golden);
            round.advance(50);
            round.click_target(id);
        }
        assert_eq!(round.state().stats.score, 0);
        assert_eq!(round.state().stats.hits, 20);
    }

    #[test]
    fn test_same_seed_same_targets() {
        let mut a = running(normal_60(), 99);
        let mut b = running(normal_60(), 99);
        for _ in 0..50 {
            a.advance(173);
            b.advance(173);
            assert_eq!(a.state().target, b.state().target);
        }
    }

    #[derive(Debug, Clone)]
    enum Action {
        Advance(u64),
        ClickTarget,
        ClickArena,
        Pause,
        Resume,
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            4 => (1u64..600).prop_map(Action::Advance),
            3 => Just(Action::ClickTarget),
            1 => Just(Action::ClickArena),
            1 => Just(Action::Pause),
            1 => Just(Action::Resume),
        ]
    }

    proptest! {
        #[test]
        fn prop_round_invariants(
            seed in any::<u64>(),
            difficulty in prop::sample::select(Difficulty::ALL.to_vec()),
            actions in prop::collection::vec(action(), 1..300),
        ) {
            let settings = Settings { round: 30, difficulty, ..Default::default() };
            let cap = difficulty.params().combo_cap;
            let mut round = running(settings, seed);
            let mut finished = 0;

            for action in actions {
                let before = round.state().clone();
                match action {
                    Action::Advance(ms) => round.advance(ms),
                    Action::ClickTarget => {
                        if let Some(id) = round.state().target.as_ref().map(|t| t.id) {
                            round.click_target(id);
                        }
                    }
                    Action::ClickArena => round.click_arena(),
                    Action::Pause => round.pause(),
                    Action::Resume => round.resume(),
                }
                let after = round.state();

                prop_assert!(after.stats.combo >= 1 && after.stats.combo <= cap);
                prop_assert!(after.remaining_tenths <= before.remaining_tenths);
                if before.is_paused() && after.is_paused() {
                    prop_assert_eq!(after.remaining_tenths, before.remaining_tenths);
                }
                if after.stats.misses > before.stats.misses {
                    prop_assert_eq!(after.stats.combo, 1);
                }
                if before.phase == RoundPhase::Finished {
                    prop_assert_eq!(&after.stats, &before.stats);
                }
                finished += count_finished(&round.drain_events());
            }
            prop_assert!(finished <= 1);
        }
    }
}
