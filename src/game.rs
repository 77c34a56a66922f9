//! Application shell
//!
//! Ties a `RoundController` to the player's settings, the leaderboard and the
//! store they live in. The presentation layer only talks to `Game`.

use crate::highscores::{HighScoreEntry, HighScores};
use crate::persistence::KeyValueStore;
use crate::platform::{InputAction, today};
use crate::settings::Settings;
use crate::sim::{Arena, GameEvent, RoundController, RoundPhase, RoundSummary};

pub struct Game<S: KeyValueStore> {
    store: S,
    settings: Settings,
    highscores: HighScores,
    round: RoundController,
    /// Rank of the last recorded run
    last_rank: Option<usize>,
    events: Vec<GameEvent>,
}

impl<S: KeyValueStore> Game<S> {
    /// Load settings and highscores from `store`
    pub fn new(store: S, seed: u64) -> Self {
        let settings = Settings::load(&store);
        let highscores = HighScores::load(&store);
        log::info!("Game initialized with seed: {}", seed);
        Self {
            round: RoundController::new(settings.clone(), seed),
            store,
            settings,
            highscores,
            last_rank: None,
            events: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn highscores(&self) -> &HighScores {
        &self.highscores
    }

    pub fn round(&self) -> &RoundController {
        &self.round
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    pub fn set_arena(&mut self, width: f32, height: f32) {
        self.round.set_arena(Arena::new(width, height));
    }

    /// Move time forward (ms)
    pub fn advance(&mut self, dt_ms: u64) {
        self.round.advance(dt_ms);
        self.pump();
    }

    /// Apply a player action
    pub fn handle_input(&mut self, action: InputAction) {
        match action {
            InputAction::PauseOrStart => match self.round.phase() {
                RoundPhase::Running => self.round.pause(),
                RoundPhase::Paused => self.round.resume(),
                RoundPhase::Idle | RoundPhase::Finished => self.start(),
                RoundPhase::Countdown => {}
            },
            InputAction::Restart => self.restart(),
            InputAction::Start => self.restart(),
            InputAction::Pause => self.round.pause(),
            InputAction::Resume => self.round.resume(),
            InputAction::Hidden => {
                if self.round.phase() == RoundPhase::Running {
                    log::info!("Auto-paused (page hidden)");
                    self.round.pause();
                }
            }
            InputAction::ClickTarget(id) => self.round.click_target(id),
            InputAction::ClickArena => self.round.click_arena(),
        }
        self.pump();
    }

    /// Start a round from idle or the result screen
    pub fn start(&mut self) {
        self.round.start(self.settings.clone());
        self.pump();
    }

    /// Abandon whatever is happening and count down a fresh round
    pub fn restart(&mut self) {
        self.last_rank = None;
        self.round.restart(self.settings.clone());
        self.pump();
    }

    /// Stop the round and return to idle (back to menu)
    pub fn abort(&mut self) {
        self.round.reset(self.settings.clone());
        self.pump();
    }

    /// Replace settings, persist them and reset the round
    pub fn apply_settings(&mut self, mut settings: Settings) {
        if !settings.has_known_round() {
            log::warn!(
                "Round length {}s not offered, keeping {}s",
                settings.round,
                self.settings.round
            );
            settings.round = self.settings.round;
        }
        self.settings = settings;
        self.save_settings();
        self.round.reset(self.settings.clone());
        self.events.push(GameEvent::Toast("Settings saved".to_string()));
        self.pump();
    }

    pub fn toggle_theme(&mut self) {
        self.settings.theme = self.settings.theme.toggled();
        self.save_settings();
    }

    pub fn toggle_sound(&mut self) {
        self.settings.sound = self.settings.sound.toggled();
        self.save_settings();
    }

    /// Take all queued intents
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(&mut self.store) {
            log::warn!("Failed to save settings: {}", e);
        }
    }

    /// Move round intents into our queue, recording finished runs
    fn pump(&mut self) {
        for event in self.round.drain_events() {
            let finished = match &event {
                GameEvent::RoundFinished(summary) => Some(summary.clone()),
                _ => None,
            };
            self.events.push(event);
            if let Some(summary) = finished {
                self.record(&summary);
            }
        }
    }

    fn record(&mut self, summary: &RoundSummary) {
        // The round's own copy: settings may not change mid-round
        let settings = self.round.settings();
        if settings.zen() {
            log::info!("Zen round, no highscore recorded");
            return;
        }
        let entry = HighScoreEntry {
            score: summary.score,
            date: today(),
            round: settings.round,
            difficulty: settings.difficulty,
            size: settings.size,
        };
        self.last_rank = self.highscores.add(entry);
        if let Some(rank) = self.last_rank {
            log::info!("High score #{}: {}", rank, summary.score);
            self.events.push(GameEvent::HighScoreSaved { rank });
        }
        // Best-effort write
        if let Err(e) = self.highscores.save(&mut self.store) {
            log::warn!("Failed to save high scores: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::COUNTDOWN_STEP_MS;
    use crate::persistence::MemoryStore;
    use crate::settings::{Difficulty, Switch, Theme};

    fn play_round(game: &mut Game<MemoryStore>) -> Vec<GameEvent> {
        game.handle_input(InputAction::PauseOrStart);
        let mut events = game.drain_events();
        // Countdown plus a 30s round that loses time to unclicked targets
        for _ in 0..(COUNTDOWN_STEP_MS * 4 + 31_000) / 100 {
            game.advance(100);
            events.extend(game.drain_events());
        }
        events
    }

    fn short_settings() -> Settings {
        Settings {
            round: 30,
            difficulty: Difficulty::Easy,
            ..Default::default()
        }
    }

    #[test]
    fn test_finished_round_is_recorded() {
        let mut game = Game::new(MemoryStore::new(), 1);
        game.apply_settings(short_settings());
        let events = play_round(&mut game);

        assert_eq!(game.round().phase(), RoundPhase::Finished);
        assert!(events.iter().any(|e| matches!(e, GameEvent::RoundFinished(_))));
        assert_eq!(game.highscores().entries.len(), 1);
        assert_eq!(game.last_rank(), Some(1));
        assert!(events.contains(&GameEvent::HighScoreSaved { rank: 1 }));

        let stored = HighScores::load(game.store());
        assert_eq!(stored.entries.len(), 1);
        assert_eq!(stored.entries[0].round, 30);
        assert_eq!(stored.entries[0].difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_zen_round_is_not_recorded() {
        let mut game = Game::new(MemoryStore::new(), 2);
        game.apply_settings(Settings {
            zen: Switch::On,
            ..short_settings()
        });
        play_round(&mut game);

        assert_eq!(game.round().phase(), RoundPhase::Finished);
        assert_eq!(game.round().state().stats.score, 0);
        assert!(game.highscores().is_empty());
        assert!(HighScores::load(game.store()).is_empty());
    }

    #[test]
    fn test_settings_persist_across_games() {
        let mut game = Game::new(MemoryStore::new(), 3);
        game.apply_settings(Settings {
            difficulty: Difficulty::Hard,
            ..Default::default()
        });
        game.toggle_theme();
        game.toggle_sound();

        let store = game.store().clone();
        let game = Game::new(store, 4);
        assert_eq!(game.settings().difficulty, Difficulty::Hard);
        assert_eq!(game.settings().theme, Theme::Light);
        assert!(!game.settings().sound_enabled());
    }

    #[test]
    fn test_corrupt_highscores_start_empty() {
        let mut store = MemoryStore::new();
        store.set_item(HighScores::STORAGE_KEY, "garbage").unwrap();
        let game = Game::new(store, 5);
        assert!(game.highscores().is_empty());
    }

    #[test]
    fn test_stored_huge_round_length_loads_defaults() {
        let mut store = MemoryStore::new();
        store
            .set_item(
                Settings::STORAGE_KEY,
                r#"{"round":500000000,"difficulty":"normal","size":"medium","sound":"on","theme":"dark","debug":"off","zen":"off"}"#,
            )
            .unwrap();
        let mut game = Game::new(store, 1);
        assert_eq!(game.settings(), &Settings::default());
        assert_eq!(game.round().state().remaining_tenths, 600);
        game.start();
        game.advance(COUNTDOWN_STEP_MS * 4);
        assert_eq!(game.round().phase(), RoundPhase::Running);
    }

    #[test]
    fn test_apply_settings_rejects_unknown_round_length() {
        let mut game = Game::new(MemoryStore::new(), 10);
        game.apply_settings(Settings {
            round: 45,
            difficulty: Difficulty::Hard,
            ..Default::default()
        });
        assert_eq!(game.settings().round, 60);
        assert_eq!(game.settings().difficulty, Difficulty::Hard);
        assert_eq!(game.round().state().remaining_tenths, 600);
        assert_eq!(Settings::load(game.store()).round, 60);
    }

    #[test]
    fn test_space_cycles_start_pause_resume() {
        let mut game = Game::new(MemoryStore::new(), 6);
        game.handle_input(InputAction::PauseOrStart);
        assert_eq!(game.round().phase(), RoundPhase::Countdown);

        // Space during the countdown is ignored
        game.handle_input(InputAction::PauseOrStart);
        assert_eq!(game.round().phase(), RoundPhase::Countdown);

        game.advance(COUNTDOWN_STEP_MS * 4);
        assert_eq!(game.round().phase(), RoundPhase::Running);
        game.handle_input(InputAction::PauseOrStart);
        assert_eq!(game.round().phase(), RoundPhase::Paused);
        game.handle_input(InputAction::PauseOrStart);
        assert_eq!(game.round().phase(), RoundPhase::Running);
    }

    #[test]
    fn test_hidden_page_pauses_only_running_round() {
        let mut game = Game::new(MemoryStore::new(), 7);
        game.handle_input(InputAction::Hidden);
        assert_eq!(game.round().phase(), RoundPhase::Idle);

        game.start();
        game.advance(COUNTDOWN_STEP_MS * 4);
        game.handle_input(InputAction::Hidden);
        assert_eq!(game.round().phase(), RoundPhase::Paused);

        // Escape while paused stays paused
        game.handle_input(InputAction::Pause);
        assert_eq!(game.round().phase(), RoundPhase::Paused);
    }

    #[test]
    fn test_restart_key_works_mid_round() {
        let mut game = Game::new(MemoryStore::new(), 8);
        game.start();
        game.advance(COUNTDOWN_STEP_MS * 4 + 2_000);
        game.handle_input(InputAction::Restart);
        assert_eq!(game.round().phase(), RoundPhase::Countdown);
        assert_eq!(game.round().state().stats.misses, 0);
        assert!(game.drain_events().contains(&GameEvent::CountdownStep("3")));
    }

    #[test]
    fn test_apply_settings_resets_round() {
        let mut game = Game::new(MemoryStore::new(), 9);
        game.start();
        game.advance(COUNTDOWN_STEP_MS * 4 + 500);
        game.apply_settings(short_settings());
        assert_eq!(game.round().phase(), RoundPhase::Idle);
        assert_eq!(game.round().state().remaining_tenths, 300);
        assert!(
            game.drain_events()
                .contains(&GameEvent::Toast("Settings saved".to_string()))
        );
    }
}
