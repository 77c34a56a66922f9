//! Reflex Raid entry point
//!
//! Handles platform-specific initialization and runs the game loop. On the web
//! the DOM is the presentation layer; natively a scripted player runs one
//! headless round and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlSelectElement, KeyboardEvent, MouseEvent};

    use reflex_raid::audio::AudioManager;
    use reflex_raid::persistence::LocalStorage;
    use reflex_raid::platform::InputAction;
    use reflex_raid::sim::{GameEvent, RoundSummary};
    use reflex_raid::{
        Difficulty, Game, Settings, Switch, TargetSize, Theme, consts, format_ms, format_seconds,
    };

    const SCREENS: [&str; 5] = [
        "startScreen",
        "gameScreen",
        "settingsPanel",
        "highscorePanel",
        "resultScreen",
    ];

    /// Game instance plus everything the page needs to present it
    struct App {
        game: Game<LocalStorage>,
        audio: AudioManager,
        document: Document,
        last_time: f64,
        /// Sub-millisecond remainder carried between frames
        carry_ms: f64,
    }

    impl App {
        fn new(seed: u64, document: Document) -> Self {
            let game = Game::new(LocalStorage::new(), seed);
            let mut audio = AudioManager::new();
            audio.set_muted(!game.settings().sound_enabled());
            Self {
                game,
                audio,
                document,
                last_time: 0.0,
                carry_ms: 0.0,
            }
        }

        fn el(&self, id: &str) -> Option<Element> {
            self.document.get_element_by_id(id)
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.el(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.el(id) {
                if hidden {
                    let _ = el.set_attribute("hidden", "");
                } else {
                    let _ = el.remove_attribute("hidden");
                }
            }
        }

        fn set_screen(&self, screen: &str) {
            for id in SCREENS {
                self.set_hidden(id, id != screen);
            }
        }

        /// Remove a class after `ms` milliseconds
        fn remove_class_later(&self, el: Element, class: &'static str, ms: u64) {
            let closure = Closure::once(move || {
                let _ = el.class_list().remove_1(class);
            });
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    ms as i32,
                );
            }
            closure.forget();
        }

        /// Run simulation time forward
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).min(250.0)
            } else {
                0.0
            };
            self.last_time = time;

            self.carry_ms += dt;
            let whole = self.carry_ms.floor();
            self.carry_ms -= whole;
            if whole > 0.0 {
                self.game.advance(whole as u64);
            }
            self.flush();
        }

        fn input(&mut self, action: InputAction) {
            if matches!(
                action,
                InputAction::Start | InputAction::Restart | InputAction::PauseOrStart
            ) {
                self.set_screen("gameScreen");
            }
            self.game.handle_input(action);
            self.flush();
        }

        /// Apply queued intents to the page
        fn flush(&mut self) {
            for event in self.game.drain_events() {
                self.present(event);
            }
        }

        fn present(&mut self, event: GameEvent) {
            match event {
                GameEvent::CountdownStep(label) => {
                    if let Some(el) = self.el("countdown") {
                        el.set_text_content(Some(label));
                        let _ = el.set_attribute("aria-hidden", "false");
                        // Re-adding the class on the next frame restarts the animation
                        let _ = el.class_list().remove_1("active");
                        let closure = Closure::once(move |_time: f64| {
                            let _ = el.class_list().add_1("active");
                        });
                        if let Some(window) = web_sys::window() {
                            let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
                        }
                        closure.forget();
                    }
                }
                GameEvent::RoundStarted => {
                    if let Some(el) = self.el("countdown") {
                        el.set_text_content(Some(""));
                        let _ = el.set_attribute("aria-hidden", "true");
                        let _ = el.class_list().remove_1("active");
                    }
                }
                GameEvent::ShowTarget { id, kind, pos, size } => {
                    let (Some(arena), Ok(target)) =
                        (self.el("arena"), self.document.create_element("button"))
                    else {
                        return;
                    };
                    let _ = target.set_attribute("class", &format!("target {}", kind.as_str()));
                    let _ = target.set_attribute("data-id", &id.to_string());
                    let _ = target.set_attribute("aria-label", "Click the target");
                    let _ = target.set_attribute(
                        "style",
                        &format!(
                            "width:{size}px;height:{size}px;left:{}px;top:{}px",
                            pos.x, pos.y
                        ),
                    );
                    let _ = arena.append_child(&target);
                }
                GameEvent::RemoveTarget { id } => {
                    let selector = format!("#arena [data-id=\"{}\"]", id);
                    if let Ok(Some(el)) = self.document.query_selector(&selector) {
                        el.remove();
                    }
                }
                GameEvent::HitBurst { pos, size } => {
                    let (Some(arena), Ok(burst)) =
                        (self.el("arena"), self.document.create_element("div"))
                    else {
                        return;
                    };
                    let _ = burst.set_attribute("class", "hit-burst");
                    let _ = burst.set_attribute(
                        "style",
                        &format!(
                            "width:{size}px;height:{size}px;left:{}px;top:{}px",
                            pos.x, pos.y
                        ),
                    );
                    let _ = arena.append_child(&burst);
                    let closure = Closure::once(move || burst.remove());
                    if let Some(window) = web_sys::window() {
                        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                            closure.as_ref().unchecked_ref(),
                            350,
                        );
                    }
                    closure.forget();
                }
                GameEvent::PlayTone {
                    frequency,
                    duration,
                } => self.audio.play_tone(frequency, duration),
                GameEvent::ScreenShake => {
                    if let Some(arena) = self.el("arena") {
                        let _ = arena.class_list().add_1("screen-shake");
                        self.remove_class_later(arena, "screen-shake", consts::SHAKE_MS);
                    }
                }
                GameEvent::Toast(message) => self.toast(&message),
                GameEvent::TimeChanged(secs) => self.set_text("timeText", &format_seconds(secs)),
                GameEvent::StatsChanged => self.update_hud(),
                GameEvent::Paused => self.set_hidden("pauseOverlay", false),
                GameEvent::Resumed => self.set_hidden("pauseOverlay", true),
                GameEvent::RoundReset => {
                    self.set_hidden("pauseOverlay", true);
                    self.update_hud();
                }
                GameEvent::RoundFinished(summary) => {
                    self.set_hidden("pauseOverlay", true);
                    self.show_results(&summary);
                    self.set_screen("resultScreen");
                }
                GameEvent::HighScoreSaved { rank } => {
                    self.toast(&format!("New high score: #{}", rank));
                }
            }
        }

        fn toast(&self, message: &str) {
            if let Some(el) = self.el("toast") {
                el.set_text_content(Some(message));
                let _ = el.class_list().add_1("show");
                self.remove_class_later(el, "show", consts::TOAST_MS);
            }
        }

        /// Update HUD counters from round state
        fn update_hud(&self) {
            let stats = &self.game.round().state().stats;
            self.set_text("scoreText", &stats.score.to_string());
            self.set_text("comboText", &format!("x{}", stats.combo));
            self.set_text("hitsText", &stats.hits.to_string());
            self.set_text("missText", &stats.misses.to_string());
            self.set_text("maxComboText", &format!("x{}", stats.max_combo));
            self.set_text(
                "bestReactionText",
                &stats.best_reaction.map(format_ms).unwrap_or_else(|| "–".into()),
            );
            self.set_text(
                "avgReactionText",
                &stats
                    .average_reaction()
                    .map(format_ms)
                    .unwrap_or_else(|| "–".into()),
            );
        }

        fn show_results(&self, summary: &RoundSummary) {
            self.set_text("resultScore", &summary.score.to_string());
            self.set_text("resultHits", &summary.hits.to_string());
            self.set_text("resultMiss", &summary.misses.to_string());
            self.set_text(
                "resultAvg",
                &summary
                    .average_reaction_ms
                    .map(format_ms)
                    .unwrap_or_else(|| "–".into()),
            );
            self.set_text(
                "resultBest",
                &summary
                    .best_reaction_ms
                    .map(format_ms)
                    .unwrap_or_else(|| "–".into()),
            );
            self.set_text("resultCombo", &format!("x{}", summary.max_combo));
        }

        fn render_highscores(&self) {
            let Some(list) = self.el("highscoreList") else {
                return;
            };
            list.set_inner_html("");
            let lines = if self.game.highscores().is_empty() {
                vec!["No highscores saved yet.".to_string()]
            } else {
                self.game.highscores().lines()
            };
            for line in lines {
                if let Ok(item) = self.document.create_element("li") {
                    item.set_text_content(Some(&line));
                    let _ = list.append_child(&item);
                }
            }
        }

        /// Reflect settings on the page (theme, labels, selects, debug overlay)
        fn apply_settings_to_page(&mut self) {
            let settings = self.game.settings().clone();
            self.audio.set_muted(!settings.sound_enabled());

            if let Some(body) = self.document.body() {
                let _ = body
                    .class_list()
                    .toggle_with_force("theme-dark", settings.theme == Theme::Dark);
                let _ = body
                    .class_list()
                    .toggle_with_force("theme-light", settings.theme == Theme::Light);
            }
            self.set_text(
                "toggleTheme",
                if settings.theme == Theme::Dark {
                    "Dark Mode"
                } else {
                    "Light Mode"
                },
            );
            self.set_text(
                "toggleSound",
                if settings.sound_enabled() {
                    "Sound: On"
                } else {
                    "Sound: Off"
                },
            );
            if let Some(arena) = self.el("arena") {
                let _ = arena
                    .class_list()
                    .toggle_with_force("debug", settings.debug.is_on());
            }

            self.set_select("roundSelect", &settings.round.to_string());
            self.set_select("difficultySelect", settings.difficulty.as_str());
            self.set_select("sizeSelect", settings.size.as_str());
            self.set_select("soundSelect", settings.sound.as_str());
            self.set_select("themeSelect", settings.theme.as_str());
            self.set_select("debugSelect", settings.debug.as_str());
            self.set_select("zenSelect", settings.zen.as_str());
        }

        fn select(&self, id: &str) -> Option<HtmlSelectElement> {
            self.el(id)?.dyn_into::<HtmlSelectElement>().ok()
        }

        fn set_select(&self, id: &str, value: &str) {
            if let Some(select) = self.select(id) {
                select.set_value(value);
            }
        }

        fn select_value(&self, id: &str) -> String {
            self.select(id).map(|s| s.value()).unwrap_or_default()
        }

        /// Read the settings form, keeping current values for anything unparseable
        fn read_settings_form(&self) -> Settings {
            let current = self.game.settings().clone();
            Settings {
                round: self.select_value("roundSelect").parse().unwrap_or(current.round),
                difficulty: Difficulty::from_str(&self.select_value("difficultySelect"))
                    .unwrap_or(current.difficulty),
                size: TargetSize::from_str(&self.select_value("sizeSelect"))
                    .unwrap_or(current.size),
                sound: Switch::from_str(&self.select_value("soundSelect")).unwrap_or(current.sound),
                theme: Theme::from_str(&self.select_value("themeSelect")).unwrap_or(current.theme),
                debug: Switch::from_str(&self.select_value("debugSelect")).unwrap_or(current.debug),
                zen: Switch::from_str(&self.select_value("zenSelect")).unwrap_or(current.zen),
            }
        }

        fn sync_arena_size(&mut self) {
            if let Some(arena) = self.el("arena") {
                let rect = arena.get_bounding_client_rect();
                if rect.width() > 0.0 && rect.height() > 0.0 {
                    self.game.set_arena(rect.width() as f32, rect.height() as f32);
                }
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("Reflex Raid starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document - cannot start");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed, document.clone())));
        {
            let mut a = app.borrow_mut();
            a.apply_settings_to_page();
            a.set_screen("startScreen");
            a.flush();
        }

        setup_buttons(&document, app.clone());
        setup_arena(&document, app.clone());
        setup_keyboard(&document, app.clone());
        setup_auto_pause(&document, app.clone());

        request_animation_frame(app);
        log::info!("Reflex Raid running!");
    }

    fn on_click(document: &Document, id: &str, app: Rc<RefCell<App>>, f: fn(&mut App)) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            f(&mut app.borrow_mut());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        let start: fn(&mut App) = |a| {
            a.sync_arena_size();
            a.input(InputAction::Start);
        };
        on_click(document, "startButton", app.clone(), start);
        on_click(document, "playAgain", app.clone(), start);
        on_click(document, "restartButton", app.clone(), start);
        on_click(document, "resumeButton", app.clone(), |a| {
            a.input(InputAction::Resume)
        });
        on_click(document, "openSettings", app.clone(), |a| {
            a.set_screen("settingsPanel")
        });
        on_click(document, "closeSettings", app.clone(), |a| {
            a.set_screen("startScreen")
        });
        on_click(document, "openHighscores", app.clone(), |a| {
            a.render_highscores();
            a.set_screen("highscorePanel");
        });
        on_click(document, "closeHighscores", app.clone(), |a| {
            a.set_screen("startScreen")
        });
        on_click(document, "backToMenu", app.clone(), |a| {
            a.game.abort();
            a.flush();
            a.set_screen("startScreen");
        });
        on_click(document, "saveSettings", app.clone(), |a| {
            let settings = a.read_settings_form();
            a.game.apply_settings(settings);
            a.apply_settings_to_page();
            a.flush();
            a.set_screen("startScreen");
        });
        on_click(document, "toggleTheme", app.clone(), |a| {
            a.game.toggle_theme();
            a.apply_settings_to_page();
        });
        on_click(document, "toggleSound", app, |a| {
            a.game.toggle_sound();
            a.apply_settings_to_page();
        });
    }

    fn setup_arena(document: &Document, app: Rc<RefCell<App>>) {
        let Some(arena) = document.get_element_by_id("arena") else {
            log::warn!("Missing #arena");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let target = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(".target").ok().flatten());
            let action = match target {
                Some(el) => match el.get_attribute("data-id").and_then(|id| id.parse().ok()) {
                    Some(id) => InputAction::ClickTarget(id),
                    None => return,
                },
                None => InputAction::ClickArena,
            };
            app.borrow_mut().input(action);
        });
        let _ = arena.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(document: &Document, app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(action) = InputAction::from_key(&event.key()) {
                event.prevent_default();
                let mut a = app.borrow_mut();
                a.sync_arena_size();
                a.input(action);
            }
        });
        let _ =
            document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(document: &Document, app: Rc<RefCell<App>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                app.borrow_mut().input(InputAction::Hidden);
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().update(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Reflex Raid (native) starting...");
    log::info!("The playable version runs in the browser - run with `trunk serve`");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed);
    demo::run(seed);
}

/// Headless round with a scripted player
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use reflex_raid::persistence::MemoryStore;
    use reflex_raid::platform::InputAction;
    use reflex_raid::sim::{GameEvent, RoundPhase, TargetKind};
    use reflex_raid::{Game, format_ms};

    /// Simulation step (ms)
    const STEP_MS: u64 = 10;

    pub fn run(seed: u64) {
        let mut game = Game::new(MemoryStore::new(), seed);
        let mut player = Pcg32::seed_from_u64(seed.wrapping_add(1));
        // Reaction time the player will take on the current target
        let mut reaction_ms = player.random_range(180..650);

        game.handle_input(InputAction::PauseOrStart);
        loop {
            game.advance(STEP_MS);

            let now = game.round().now();
            let clicked = game
                .round()
                .state()
                .target
                .as_ref()
                .filter(|t| t.kind != TargetKind::Fake)
                .filter(|t| now - t.spawned_at >= reaction_ms)
                .map(|t| t.id);
            if let Some(id) = clicked {
                game.handle_input(InputAction::ClickTarget(id));
                reaction_ms = player.random_range(180..650);
            }

            for event in game.drain_events() {
                match event {
                    GameEvent::CountdownStep(label) => log::info!("{}", label),
                    GameEvent::Toast(message) => log::debug!("{}", message),
                    GameEvent::RoundFinished(summary) => {
                        println!("Score:     {}", summary.score);
                        println!("Hits:      {}", summary.hits);
                        println!("Misses:    {}", summary.misses);
                        println!(
                            "Average:   {}",
                            summary.average_reaction_ms.map(format_ms).unwrap_or_default()
                        );
                        println!(
                            "Best:      {}",
                            summary.best_reaction_ms.map(format_ms).unwrap_or_default()
                        );
                        println!("Max combo: x{}", summary.max_combo);
                    }
                    _ => {}
                }
            }

            if game.round().phase() == RoundPhase::Finished {
                break;
            }
        }

        for line in game.highscores().lines() {
            println!("{}", line);
        }
    }
}
