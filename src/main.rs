//! Tap Ladder entry point
//!
//! Browser: wires DOM input, the frame loop and Web Audio to the engine.
//! Native: runs a headless autoplay session and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent, MouseEvent};

    use tap_ladder::audio::WebAudioSink;
    use tap_ladder::engine::{Engine, GamePhase, TapOutcome, TapResult};
    use tap_ladder::platform::{Command, FrameLoop, PerformanceClock, TimeSource};
    use tap_ladder::tuning::Tuning;

    /// Game instance holding all state
    struct Game {
        engine: Engine<WebAudioSink>,
        clock: PerformanceClock,
        frame_loop: Option<FrameLoop>,
        document: Document,
    }

    impl Game {
        fn new(engine: Engine<WebAudioSink>, document: Document) -> Self {
            Self {
                engine,
                clock: PerformanceClock::new(),
                frame_loop: None,
                document,
            }
        }

        /// Apply a command the moment it arrives so taps keep their timing
        fn command(&mut self, command: Command) {
            let now = self.clock.now_ms();
            if let Some(TapOutcome::Judged(j)) = command.dispatch(&mut self.engine, now) {
                log::debug!("{:?} ({:+.0}ms)", j.verdict, j.offset_ms);
            }
            self.sync_frame_loop();
            self.update_hud(now);
        }

        /// Per-frame callback
        fn frame(&mut self, time: f64) {
            self.engine.on_frame(time);
            self.update_hud(time);
            self.sync_frame_loop();
        }

        /// Keep the frame loop alive exactly while the beat is running
        fn sync_frame_loop(&mut self) {
            let wanted = self.engine.wants_frames();
            if let Some(frame_loop) = self.frame_loop.as_mut() {
                match (wanted, frame_loop.is_running()) {
                    (true, false) => frame_loop.start(),
                    (false, true) => frame_loop.stop(),
                    _ => {}
                }
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, now: f64) {
            let snap = self.engine.snapshot(now);
            let state = &snap.state;

            self.set_text("hud-score", &state.score.to_string());
            self.set_text("hud-combo", &format!("x{}", state.combo));
            self.set_text("hud-level", &state.level.to_string());
            self.set_text("hud-lives", &state.lives.to_string());
            self.set_text("hud-bpm", &format!("{:.0}", state.bpm));

            if let Some(el) = self.document.get_element_by_id("ladder") {
                let _ = el.set_attribute("data-rung", &state.rung.to_string());
                let result = match state.last_tap_result {
                    TapResult::Perfect => "perfect",
                    TapResult::Good => "good",
                    TapResult::Miss => "miss",
                    TapResult::None => "none",
                };
                let _ = el.set_attribute("data-result", result);
            }

            // Progress bar wraps at 1 when a frame lands past an unseen boundary
            if let Some(el) = self.document.get_element_by_id("beat-progress") {
                let pct = snap.phase.rem_euclid(1.0) * 100.0;
                let _ = el.set_attribute("style", &format!("width: {pct:.1}%"));
            }
            if let Some(el) = self.document.get_element_by_id("beat-window") {
                let pct = snap.timing_window_ms / snap.beat_interval_ms * 100.0;
                let _ = el.set_attribute("style", &format!("width: {pct:.1}%"));
            }

            self.set_text("mute-btn", if state.is_muted { "Unmute" } else { "Mute" });

            if let Some(el) = self.document.get_element_by_id("overlay") {
                let class = if snap.game_phase == GamePhase::Running {
                    "hidden"
                } else {
                    ""
                };
                let _ = el.set_attribute("class", class);
            }
            match snap.game_phase {
                GamePhase::GameOver => {
                    self.set_text("overlay-title", "Game Over");
                    self.set_text(
                        "overlay-text",
                        &format!("Final Score: {}. Tap or press Space to play again", state.score),
                    );
                }
                GamePhase::Paused => {
                    self.set_text("overlay-title", "Tap Ladder");
                    self.set_text(
                        "overlay-text",
                        "Tap in time with the beat to climb. Tap or press Space to start",
                    );
                }
                GamePhase::Running => {}
            }
        }
    }

    /// Read an optional `data-tuning` JSON override from the game element
    fn load_tuning(document: &Document) -> Tuning {
        let json = document
            .get_element_by_id("game")
            .and_then(|el| el.get_attribute("data-tuning"));
        let Some(json) = json else {
            return Tuning::default();
        };
        match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning override");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning override: {e}");
                Tuning::default()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }

        log::info!("Tap Ladder starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document - cannot start");
            return;
        };

        let engine = match Engine::new(load_tuning(&document), WebAudioSink::new()) {
            Ok(engine) => engine,
            Err(e) => {
                log::error!("Invalid tuning: {} - cannot start", e);
                return;
            }
        };
        let game = Rc::new(RefCell::new(Game::new(engine, document.clone())));

        // The loop only holds a weak reference so the game can be dropped
        let weak = Rc::downgrade(&game);
        let frame_loop = FrameLoop::new(move |time| {
            if let Some(game) = weak.upgrade() {
                game.borrow_mut().frame(time);
            }
        });
        if frame_loop.is_none() {
            log::error!("No window - frame loop unavailable");
        }
        game.borrow_mut().frame_loop = frame_loop;

        setup_input_handlers(&document, game.clone());
        setup_buttons(&document, game.clone());

        // Input handlers hold the strong references from here on
        let now = game.borrow().clock.now_ms();
        game.borrow().update_hud(now);

        log::info!("Tap Ladder ready");
    }

    fn setup_input_handlers(document: &Document, game: Rc<RefCell<Game>>) {
        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                if let Some(command) = Command::from_key(&event.key()) {
                    event.prevent_default();
                    game.borrow_mut().command(command);
                }
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click / tap anywhere on the play area
        if let Some(area) = document.get_element_by_id("game") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().command(Command::Tap);
            });
            let _ = area
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        let buttons = [
            ("pause-btn", Command::TogglePause),
            ("reset-btn", Command::Reset),
            ("mute-btn", Command::ToggleMute),
        ];
        for (id, command) in buttons {
            let Some(btn) = document.get_element_by_id(id) else {
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                // Buttons sit inside the play area; don't count as a tap
                event.stop_propagation();
                game.borrow_mut().command(command);
            });
            let _ = btn
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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
    use std::time::{SystemTime, UNIX_EPOCH};

    use tap_ladder::audio::LogSink;
    use tap_ladder::engine::{AutoPlayer, Engine, simulate};
    use tap_ladder::platform::{ManualClock, SystemClock, TimeSource};
    use tap_ladder::tuning::Tuning;

    /// One minute of play at 60 fps
    const DEMO_FRAMES: u64 = 60 * 60;
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Demo player's timing spread
    const DEMO_JITTER_MS: f64 = 60.0;

    env_logger::init();
    log::info!("Tap Ladder (native) starting...");
    log::info!("Native mode runs a headless autoplay demo - build for wasm32 to play");

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    log::info!("Autoplay seed: {}", seed);

    let mut engine = match Engine::new(Tuning::default(), LogSink) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Invalid tuning: {}", e);
            return;
        }
    };
    engine.toggle_mute();
    let mut player = AutoPlayer::new(seed, DEMO_JITTER_MS);
    let clock = ManualClock::new(0.0);

    let wall = SystemClock::new();
    let report = simulate(&mut engine, &mut player, &clock, FRAME_MS, DEMO_FRAMES);
    log::info!(
        "Simulated {} frames ({:.1}s of play) in {:.2}ms",
        report.frames,
        clock.now_ms() / 1000.0,
        wall.now_ms()
    );

    match serde_json::to_string(&report) {
        Ok(json) => log::info!("Report: {}", json),
        Err(e) => log::warn!("Could not serialize report: {}", e),
    }
    match serde_json::to_string(&engine.snapshot(clock.now_ms())) {
        Ok(json) => println!("{json}"),
        Err(e) => log::warn!("Could not serialize snapshot: {}", e),
    }
}
