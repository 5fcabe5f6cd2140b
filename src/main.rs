//! Fruit Catch entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use fruit_catch::platform::{GameObserver, InputSource, KinematicHost};
    use fruit_catch::sim::{FrameInput, FruitKind};
    use fruit_catch::{Session, Tuning};

    /// Held-key state, polled once per frame
    #[derive(Default)]
    struct Keys {
        left: bool,
        right: bool,
    }

    impl InputSource for Keys {
        fn read_input(&mut self) -> FrameInput {
            FrameInput {
                left: self.left,
                right: self.right,
            }
        }
    }

    /// Score/lives/game-over text in the DOM
    struct DomHud;

    impl DomHud {
        fn set_text(id: &str, text: &str) {
            if let Some(el) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(id))
            {
                el.set_text_content(Some(text));
            }
        }

        fn set_visible(id: &str, visible: bool) {
            if let Some(el) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id(id))
            {
                let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
            }
        }
    }

    impl GameObserver for DomHud {
        fn on_score_changed(&mut self, score: u32) {
            Self::set_text("hud-score", &format!("Score: {}", score));
        }

        fn on_lives_changed(&mut self, lives: u8) {
            Self::set_text("hud-lives", &"♥".repeat(lives as usize));
        }

        fn on_game_over(&mut self, score: u32, high_score: u32) {
            Self::set_text(
                "game-over",
                &format!(
                    "Game Over\nScore: {}\nHigh Score: {}\n\nPress any key to restart",
                    score, high_score
                ),
            );
            Self::set_visible("game-over", true);
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session<KinematicHost, DomHud>,
        keys: Keys,
        ctx: Option<CanvasRenderingContext2d>,
        last_time: f64,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let tuning = Tuning::load();
            let host = KinematicHost::new(&tuning);
            Self {
                session: Session::new(tuning, seed, host, DomHud),
                keys: Keys::default(),
                ctx: None,
                last_time: 0.0,
            }
        }

        fn update(&mut self, time: f64) {
            let delta_ms = if self.last_time > 0.0 {
                (time - self.last_time) as f32
            } else {
                0.0
            };
            self.last_time = time;
            self.session.frame(delta_ms, &mut self.keys);
        }

        /// Placeholder draw: basket and fruit as plain boxes
        fn render(&self) {
            let Some(ctx) = &self.ctx else {
                return;
            };
            let tuning = self.session.tuning();
            ctx.set_fill_style_str("#38bdf8");
            ctx.fill_rect(0.0, 0.0, tuning.world_width as f64, tuning.world_height as f64);

            ctx.set_fill_style_str("#a16207");
            let bounds = self.session.basket().bounds();
            let size = bounds.max - bounds.min;
            ctx.fill_rect(
                bounds.min.x as f64,
                bounds.min.y as f64,
                size.x as f64,
                size.y as f64,
            );

            for fruit in self.session.fruits().iter_active() {
                let color = match fruit.kind {
                    FruitKind::Apple => "#dc2626",
                    FruitKind::Banana => "#facc15",
                    FruitKind::Cherries => "#9f1239",
                };
                ctx.set_fill_style_str(color);
                let bounds = fruit.bounds();
                let size = bounds.max - bounds.min;
                ctx.fill_rect(
                    bounds.min.x as f64,
                    bounds.min.y as f64,
                    size.x as f64,
                    size.y as f64,
                );
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Fruit Catch starting...");

        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            log::error!("No document, giving up");
            return;
        };

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        match document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        {
            Some(canvas) => {
                let tuning = game.borrow().session.tuning().clone();
                canvas.set_width(tuning.world_width as u32);
                canvas.set_height(tuning.world_height as u32);
                game.borrow_mut().ctx = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok());
            }
            None => log::warn!("No #canvas element, running without drawing"),
        }

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        request_animation_frame(game);

        log::info!("Fruit Catch running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Key down: move, or restart after game over
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if g.session.state().is_over() {
                    g.keys = Keys::default();
                    if g.session.restart() {
                        DomHud::set_visible("game-over", false);
                    }
                    return;
                }
                match event.key().as_str() {
                    "a" | "A" | "ArrowLeft" => g.keys.left = true,
                    "d" | "D" | "ArrowRight" => g.keys.right = true,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "a" | "A" | "ArrowLeft" => g.keys.left = false,
                    "d" | "D" | "ArrowRight" => g.keys.right = false,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur: release held keys so the basket doesn't run away
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().keys = Keys::default();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fruit Catch (native) starting...");
    log::info!("Native mode runs a headless autopilot game - serve the wasm build to play");

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => match arg.parse() {
            Ok(seed) => seed,
            Err(_) => {
                log::warn!("Seed {:?} is not a number, using 42", arg);
                42
            }
        },
        None => 42,
    };
    let tuning = match args.next() {
        Some(path) => match fruit_catch::Tuning::load_from_file(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => fruit_catch::Tuning::default(),
    };

    run_headless(seed, tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Simulated time cap for the headless demo (ms)
#[cfg(not(target_arch = "wasm32"))]
const DEMO_TIME_CAP_MS: u64 = 5 * 60 * 1000;

#[cfg(not(target_arch = "wasm32"))]
fn run_headless(seed: u64, tuning: fruit_catch::Tuning) {
    use fruit_catch::Session;
    use fruit_catch::platform::{KinematicHost, LogObserver};
    use fruit_catch::sim::autopilot;

    const FRAME_MS: f32 = 1000.0 / 60.0;

    let host = KinematicHost::new(&tuning);
    let mut session = Session::new(tuning, seed, host, LogObserver);

    while !session.state().is_over() && session.now() < DEMO_TIME_CAP_MS {
        let mut input = autopilot::steer(session.basket(), session.fruits(), 4.0);
        session.frame(FRAME_MS, &mut input);
    }

    let state = session.state();
    println!(
        "Finished after {:.1}s: score {}, lives {}, high score {}",
        session.now() as f64 / 1000.0,
        state.score,
        state.lives,
        state.high_score
    );
    match serde_json::to_string_pretty(&session.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}
