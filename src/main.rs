//! Sleigh Strike entry point
//!
//! On the web the host page provides `globalThis.sleighHost` (visuals, HUD,
//! game-over box); this binary wires keyboard input and the frame loop to the
//! simulation. Natively it runs a headless autopilot session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use sleigh_strike::Tuning;
    use sleigh_strike::platform::{
        Clock, GameOverNotifier, HudSink, InputSource, Platform, VisualError, VisualFactory,
        VisualId, VisualRequest,
    };
    use sleigh_strike::sim::{GameState, HudState, Simulation, TickInput};

    // Bridge to the page's host object. Visual ids are positive; -1 means the
    // request was rejected, -2 that the template is not loaded yet.
    #[wasm_bindgen(inline_js = "
        function host() { return globalThis.sleighHost; }

        export function host_ready() {
            const h = host();
            if (!h) return false;
            return h.isReady ? !!h.isReady() : true;
        }

        export function host_create(request) {
            const h = host();
            if (!h) return -1;
            try {
                return h.create(JSON.parse(request));
            } catch (e) {
                console.error('sleighHost.create failed:', e);
                return -1;
            }
        }

        export function host_dispose(id) {
            const h = host();
            if (h) h.dispose(id);
        }

        export function host_hud(hud) {
            const h = host();
            if (h && h.hud) h.hud(JSON.parse(hud));
        }

        export function host_game_over(title, message) {
            const h = host();
            if (h && h.gameOver) h.gameOver(title, message);
        }

        export function host_frame(snapshot, events) {
            const h = host();
            if (h && h.frame) h.frame(JSON.parse(snapshot), JSON.parse(events));
        }
    ")]
    extern "C" {
        fn host_ready() -> bool;
        fn host_create(request: &str) -> f64;
        fn host_dispose(id: f64);
        fn host_hud(hud: &str);
        fn host_game_over(title: &str, message: &str);
        fn host_frame(snapshot: &str, events: &str);
    }

    struct JsVisuals;

    impl VisualFactory for JsVisuals {
        fn is_ready(&self) -> bool {
            host_ready()
        }

        fn create(&mut self, request: &VisualRequest) -> Result<VisualId, VisualError> {
            let json = serde_json::to_string(request).map_err(|e| VisualError::Rejected(e.to_string()))?;
            let id = host_create(&json);
            if id == -2.0 {
                Err(VisualError::TemplateMissing(request.kind))
            } else if id < 1.0 {
                Err(VisualError::Rejected(format!("host returned {}", id)))
            } else {
                Ok(id as VisualId)
            }
        }

        fn dispose(&mut self, id: VisualId) {
            host_dispose(id as f64);
        }
    }

    struct JsHud;

    impl HudSink for JsHud {
        fn refresh(&mut self, hud: &HudState) {
            match serde_json::to_string(hud) {
                Ok(json) => host_hud(&json),
                Err(e) => log::error!("HUD encode failed: {}", e),
            }
        }
    }

    struct JsGameOver;

    impl GameOverNotifier for JsGameOver {
        fn game_over(&mut self, title: &str, message: &str) {
            host_game_over(title, message);
        }
    }

    /// Held keys, updated by keydown/keyup listeners
    #[derive(Default)]
    struct Keyboard {
        held: TickInput,
    }

    impl InputSource for Keyboard {
        fn poll(&mut self, _state: &GameState) -> TickInput {
            self.held.clone()
        }
    }

    impl Keyboard {
        fn set(&mut self, key: &str, down: bool) {
            match key {
                "ArrowLeft" | "a" | "A" => self.held.left = down,
                "ArrowRight" | "d" | "D" => self.held.right = down,
                "ArrowUp" | "w" | "W" => self.held.up = down,
                "ArrowDown" | "s" | "S" => self.held.down = down,
                " " => self.held.fire = down,
                "e" | "E" | "Shift" => self.held.burst = down,
                "q" | "Q" => self.held.drop_present = down,
                _ => {}
            }
        }
    }

    /// Delta between requestAnimationFrame timestamps
    #[derive(Default)]
    struct RafClock {
        last: f64,
        now: f64,
    }

    impl Clock for RafClock {
        fn delta_seconds(&mut self) -> f32 {
            let dt = if self.last > 0.0 {
                ((self.now - self.last) / 1000.0) as f32
            } else {
                sleigh_strike::consts::FRAME_DT
            };
            self.last = self.now;
            dt
        }
    }

    /// Game instance holding the simulation and its collaborators
    struct Game {
        sim: Option<Simulation>,
        visuals: JsVisuals,
        hud: JsHud,
        notifier: JsGameOver,
        keyboard: Keyboard,
        clock: RafClock,
    }

    impl Game {
        fn new(tuning: Tuning, seed: u64) -> Self {
            let mut game = Self {
                sim: None,
                visuals: JsVisuals,
                hud: JsHud,
                notifier: JsGameOver,
                keyboard: Keyboard::default(),
                clock: RafClock::default(),
            };
            let mut platform = Platform::new(&mut game.visuals, &mut game.hud, &mut game.notifier);
            match Simulation::new(tuning, seed, &mut platform) {
                Ok(sim) => game.sim = Some(sim),
                Err(e) => log::error!("Invalid tuning: {}", e),
            }
            game
        }

        fn frame(&mut self, time: f64) {
            self.clock.now = time;
            let Some(sim) = self.sim.as_mut() else {
                return;
            };
            let mut platform = Platform::new(&mut self.visuals, &mut self.hud, &mut self.notifier);
            sim.frame(&mut self.clock, &mut self.keyboard, &mut platform);

            let events = sim.drain_events();
            match (sim.snapshot().to_json(), serde_json::to_string(&events)) {
                (Ok(snapshot), Ok(events)) => host_frame(&snapshot, &events),
                (Err(e), _) | (_, Err(e)) => log::error!("Frame encode failed: {}", e),
            }
        }

        fn restart(&mut self, seed: u64) {
            if let Some(sim) = self.sim.as_mut() {
                let mut platform = Platform::new(&mut self.visuals, &mut self.hud, &mut self.notifier);
                sim.reset(seed, &mut platform);
            }
            self.keyboard = Keyboard::default();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Sleigh Strike starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(Tuning::default(), seed)));

        setup_input_handlers(game.clone());
        setup_restart_button(game.clone());
        request_animation_frame(game);
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        for (event, down) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let key = event.key();
                if key == " " || key.starts_with("Arrow") {
                    event.prevent_default();
                }
                game.borrow_mut().keyboard.set(&key, down);
            });
            let _ = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keys released while unfocused never send keyup
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().keyboard = Keyboard::default();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart(seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
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
        game.borrow_mut().frame(time);
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
    use sleigh_strike::consts::{DEMO_SECONDS, FRAME_DT};
    use sleigh_strike::platform::headless::{Autopilot, FixedClock, HeadlessPlatform};
    use sleigh_strike::sim::GameEvent;
    use sleigh_strike::{Simulation, Tuning};

    env_logger::init();
    log::info!("Sleigh Strike (native) starting...");
    log::info!("Native mode runs a headless autopilot session; build for wasm32 to play");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match Tuning::load(std::path::Path::new(&path)) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Could not load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut host = HeadlessPlatform::new();
    let mut sim = match Simulation::new(tuning, seed, &mut host.platform()) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("Invalid tuning: {}", e);
            std::process::exit(1);
        }
    };

    let mut clock = FixedClock { dt: FRAME_DT };
    let mut pilot = Autopilot;
    let (mut kills, mut deliveries) = (0usize, 0usize);
    let frames = (DEMO_SECONDS / FRAME_DT) as usize;
    for _ in 0..frames {
        sim.frame(&mut clock, &mut pilot, &mut host.platform());
        for event in sim.drain_events() {
            match event {
                GameEvent::EnemyKilled { .. } => kills += 1,
                GameEvent::PresentDelivered { .. } => deliveries += 1,
                _ => {}
            }
        }
        if sim.is_over() {
            break;
        }
    }

    let state = sim.state();
    log::info!(
        "Session over after {:.1}s: score {}, hp {}, {} kills, {} presents delivered",
        state.elapsed,
        state.score,
        state.player.hp,
        kills,
        deliveries
    );
    println!("Final score: {}", state.score);

    sim.reset(seed, &mut host.platform());
    log::info!(
        "Visuals: {} created, {} live after reset, {} double disposals",
        host.visuals.created(),
        host.visuals.live_count(),
        host.visuals.double_disposals()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
