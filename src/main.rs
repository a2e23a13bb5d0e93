//! Space Ball entry point
//!
//! Browser: canvas + DOM HUD front-end driving the engine from
//! `requestAnimationFrame`. Native: headless demo rounds played by the
//! autopilot, either fast-forwarded or in real time on the engine thread.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        AddEventListenerOptions, CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement,
        KeyboardEvent, MouseEvent, TouchEvent,
    };

    use space_ball::autopilot::Autopilot;
    use space_ball::input::{KeyAction, key_action};
    use space_ball::sim::{GamePhase, Viewport};
    use space_ball::{Engine, GameEvent, InputEvent, Settings, Snapshot};

    /// Game instance holding all state
    struct Game {
        engine: Engine,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        last_time: f64,
        autopilot: Option<Autopilot>,
    }

    impl Game {
        fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
            // Write back the repaired copy so stored settings stay editable
            let settings = Settings::load();
            settings.save();
            let engine = Engine::new(settings, read_viewport());
            Self {
                engine,
                canvas,
                ctx,
                last_time: 0.0,
                autopilot: None,
            }
        }

        /// Pointer X relative to the canvas
        fn canvas_x(&self, client_x: i32) -> f32 {
            let rect = self.canvas.get_bounding_client_rect();
            client_x as f32 - rect.left() as f32
        }

        fn toggle_autopilot(&mut self) {
            match self.autopilot.take() {
                Some(mut pilot) => {
                    if let Some(event) = pilot.release() {
                        self.engine.handle_input(event);
                    }
                    log::info!("Autopilot off");
                }
                None => {
                    self.autopilot = Some(Autopilot::from_settings(self.engine.settings()));
                    log::info!("Autopilot on");
                }
            }
        }

        /// Advance, render and handle the end-of-round prompt
        fn frame(&mut self, time: f64) {
            let elapsed_ms = if self.last_time > 0.0 {
                (time - self.last_time).clamp(0.0, 250.0) as u64
            } else {
                0
            };
            self.last_time = time;

            // Bounds are read every frame so a resize applies immediately
            let viewport = read_viewport();
            if viewport != self.engine.viewport() {
                log::debug!("Viewport {}x{}", viewport.width, viewport.height);
                self.engine.set_viewport(viewport);
            }
            self.resize_canvas(viewport);

            if let Some(pilot) = self.autopilot.as_mut() {
                if self.engine.phase() == GamePhase::Running {
                    for event in pilot.steer(&self.engine.snapshot()) {
                        self.engine.handle_input(event);
                    }
                }
            }

            let events = self.engine.advance(elapsed_ms);
            let snapshot = self.engine.snapshot();
            self.draw(&snapshot);
            update_hud(&snapshot);

            for event in events {
                if let GameEvent::RoundOver { score } = event {
                    let again = web_sys::window()
                        .and_then(|w| {
                            w.confirm_with_message(&format!(
                                "Game over! Score: {}\nPlay again?",
                                score
                            ))
                            .ok()
                        })
                        .unwrap_or(false);
                    self.engine.play_again(again);
                    self.last_time = 0.0;
                }
            }
        }

        fn resize_canvas(&self, viewport: Viewport) {
            let (w, h) = (viewport.width as u32, viewport.height as u32);
            if self.canvas.width() != w || self.canvas.height() != h {
                self.canvas.set_width(w);
                self.canvas.set_height(h);
            }
        }

        fn draw(&self, snap: &Snapshot) {
            let ctx = &self.ctx;
            ctx.clear_rect(0.0, 0.0, snap.viewport.width as f64, snap.viewport.height as f64);
            if snap.phase == GamePhase::Idle {
                return;
            }

            ctx.set_fill_style_str("#f5d142");
            for ball in &snap.balls {
                ctx.fill_rect(
                    ball.x as f64,
                    ball.y as f64,
                    snap.ball_size as f64,
                    snap.ball_size as f64,
                );
            }

            ctx.set_fill_style_str("#e8e8f0");
            ctx.fill_rect(snap.paddle_x as f64, snap.paddle_y as f64, snap.paddle_width as f64, 10.0);
        }
    }

    fn read_viewport() -> Viewport {
        let Some(window) = web_sys::window() else {
            return Viewport::default();
        };
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Viewport::new(w as f32, h as f32)
    }

    /// Update HUD elements in DOM
    fn update_hud(snap: &Snapshot) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let set_text = |id: &str, text: &str| {
            if let Some(el) = document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        };
        let set_visible = |id: &str, visible: bool| {
            if let Some(el) = document.get_element_by_id(id) {
                let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
            }
        };

        set_text("hud-score", &format!("Score: {}", snap.score));
        set_text("hud-level", &format!("Level: {}", snap.level));
        set_text("hud-time", &format!("Time left: {} s", snap.time_left));
        set_text("score-flash", snap.flash_label());

        set_visible("title", snap.phase == GamePhase::Idle);
        set_visible("hud", snap.started);
        set_visible("score-flash", snap.score_flash);
    }

    /// An attached event listener, detached again on drop
    struct Listener {
        target: EventTarget,
        kind: &'static str,
        closure: Closure<dyn FnMut(Event)>,
    }

    impl Listener {
        fn attach(
            target: &EventTarget,
            kind: &'static str,
            passive: bool,
            handler: impl FnMut(Event) + 'static,
        ) -> Self {
            let closure = Closure::<dyn FnMut(Event)>::new(handler);
            let options = AddEventListenerOptions::new();
            options.set_passive(passive);
            let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &options,
            );
            Self {
                target: target.clone(),
                kind,
                closure,
            }
        }
    }

    impl Drop for Listener {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
        }
    }

    type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    /// Everything one mounted game holds on the page
    struct Mount {
        game: Rc<RefCell<Game>>,
        listeners: Vec<Listener>,
        frame: FrameCallback,
        frame_id: Rc<Cell<i32>>,
    }

    impl Drop for Mount {
        fn drop(&mut self) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(self.frame_id.get());
            }
            // Breaks the callback's self-reference
            self.frame.borrow_mut().take();
            self.listeners.clear();
            self.game.borrow_mut().engine.shutdown();
            log::info!("Space Ball unmounted");
        }
    }

    thread_local! {
        static MOUNT: RefCell<Option<Mount>> = const { RefCell::new(None) };
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Space Ball starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let game = Rc::new(RefCell::new(Game::new(canvas.clone(), ctx)));
        let listeners = attach_listeners(&document, &canvas, &game);

        let frame: FrameCallback = Rc::new(RefCell::new(None));
        let frame_id = Rc::new(Cell::new(0));
        {
            let game = game.clone();
            let frame_ref = frame.clone();
            let frame_id = frame_id.clone();
            *frame.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |time: f64| {
                game.borrow_mut().frame(time);
                if let (Some(window), Some(cb)) = (web_sys::window(), frame_ref.borrow().as_ref()) {
                    if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        frame_id.set(id);
                    }
                }
            }));
        }
        if let Some(cb) = frame.borrow().as_ref() {
            if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                frame_id.set(id);
            }
        }

        MOUNT.with(|m| {
            *m.borrow_mut() = Some(Mount {
                game,
                listeners,
                frame,
                frame_id,
            })
        });

        log::info!("Space Ball running!");
    }

    /// Stop all drivers and detach every listener
    pub fn unmount() {
        MOUNT.with(|m| m.borrow_mut().take());
    }

    fn attach_listeners(
        document: &web_sys::Document,
        canvas: &HtmlCanvasElement,
        game: &Rc<RefCell<Game>>,
    ) -> Vec<Listener> {
        let doc: &EventTarget = document.as_ref();
        let mut listeners = Vec::new();

        // Mouse press / release / move anywhere on the page
        for (kind, event) in [
            ("mousedown", InputEvent::PointerDown),
            ("mouseup", InputEvent::PointerUp),
        ] {
            let game = game.clone();
            listeners.push(Listener::attach(doc, kind, true, move |_e: Event| {
                game.borrow_mut().engine.handle_input(event);
            }));
        }
        {
            let game = game.clone();
            listeners.push(Listener::attach(doc, "mousemove", true, move |e: Event| {
                if let Some(mouse) = e.dyn_ref::<MouseEvent>() {
                    let mut g = game.borrow_mut();
                    let x = g.canvas_x(mouse.client_x());
                    g.engine.handle_input(InputEvent::PointerMove { x });
                }
            }));
        }

        // Touch: first touch only, never scroll the page
        let touch_target: &EventTarget = canvas.as_ref();
        for kind in ["touchstart", "touchmove", "touchend"] {
            let game = game.clone();
            listeners.push(Listener::attach(touch_target, kind, false, move |e: Event| {
                let Some(touch) = e.dyn_ref::<TouchEvent>() else {
                    return;
                };
                let mut g = game.borrow_mut();
                let event = match kind {
                    "touchstart" => Some(InputEvent::TouchStart),
                    "touchend" => Some(InputEvent::TouchEnd),
                    _ => touch.touches().get(0).map(|t| InputEvent::TouchMove {
                        x: g.canvas_x(t.client_x()),
                    }),
                };
                if let Some(event) = event {
                    if event.suppresses_default() {
                        e.prevent_default();
                    }
                    g.engine.handle_input(event);
                }
            }));
        }

        // A drag that starts outside the canvas must not scroll the page either
        listeners.push(Listener::attach(doc, "touchmove", false, |e: Event| {
            e.prevent_default();
        }));

        // Keyboard shortcuts
        {
            let game = game.clone();
            listeners.push(Listener::attach(doc, "keydown", true, move |e: Event| {
                let Some(key) = e.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let mut g = game.borrow_mut();
                match key_action(&key.key()) {
                    Some(KeyAction::Start) => {
                        g.engine.start();
                    }
                    Some(KeyAction::ToggleAutopilot) => g.toggle_autopilot(),
                    None => {}
                }
            }));
        }

        // Start button on the title screen
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let target: &EventTarget = btn.as_ref();
            listeners.push(Listener::attach(target, "click", true, move |_e: Event| {
                game.borrow_mut().engine.start();
            }));
        }

        listeners
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn unmount() {
    wasm_game::unmount();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Space Ball (native) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = native::settings_from_args(&args);

    if args.iter().any(|a| a == "--realtime") {
        native::run_realtime(settings);
    } else {
        native::run_headless(settings);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use space_ball::autopilot::Autopilot;
    use space_ball::runtime::{EngineLoop, LoopCommand};
    use space_ball::sim::{GamePhase, Viewport};
    use space_ball::{Engine, GameEvent, Settings, Snapshot, TimerEnd};

    fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        let i = args.iter().position(|a| a == flag)?;
        match args.get(i + 1) {
            Some(value) => Some(value.as_str()),
            None => {
                log::warn!("{} needs a value, ignoring", flag);
                None
            }
        }
    }

    /// `--settings <path>` then `--timer-end <on-zero|after-zero>` on top
    pub fn settings_from_args(args: &[String]) -> Settings {
        let mut settings = match flag_value(args, "--settings") {
            Some(path) => Settings::load_from_path(path),
            None => Settings::default(),
        };

        if let Some(rule) = flag_value(args, "--timer-end") {
            match TimerEnd::from_str(rule) {
                Some(timer_end) => {
                    log::info!("Timer end rule: {}", timer_end.as_str());
                    settings.timer_end = timer_end;
                }
                None => log::warn!(
                    "Unknown timer end rule '{}', keeping {}",
                    rule,
                    settings.timer_end.as_str()
                ),
            }
        }

        settings
    }

    fn report(snap: &Snapshot) {
        println!(
            "Round over: score {}, level {}, {} balls",
            snap.score,
            snap.level,
            snap.balls.len()
        );
    }

    /// Play one demo round on the virtual clock as fast as possible
    pub fn run_headless(settings: Settings) {
        let mut engine = Engine::new(settings, Viewport::default());
        let mut pilot = Autopilot::from_settings(engine.settings());
        let step = engine.settings().physics_period_ms;

        engine.start();
        while engine.phase() == GamePhase::Running {
            for event in pilot.steer(&engine.snapshot()) {
                engine.handle_input(event);
            }
            for event in engine.advance(step) {
                match event {
                    GameEvent::LevelUp { level, balls } => {
                        log::info!("Level {} ({} balls)", level, balls)
                    }
                    GameEvent::TimeLeft { seconds } if seconds % 10 == 0 => {
                        log::info!("{} s left", seconds)
                    }
                    _ => {}
                }
            }
        }

        report(&engine.snapshot());
        engine.shutdown();
    }

    /// Play one demo round in wall-clock time on the engine thread
    pub fn run_realtime(settings: Settings) {
        let engine = Engine::new(settings, Viewport::default());
        let mut pilot = Autopilot::from_settings(engine.settings());
        let poll = Duration::from_millis(engine.settings().physics_period_ms);

        let engine_loop = match EngineLoop::spawn(engine) {
            Ok(engine_loop) => engine_loop,
            Err(e) => {
                log::error!("Failed to spawn engine thread: {}", e);
                return;
            }
        };
        engine_loop.send(LoopCommand::Start);

        'round: loop {
            std::thread::sleep(poll);
            if let Some(snap) = engine_loop.latest_snapshot() {
                for event in pilot.steer(&snap) {
                    engine_loop.input(event);
                }
            }
            for event in engine_loop.poll_events() {
                match event {
                    GameEvent::RoundOver { .. } => break 'round,
                    GameEvent::TimeLeft { seconds } => log::info!("{} s left", seconds),
                    _ => {}
                }
            }
        }

        if let Some(snap) = engine_loop.latest_snapshot() {
            report(&snap);
        }
        engine_loop.shutdown();
    }
}
