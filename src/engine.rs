//! Simulation engine
//!
//! `Engine` owns the round state and the periodic drivers that mutate it:
//! physics (20 ms), countdown (1 s) and difficulty ramp (10 s), plus the
//! one-shot that clears the score flash. The presentation layer is the only
//! caller; it feeds elapsed wall time into [`Engine::advance`], forwards
//! input, and renders [`Engine::snapshot`].
//!
//! The ramp is armed at construction and keeps firing whatever the phase is,
//! so balls pile up on the title screen too. Only ending a round stops it.

use crate::input::InputEvent;
use crate::settings::Settings;
use crate::sim::{self, Driver, GamePhase, GameState, Scheduler, Viewport};
use crate::snapshot::Snapshot;

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A physics tick touched the paddle
    Scored { score: u32 },
    /// The ramp added a ball
    LevelUp { level: u32, balls: usize },
    /// The countdown stepped
    TimeLeft { seconds: i32 },
    /// The round ended; ask "play again?" and answer with [`Engine::play_again`]
    RoundOver { score: u32 },
}

/// The simulation engine. Owns all game state and driver schedules.
#[derive(Debug, Clone)]
pub struct Engine {
    settings: Settings,
    viewport: Viewport,
    state: GameState,
    scheduler: Scheduler,
    events: Vec<GameEvent>,
}

impl Engine {
    /// Create an engine in `Idle` with the ramp already running.
    pub fn new(settings: Settings, viewport: Viewport) -> Self {
        let settings = settings.sanitized();
        let mut scheduler = Scheduler::new();
        scheduler.start_interval(Driver::Ramp, settings.ramp_period_ms);

        Self {
            state: GameState::new(&settings),
            settings,
            viewport,
            scheduler,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access for scripted setups (demos, tests)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Virtual time since construction
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Drivers currently armed
    pub fn active_drivers(&self) -> Vec<Driver> {
        self.scheduler.active()
    }

    /// Begin a round. Only valid from `Idle`.
    pub fn start(&mut self) -> bool {
        if self.state.phase != GamePhase::Idle {
            log::warn!("start ignored in {:?}", self.state.phase);
            return false;
        }

        self.state.phase = GamePhase::Running;
        self.state.session.started = true;
        self.scheduler
            .start_interval(Driver::Physics, self.settings.physics_period_ms);
        self.scheduler
            .start_interval(Driver::Timer, self.settings.timer_period_ms);

        log::info!("Round started ({} balls in play)", self.state.balls.len());
        true
    }

    /// Stop physics, countdown and ramp and surface the "play again?" point.
    /// Only valid from `Running`.
    pub fn end_game(&mut self) -> bool {
        if self.state.phase != GamePhase::Running {
            log::warn!("end_game ignored in {:?}", self.state.phase);
            return false;
        }

        self.scheduler.cancel(Driver::Physics);
        self.scheduler.cancel(Driver::Timer);
        self.scheduler.cancel(Driver::Ramp);
        self.state.phase = GamePhase::Ended;

        let score = self.state.session.score;
        log::info!("Round over, score {} at level {}", score, self.state.session.level);
        self.events.push(GameEvent::RoundOver { score });
        true
    }

    /// Restore the starting configuration and re-arm the ramp, back in `Idle`.
    /// Only valid from `Ended`.
    pub fn reset(&mut self) -> bool {
        if self.state.phase != GamePhase::Ended {
            log::warn!("reset ignored in {:?}", self.state.phase);
            return false;
        }

        self.state.reset(&self.settings);
        self.scheduler.cancel(Driver::FlashClear);
        self.scheduler
            .start_interval(Driver::Ramp, self.settings.ramp_period_ms);

        log::info!("Game reset");
        true
    }

    /// Answer the end-of-round prompt. Declining leaves the engine `Ended`.
    pub fn play_again(&mut self, again: bool) -> bool {
        if again {
            self.reset()
        } else {
            log::info!("Player declined another round");
            false
        }
    }

    /// One physics step. No-op unless `Running`; returns true if it scored.
    pub fn tick(&mut self) -> bool {
        if self.state.phase != GamePhase::Running {
            return false;
        }

        let scored = sim::tick(&mut self.state, self.viewport, &self.settings);
        if scored {
            self.scheduler
                .schedule_once(Driver::FlashClear, self.settings.score_flash_ms);
            self.events.push(GameEvent::Scored {
                score: self.state.session.score,
            });
        }
        scored
    }

    /// One countdown step, ending the round when it runs out.
    /// No-op unless `Running`; returns true if the round ended.
    pub fn advance_timer(&mut self) -> bool {
        if self.state.phase != GamePhase::Running {
            return false;
        }

        let over = sim::advance_timer(&mut self.state.session, self.settings.timer_end);
        self.events.push(GameEvent::TimeLeft {
            seconds: self.state.session.time_left,
        });
        if over {
            self.end_game();
        }
        over
    }

    /// Difficulty ramp step. Works in any phase.
    pub fn spawn_ball(&mut self) -> u32 {
        let level = sim::spawn_ball(&mut self.state, &self.settings);
        self.events.push(GameEvent::LevelUp {
            level,
            balls: self.state.balls.len(),
        });
        level
    }

    /// Move the paddle's left edge to `raw_x`, clamped to the viewport.
    /// Ignored unless a press is held.
    pub fn set_paddle_position(&mut self, raw_x: f32) {
        if !self.state.paddle.dragging {
            return;
        }
        let max_x = self.viewport.max_paddle_x(self.settings.paddle_width);
        self.state.paddle.x = raw_x.clamp(0.0, max_x);
    }

    pub fn set_paddle_dragging(&mut self, dragging: bool) {
        self.state.paddle.dragging = dragging;
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        if let Some(dragging) = event.dragging() {
            self.set_paddle_dragging(dragging);
        }
        if let Some(x) = event.position() {
            self.set_paddle_position(x);
        }
    }

    /// Bounds take effect on the next tick
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Run every driver due within the next `elapsed_ms`, in time order, and
    /// return the events produced since the last drain.
    pub fn advance(&mut self, elapsed_ms: u64) -> Vec<GameEvent> {
        let until = self.scheduler.now_ms() + elapsed_ms;
        while let Some(driver) = self.scheduler.pop_due(until) {
            self.run_driver(driver);
        }
        self.scheduler.settle(until);
        self.drain_events()
    }

    fn run_driver(&mut self, driver: Driver) {
        match driver {
            Driver::Physics => {
                self.tick();
            }
            Driver::Timer => {
                self.advance_timer();
            }
            Driver::Ramp => {
                self.spawn_ball();
            }
            Driver::FlashClear => self.state.session.score_flash = false,
        }
    }

    /// Events produced by direct calls since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::build(&self.state, self.viewport, &self.settings)
    }

    /// Cancel every driver. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if !self.scheduler.active().is_empty() {
            log::info!("Engine shutdown, cancelling {:?}", self.scheduler.active());
        }
        self.scheduler.cancel_all();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Settings::default(), Viewport::default())
    }
}
