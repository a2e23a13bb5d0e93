//! Space Ball - A single-screen bouncing-ball arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state, drivers)
//! - `engine`: The simulation engine owning all state and periodic drivers
//! - `input`: Pointer/touch events forwarded by the presentation layer
//! - `snapshot`: Render snapshot consumed by the presentation layer
//! - `autopilot`: Demo-mode paddle controller
//! - `settings`: Data-driven game rules and timing

pub mod autopilot;
pub mod engine;
pub mod input;
#[cfg(not(target_arch = "wasm32"))]
pub mod runtime;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use engine::{Engine, GameEvent};
pub use input::InputEvent;
pub use settings::{Settings, TimerEnd};
pub use snapshot::Snapshot;

/// Game configuration constants
pub mod consts {
    /// Ball bounding box edge (pixels)
    pub const BALL_SIZE: f32 = 20.0;

    /// Paddle width (pixels)
    pub const PADDLE_WIDTH: f32 = 100.0;
    /// Distance from the viewport bottom to the paddle line
    pub const PADDLE_LINE_OFFSET: f32 = 40.0;
    /// Extra tolerance on each side of the paddle for bottom bounces
    pub const CATCH_MARGIN: f32 = 20.0;
    /// Lowest Y a ball may be clamped to when bouncing off the top edge
    pub const TOP_CLAMP: f32 = -50.0;

    /// Spawn point for every ball
    pub const SPAWN_X: f32 = 200.0;
    pub const SPAWN_Y: f32 = 20.0;
    /// Speed of the initial ball (pixels per tick, both axes)
    pub const BASE_BALL_SPEED: f32 = 5.0;
    /// Speed added per level for ramp-spawned balls
    pub const SPEED_PER_LEVEL: f32 = 5.0;

    /// Countdown length of one round
    pub const ROUND_SECONDS: i32 = 60;

    /// Physics driver period
    pub const PHYSICS_PERIOD_MS: u64 = 20;
    /// Countdown driver period
    pub const TIMER_PERIOD_MS: u64 = 1000;
    /// Difficulty ramp period
    pub const RAMP_PERIOD_MS: u64 = 10_000;
    /// How long the score flash stays up after a scoring tick
    pub const SCORE_FLASH_MS: u64 = 1000;

    /// Fallback viewport used by headless runs
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1024.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 768.0;
}
