//! Game state and core simulation types
//!
//! Everything a round mutates lives in [`GameState`]; the engine owns exactly
//! one and replaces ball values wholesale each physics tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::settings::Settings;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Title screen, waiting for start (also after "play again")
    #[default]
    Idle,
    /// Physics and countdown drivers are active
    Running,
    /// Countdown ran out; waiting on the "play again?" decision
    Ended,
}

/// Playfield size in pixels, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Rightmost X a ball's left edge may take
    #[inline]
    pub fn max_ball_x(&self, ball_size: f32) -> f32 {
        (self.width - ball_size).max(0.0)
    }

    /// Y of the paddle line (also the bottom bound for balls)
    #[inline]
    pub fn paddle_line(&self, offset: f32) -> f32 {
        self.height - offset
    }

    /// Rightmost X the paddle's left edge may take
    #[inline]
    pub fn max_paddle_x(&self, paddle_width: f32) -> f32 {
        (self.width - paddle_width).max(0.0)
    }
}

/// A ball entity. Size is fixed by settings, not stored per ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Top-left corner
    pub pos: Vec2,
    /// Pixels per physics tick
    pub vel: Vec2,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self { pos, vel }
    }

    /// The single ball every round starts with
    pub fn initial(settings: &Settings) -> Self {
        Self::new(
            Vec2::new(settings.spawn_x, settings.spawn_y),
            Vec2::splat(settings.base_ball_speed),
        )
    }

    /// A ball spawned by the difficulty ramp while at `level`
    pub fn spawned(settings: &Settings, level: u32) -> Self {
        let speed = settings.base_ball_speed + level as f32 * settings.speed_per_level;
        Self::new(
            Vec2::new(settings.spawn_x, settings.spawn_y),
            Vec2::splat(speed),
        )
    }
}

/// The player's paddle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// True while a pointer/touch press is held
    pub dragging: bool,
}

/// Score, countdown and level bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub score: u32,
    pub time_left: i32,
    pub level: u32,
    pub started: bool,
    /// Mirrors whether the latest physics tick scored
    pub score_flash: bool,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self {
            score: 0,
            time_left: settings.round_seconds,
            level: 1,
            started: false,
            score_flash: false,
        }
    }
}

/// Complete round state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    pub session: Session,
    pub paddle: Paddle,
    /// Active balls in spawn order; only grows until reset
    pub balls: Vec<Ball>,
}

impl GameState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            phase: GamePhase::Idle,
            session: Session::new(settings),
            paddle: Paddle::default(),
            balls: vec![Ball::initial(settings)],
        }
    }

    /// Restore the single-ball starting configuration
    pub fn reset(&mut self, settings: &Settings) {
        *self = Self::new(settings);
    }
}
