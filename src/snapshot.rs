//! Render snapshot: a read-only copy of everything the presentation layer draws

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, Viewport};

/// One ball as rendered
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// Complete render state for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub viewport: Viewport,
    /// Balls in spawn order
    pub balls: Vec<BallView>,
    pub ball_size: f32,
    pub paddle_x: f32,
    pub paddle_y: f32,
    pub paddle_width: f32,
    pub paddle_dragging: bool,
    pub score: u32,
    pub level: u32,
    pub time_left: i32,
    pub started: bool,
    pub score_flash: bool,
}

impl Snapshot {
    pub fn build(state: &GameState, viewport: Viewport, settings: &Settings) -> Self {
        Self {
            phase: state.phase,
            viewport,
            balls: state
                .balls
                .iter()
                .map(|b| BallView {
                    x: b.pos.x,
                    y: b.pos.y,
                    vx: b.vel.x,
                    vy: b.vel.y,
                })
                .collect(),
            ball_size: settings.ball_size,
            paddle_x: state.paddle.x,
            paddle_y: viewport.paddle_line(settings.paddle_line_offset),
            paddle_width: settings.paddle_width,
            paddle_dragging: state.paddle.dragging,
            score: state.session.score,
            level: state.session.level,
            time_left: state.session.time_left,
            started: state.session.started,
            score_flash: state.session.score_flash,
        }
    }

    /// Text shown while the score flash is up
    pub fn flash_label(&self) -> &'static str {
        if self.score > 0 { "+" } else { "-5" }
    }
}
