//! Fixed-step simulation transforms
//!
//! One function per periodic driver: [`tick`] (physics), [`advance_timer`]
//! (countdown) and [`spawn_ball`] (difficulty ramp). Each is a synchronous
//! transform over the whole [`GameState`]; scheduling lives in the engine.

use glam::Vec2;

use super::collision::{any_ball_touches_paddle, in_catch_window, out_of_horizontal_bounds};
use super::state::{Ball, GameState, Paddle, Session, Viewport};
use crate::settings::{Settings, TimerEnd};

/// Advance every ball by one physics step and update the score.
///
/// Paddle contact is judged on positions from before this step's movement,
/// once for the whole ball set: a tick scores at most one point however
/// many balls touch. Returns true if the tick scored.
pub fn tick(state: &mut GameState, viewport: Viewport, settings: &Settings) -> bool {
    let paddle_line = viewport.paddle_line(settings.paddle_line_offset);
    let scored = any_ball_touches_paddle(&state.balls, &state.paddle, paddle_line, settings);

    let paddle = state.paddle;
    state.balls = state
        .balls
        .iter()
        .map(|ball| integrate_ball(*ball, &paddle, viewport, settings))
        .collect();

    if scored {
        state.session.score += 1;
        log::trace!("Paddle contact, score {}", state.session.score);
    }
    state.session.score_flash = scored;

    scored
}

/// Compute a ball's next value from its current one
///
/// A ball that crosses the paddle line outside the catch window keeps its
/// position for this step instead of falling through.
pub fn integrate_ball(ball: Ball, paddle: &Paddle, viewport: Viewport, settings: &Settings) -> Ball {
    let max_x = viewport.max_ball_x(settings.ball_size);
    let paddle_line = viewport.paddle_line(settings.paddle_line_offset);

    let mut vel = ball.vel;
    let mut new_x = ball.pos.x + vel.x;
    let mut new_y = ball.pos.y + vel.y;

    if out_of_horizontal_bounds(new_x, max_x) {
        vel.x = -vel.x;
        new_x = (ball.pos.x + vel.x).clamp(0.0, max_x);
    }

    if new_y < 0.0 {
        vel.y = -vel.y;
        let y = settings.top_clamp.max(new_y);
        new_y = y + vel.y;
    } else if new_y > paddle_line {
        if in_catch_window(new_x, paddle, settings) {
            vel.y = -vel.y;
            let y = (paddle_line - settings.ball_size).max(0.0);
            new_y = y + vel.y;
        } else {
            // Missed: hold position, the horizontal reflection still sticks
            return Ball::new(ball.pos, vel);
        }
    }

    Ball::new(Vec2::new(new_x, new_y), vel)
}

/// Count the round down by one second
///
/// Returns true when the round is over under `rule`.
pub fn advance_timer(session: &mut Session, rule: TimerEnd) -> bool {
    let before = session.time_left;
    session.time_left -= 1;

    match rule {
        TimerEnd::OnZero => session.time_left <= 0,
        TimerEnd::AfterZero => before <= 0,
    }
}

/// Difficulty ramp: append a ball sized to the current level, then level up
///
/// Returns the new level. Existing balls keep their speed.
pub fn spawn_ball(state: &mut GameState, settings: &Settings) -> u32 {
    let ball = Ball::spawned(settings, state.session.level);
    state.balls.push(ball);
    state.session.level += 1;

    log::debug!(
        "Ramp spawned ball #{} at speed {}, level {}",
        state.balls.len(),
        ball.vel.x,
        state.session.level
    );

    state.session.level
}
