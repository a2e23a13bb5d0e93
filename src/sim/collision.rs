//! Axis-aligned collision tests between balls, the paddle and the viewport
//!
//! Arcade approximation: boxes only, no penetration resolution. Every test
//! here is pure so the tick can evaluate it against pre-move positions.

use super::state::{Ball, Paddle};
use crate::settings::Settings;

/// True if the ball's box reaches the paddle line while horizontally
/// overlapping the paddle.
///
/// `paddle_line` is the paddle's bottom edge in viewport coordinates.
pub fn ball_touches_paddle(ball: &Ball, paddle: &Paddle, paddle_line: f32, settings: &Settings) -> bool {
    let ball_bottom = ball.pos.y + settings.ball_size;
    let ball_right = ball.pos.x + settings.ball_size;
    let paddle_right = paddle.x + settings.paddle_width;

    ball_bottom >= paddle_line
        && ball.pos.y < paddle_line
        && ball.pos.x < paddle_right
        && ball_right > paddle.x
}

/// True if any ball currently overlaps the paddle
pub fn any_ball_touches_paddle(
    balls: &[Ball],
    paddle: &Paddle,
    paddle_line: f32,
    settings: &Settings,
) -> bool {
    balls
        .iter()
        .any(|ball| ball_touches_paddle(ball, paddle, paddle_line, settings))
}

/// True if `x` lies in the band the paddle catches bottom bounces in
///
/// The band is wider than the paddle by `catch_margin` on both sides.
#[inline]
pub fn in_catch_window(x: f32, paddle: &Paddle, settings: &Settings) -> bool {
    let left = paddle.x - settings.catch_margin;
    let right = paddle.x + settings.paddle_width + settings.catch_margin;
    x >= left && x <= right
}

/// True if `x` is outside `[0, max_x]`
#[inline]
pub fn out_of_horizontal_bounds(x: f32, max_x: f32) -> bool {
    x < 0.0 || x > max_x
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn ball_at(x: f32, y: f32) -> Ball {
        Ball::new(Vec2::new(x, y), Vec2::new(5.0, 5.0))
    }

    #[test]
    fn test_touching_paddle_from_above() {
        let s = Settings::default();
        let paddle = Paddle { x: 100.0, dragging: false };
        let line = 728.0;

        // Bottom edge exactly on the line counts
        assert!(ball_touches_paddle(&ball_at(150.0, 708.0), &paddle, line, &s));
        // Straddling the line
        assert!(ball_touches_paddle(&ball_at(150.0, 720.0), &paddle, line, &s));
        // Still above
        assert!(!ball_touches_paddle(&ball_at(150.0, 707.0), &paddle, line, &s));
        // Top edge at the line no longer counts
        assert!(!ball_touches_paddle(&ball_at(150.0, 728.0), &paddle, line, &s));
    }

    #[test]
    fn test_touching_paddle_horizontal_edges() {
        let s = Settings::default();
        let paddle = Paddle { x: 100.0, dragging: false };
        let line = 728.0;

        // Right edge of ball exactly at paddle left: no overlap
        assert!(!ball_touches_paddle(&ball_at(80.0, 715.0), &paddle, line, &s));
        assert!(ball_touches_paddle(&ball_at(81.0, 715.0), &paddle, line, &s));
        // Ball left edge at paddle right: no overlap
        assert!(!ball_touches_paddle(&ball_at(200.0, 715.0), &paddle, line, &s));
        assert!(ball_touches_paddle(&ball_at(199.0, 715.0), &paddle, line, &s));
    }

    #[test]
    fn test_any_ball_touches() {
        let s = Settings::default();
        let paddle = Paddle::default();
        let balls = [ball_at(500.0, 100.0), ball_at(10.0, 715.0)];
        assert!(any_ball_touches_paddle(&balls, &paddle, 728.0, &s));
        assert!(!any_ball_touches_paddle(&balls[..1], &paddle, 728.0, &s));
        assert!(!any_ball_touches_paddle(&[], &paddle, 728.0, &s));
    }

    #[test]
    fn test_catch_window_is_inclusive_and_wider_than_paddle() {
        let s = Settings::default();
        let paddle = Paddle { x: 300.0, dragging: false };
        assert!(in_catch_window(280.0, &paddle, &s));
        assert!(in_catch_window(420.0, &paddle, &s));
        assert!(!in_catch_window(279.9, &paddle, &s));
        assert!(!in_catch_window(420.1, &paddle, &s));
    }

    #[test]
    fn test_horizontal_bounds() {
        assert!(out_of_horizontal_bounds(-0.5, 100.0));
        assert!(out_of_horizontal_bounds(100.5, 100.0));
        assert!(!out_of_horizontal_bounds(0.0, 100.0));
        assert!(!out_of_horizontal_bounds(100.0, 100.0));
    }
}
