//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed step only (one physics tick = one velocity step)
//! - Virtual clock only, advanced by the owner
//! - Stable iteration order (balls in spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod schedule;
pub mod state;
pub mod tick;

pub use collision::{any_ball_touches_paddle, ball_touches_paddle, in_catch_window};
pub use schedule::{Driver, Scheduler};
pub use state::{Ball, GamePhase, GameState, Paddle, Session, Viewport};
pub use tick::{advance_timer, integrate_ball, spawn_ball, tick};
