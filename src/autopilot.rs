//! Demo autopilot - plays the paddle from render snapshots
//!
//! Follows the lowest descending ball and aims with a seeded error that is
//! re-rolled each time the target changes, so demo rounds are reproducible
//! yet still miss now and then.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::input::InputEvent;
use crate::settings::Settings;
use crate::snapshot::{BallView, Snapshot};

pub struct Autopilot {
    rng: Pcg32,
    aim_error: f32,
    offset: f32,
    /// Index and vertical direction of the ball being tracked
    target: Option<(usize, bool)>,
    /// Set once the pilot has pressed; cleared by `release`
    holding: bool,
}

impl Autopilot {
    pub fn new(seed: u64, aim_error: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            aim_error: aim_error.abs(),
            offset: 0.0,
            target: None,
            holding: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.autopilot_seed, settings.autopilot_aim_error)
    }

    /// Input events to forward for this frame
    ///
    /// Presses again whenever the engine reports the paddle released, which
    /// happens on every reset and on any pointer-up from the player.
    pub fn steer(&mut self, snapshot: &Snapshot) -> Vec<InputEvent> {
        let mut events = Vec::with_capacity(2);
        if !snapshot.paddle_dragging {
            self.holding = true;
            events.push(InputEvent::PointerDown);
        }

        let Some((index, ball)) = pick_target(&snapshot.balls) else {
            return events;
        };

        let key = (index, ball.vy > 0.0);
        if self.target != Some(key) {
            self.target = Some(key);
            self.offset = if self.aim_error > 0.0 {
                self.rng.random_range(-self.aim_error..=self.aim_error)
            } else {
                0.0
            };
        }

        let ball_center = ball.x + snapshot.ball_size / 2.0;
        let x = ball_center - snapshot.paddle_width / 2.0 + self.offset;
        events.push(InputEvent::PointerMove { x });
        events
    }

    /// Let go of the paddle
    pub fn release(&mut self) -> Option<InputEvent> {
        if self.holding {
            self.holding = false;
            self.target = None;
            Some(InputEvent::PointerUp)
        } else {
            None
        }
    }
}

/// Lowest descending ball, or the lowest ball if none descend
fn pick_target(balls: &[BallView]) -> Option<(usize, &BallView)> {
    let lowest = |a: &(usize, &BallView), b: &(usize, &BallView)| a.1.y.total_cmp(&b.1.y);

    balls
        .iter()
        .enumerate()
        .filter(|(_, b)| b.vy > 0.0)
        .max_by(lowest)
        .or_else(|| balls.iter().enumerate().max_by(lowest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, GameEvent};
    use crate::sim::GamePhase;

    fn view(x: f32, y: f32, vy: f32) -> BallView {
        BallView { x, y, vx: 5.0, vy }
    }

    #[test]
    fn test_targets_lowest_descending_ball() {
        let balls = [view(10.0, 500.0, -5.0), view(20.0, 300.0, 5.0), view(30.0, 100.0, 5.0)];
        assert_eq!(pick_target(&balls).map(|(i, _)| i), Some(1));

        let rising = [view(10.0, 500.0, -5.0), view(20.0, 300.0, -5.0)];
        assert_eq!(pick_target(&rising).map(|(i, _)| i), Some(0));
        assert!(pick_target(&[]).is_none());
    }

    fn play_round(engine: &mut Engine, pilot: &mut Autopilot) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while engine.phase() == GamePhase::Running {
            for event in pilot.steer(&engine.snapshot()) {
                engine.handle_input(event);
            }
            events.extend(engine.advance(engine.settings().physics_period_ms));
        }
        events
    }

    #[test]
    fn test_presses_once_then_moves() {
        let mut engine = Engine::default();
        let mut pilot = Autopilot::new(7, 0.0);

        let first = pilot.steer(&engine.snapshot());
        assert_eq!(first[0], InputEvent::PointerDown);
        // Centered under the only ball: 200 + 10 - 50
        assert_eq!(first[1], InputEvent::PointerMove { x: 160.0 });
        for event in first {
            engine.handle_input(event);
        }

        let second = pilot.steer(&engine.snapshot());
        assert_eq!(second, vec![InputEvent::PointerMove { x: 160.0 }]);

        assert_eq!(pilot.release(), Some(InputEvent::PointerUp));
        assert_eq!(pilot.release(), None);
    }

    #[test]
    fn test_presses_again_after_player_lets_go() {
        let mut engine = Engine::default();
        let mut pilot = Autopilot::new(7, 0.0);
        for event in pilot.steer(&engine.snapshot()) {
            engine.handle_input(event);
        }

        engine.handle_input(InputEvent::PointerUp);
        let events = pilot.steer(&engine.snapshot());
        assert_eq!(events[0], InputEvent::PointerDown);
    }

    #[test]
    fn test_keeps_steering_after_play_again() {
        let mut engine = Engine::default();
        let mut pilot = Autopilot::new(3, 0.0);

        engine.start();
        let events = play_round(&mut engine, &mut pilot);
        assert!(matches!(events.last(), Some(GameEvent::RoundOver { .. })));

        assert!(engine.play_again(true));
        assert!(!engine.state().paddle.dragging);
        assert!(engine.start());

        for _ in 0..200 {
            for event in pilot.steer(&engine.snapshot()) {
                engine.handle_input(event);
            }
            engine.advance(engine.settings().physics_period_ms);
        }
        assert!(engine.state().paddle.dragging);
        assert!(engine.state().paddle.x > 0.0);
    }

    #[test]
    fn test_same_seed_same_round() {
        let play = |seed: u64| {
            let mut engine = Engine::default();
            let mut pilot = Autopilot::new(seed, 40.0);
            engine.start();
            play_round(&mut engine, &mut pilot);
            (engine.state().session.score, engine.state().balls.len())
        };

        assert_eq!(play(99), play(99));
    }

    #[test]
    fn test_autopilot_scores_in_a_full_round() {
        let mut engine = Engine::default();
        let mut pilot = Autopilot::new(1, 0.0);
        engine.start();
        play_round(&mut engine, &mut pilot);
        assert!(engine.state().session.score > 0);
        assert_eq!(engine.phase(), GamePhase::Ended);
    }
}
