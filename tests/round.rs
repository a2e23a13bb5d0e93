use glam::Vec2;
use space_ball::sim::{Ball, Driver, GamePhase, GameState, Viewport};
use space_ball::{Engine, GameEvent, InputEvent, Settings};

fn engine() -> Engine {
    Engine::new(Settings::default(), Viewport::new(1024.0, 768.0))
}

#[test]
fn test_stationary_paddle_replay() {
    let mut engine = engine();
    engine.start();
    // Move the opening ball well away from the paddle
    engine.state_mut().balls[0].pos.x = 600.0;

    // 80 ticks: straight diagonal up to the right wall
    engine.advance(80 * 20);
    assert_eq!(engine.state().balls[0].pos, Vec2::new(1000.0, 420.0));

    // Tick 81 reflects off the right wall
    engine.advance(20);
    assert_eq!(engine.state().balls[0].pos, Vec2::new(995.0, 425.0));
    assert_eq!(engine.state().balls[0].vel, Vec2::new(-5.0, 5.0));

    // Ticks 82..=150: reaches the paddle line at tick 141, outside the catch
    // window, and holds there
    engine.advance(69 * 20);
    let ball = engine.state().balls[0];
    assert_eq!(ball.pos, Vec2::new(695.0, 725.0));
    assert_eq!(ball.vel, Vec2::new(-5.0, 5.0));

    assert_eq!(engine.now_ms(), 3000);
    assert_eq!(engine.state().session.score, 0);
    assert_eq!(engine.state().session.time_left, 57);
    assert_eq!(engine.state().balls.len(), 1);
}

#[test]
fn test_every_ball_stays_inside_horizontally() {
    let mut engine = engine();
    engine.start();
    engine.handle_input(InputEvent::PointerDown);

    let max_x = 1024.0 - 20.0;
    for step in 0..3000u32 {
        // Sweep the paddle back and forth
        let x = (step % 900) as f32;
        engine.handle_input(InputEvent::PointerMove { x });
        engine.advance(20);
        for ball in &engine.state().balls {
            assert!(ball.pos.x >= 0.0 && ball.pos.x <= max_x, "x = {}", ball.pos.x);
            assert!(ball.pos.y >= -50.0);
        }
    }
}

#[test]
fn test_ramp_counts_and_speeds() {
    let mut engine = engine();

    engine.spawn_ball();
    assert_eq!(engine.state().balls[1].vel, Vec2::new(10.0, 10.0));
    engine.spawn_ball();
    engine.spawn_ball();
    assert_eq!(engine.state().balls[3].vel, Vec2::new(20.0, 20.0));

    for n in 4..10 {
        assert_eq!(engine.state().balls.len(), n);
        assert_eq!(engine.state().session.level, n as u32);
        engine.spawn_ball();
    }
}

#[test]
fn test_full_round_with_ramp() {
    let mut engine = engine();
    engine.start();

    let events = engine.advance(60_000);
    assert_eq!(engine.phase(), GamePhase::Ended);

    // Ramp fired at 10..=50 s; the round ended before the 60 s ramp
    assert_eq!(engine.state().balls.len(), 6);
    assert_eq!(engine.state().session.level, 6);
    assert_eq!(engine.state().session.time_left, 0);

    let level_ups = events
        .iter()
        .filter(|e| matches!(e, GameEvent::LevelUp { .. }))
        .count();
    assert_eq!(level_ups, 5);
    assert!(matches!(events.last(), Some(GameEvent::RoundOver { .. })));
}

#[test]
fn test_one_second_left_ends_in_one_step() {
    let mut engine = engine();
    engine.start();
    engine.state_mut().session.time_left = 1;

    assert!(engine.advance_timer());
    assert_eq!(engine.state().session.time_left, 0);
    assert_eq!(engine.phase(), GamePhase::Ended);
    assert_eq!(
        engine.drain_events(),
        vec![
            GameEvent::TimeLeft { seconds: 0 },
            GameEvent::RoundOver { score: 0 }
        ]
    );
}

#[test]
fn test_score_once_per_touching_tick() {
    let mut engine = engine();
    engine.start();
    engine.handle_input(InputEvent::TouchStart);
    engine.handle_input(InputEvent::TouchMove { x: 300.0 });

    // Three balls resting on the paddle line over the paddle
    engine.state_mut().balls = (0..3)
        .map(|i| Ball::new(Vec2::new(310.0 + i as f32 * 20.0, 715.0), Vec2::ZERO))
        .collect();

    engine.advance(200);
    assert_eq!(engine.state().session.score, 10);
    assert!(engine.snapshot().score_flash);
}

#[test]
fn test_play_again_restores_opening_state() {
    let mut engine = engine();
    engine.advance(25_000);
    engine.start();
    engine.handle_input(InputEvent::PointerDown);
    engine.handle_input(InputEvent::PointerMove { x: 500.0 });
    engine.advance(60_000);
    assert_eq!(engine.phase(), GamePhase::Ended);

    assert!(engine.play_again(true));
    let state = engine.state();
    assert_eq!(state.phase, GamePhase::Idle);
    assert_eq!(
        state.balls,
        vec![Ball::new(Vec2::new(200.0, 20.0), Vec2::new(5.0, 5.0))]
    );
    assert_eq!(state.paddle.x, 0.0);
    assert!(!state.paddle.dragging);
    assert_eq!(state.session.score, 0);
    assert_eq!(state.session.time_left, 60);
    assert_eq!(state.session.level, 1);
    assert_eq!(state, &GameState::new(engine.settings()));

    // And a fresh round can start
    assert!(engine.start());
}

#[test]
fn test_declined_round_stays_ended() {
    let mut engine = engine();
    engine.start();
    engine.advance(60_000);
    assert!(!engine.play_again(false));
    assert_eq!(engine.phase(), GamePhase::Ended);
    assert!(!engine.start());

    // Only a pending flash clear may outlive the round
    engine.advance(1000);
    assert!(engine.active_drivers().is_empty());
}

#[test]
fn test_teardown_without_end_game_stops_everything() {
    let mut engine = engine();
    engine.start();
    engine.advance(500);
    assert!(engine.active_drivers().contains(&Driver::Physics));

    engine.shutdown();
    assert!(engine.active_drivers().is_empty());
    assert_eq!(engine.phase(), GamePhase::Running);

    let frozen = engine.snapshot();
    engine.advance(120_000);
    assert_eq!(engine.snapshot(), frozen);
}
