//! Native engine loop: runs an [`Engine`] on its own thread in real time.
//!
//! Commands arrive over an `mpsc` channel and are applied between driver
//! steps, so input and all three drivers serialize against the one engine.
//! The latest snapshot is stored in shared state for synchronous polling.
//! Dropping the loop stops the thread and cancels every driver.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::engine::{Engine, GameEvent};
use crate::input::InputEvent;
use crate::sim::Viewport;
use crate::snapshot::Snapshot;

/// Commands accepted by the loop thread
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopCommand {
    Input(InputEvent),
    Start,
    PlayAgain(bool),
    Resize(Viewport),
    Shutdown,
}

/// Handle to a running engine thread
pub struct EngineLoop {
    commands: mpsc::Sender<LoopCommand>,
    events: mpsc::Receiver<GameEvent>,
    latest: Arc<Mutex<Option<Snapshot>>>,
    handle: Option<JoinHandle<Engine>>,
}

impl EngineLoop {
    /// Move `engine` onto a new thread and start pacing it
    pub fn spawn(engine: Engine) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();
        let (event_tx, event_rx) = mpsc::channel::<GameEvent>();
        let latest = Arc::new(Mutex::new(Some(engine.snapshot())));
        let shared = Arc::clone(&latest);

        let handle = std::thread::Builder::new()
            .name("space-ball-engine".into())
            .spawn(move || run_engine_loop(engine, cmd_rx, event_tx, &shared))?;

        Ok(Self {
            commands: cmd_tx,
            events: event_rx,
            latest,
            handle: Some(handle),
        })
    }

    /// Queue a command; false if the loop has already stopped
    pub fn send(&self, command: LoopCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn input(&self, event: InputEvent) -> bool {
        self.send(LoopCommand::Input(event))
    }

    pub fn latest_snapshot(&self) -> Option<Snapshot> {
        self.latest.lock().ok().and_then(|s| s.clone())
    }

    /// Events emitted since the last call
    pub fn poll_events(&self) -> Vec<GameEvent> {
        self.events.try_iter().collect()
    }

    /// Stop the thread and hand back the engine with every driver cancelled
    pub fn shutdown(mut self) -> Option<Engine> {
        self.stop()
    }

    fn stop(&mut self) -> Option<Engine> {
        let handle = self.handle.take()?;
        let _ = self.commands.send(LoopCommand::Shutdown);
        match handle.join() {
            Ok(engine) => Some(engine),
            Err(_) => {
                log::error!("Engine thread panicked");
                None
            }
        }
    }
}

impl Drop for EngineLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The loop body. Runs until Shutdown or channel disconnect.
fn run_engine_loop(
    mut engine: Engine,
    cmd_rx: mpsc::Receiver<LoopCommand>,
    event_tx: mpsc::Sender<GameEvent>,
    latest: &Mutex<Option<Snapshot>>,
) -> Engine {
    let period = Duration::from_millis(engine.settings().physics_period_ms);
    let mut last = Instant::now();

    log::info!("Engine loop running at {:?} per physics step", period);

    loop {
        // 1. Wait for a command or the next physics step
        match cmd_rx.recv_timeout(period) {
            Ok(LoopCommand::Shutdown) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Ok(command) => apply_command(&mut engine, command),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        // 2. Advance by whole elapsed milliseconds, carrying the remainder
        let elapsed_ms = last.elapsed().as_millis() as u64;
        last += Duration::from_millis(elapsed_ms);
        for event in engine.advance(elapsed_ms) {
            let _ = event_tx.send(event);
        }

        // 3. Publish for synchronous polling
        if let Ok(mut lock) = latest.lock() {
            *lock = Some(engine.snapshot());
        }
    }

    engine.shutdown();
    if let Ok(mut lock) = latest.lock() {
        *lock = Some(engine.snapshot());
    }
    log::info!("Engine loop stopped");
    engine
}

fn apply_command(engine: &mut Engine, command: LoopCommand) {
    match command {
        LoopCommand::Input(event) => engine.handle_input(event),
        LoopCommand::Start => {
            engine.start();
        }
        LoopCommand::PlayAgain(again) => {
            engine.play_again(again);
        }
        LoopCommand::Resize(viewport) => engine.set_viewport(viewport),
        LoopCommand::Shutdown => {}
    }
}
