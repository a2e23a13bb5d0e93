//! Periodic drivers on a virtual millisecond clock
//!
//! The engine's three intervals (physics, countdown, ramp) and the one-shot
//! score-flash clear are plain data here. Nothing runs on its own: the
//! owner advances the clock and dispatches whatever is due, so every driver
//! is serialized against the one state it mutates. Cancelling is idempotent.

use serde::{Deserialize, Serialize};

/// One scheduled task slot. Declaration order breaks ties between tasks
/// due on the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Driver {
    /// Physics step
    Physics,
    /// Countdown step
    Timer,
    /// Difficulty ramp
    Ramp,
    /// One-shot clear of the score flash
    FlashClear,
}

impl Driver {
    pub const ALL: [Driver; 4] = [Driver::Physics, Driver::Timer, Driver::Ramp, Driver::FlashClear];

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Task {
    /// `None` for one-shot tasks
    period_ms: Option<u64>,
    /// `None` when cancelled
    next_due_ms: Option<u64>,
}

/// Virtual clock plus one task slot per [`Driver`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduler {
    now_ms: u64,
    tasks: [Task; 4],
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// (Re)start a repeating task; first firing is one period from now
    pub fn start_interval(&mut self, driver: Driver, period_ms: u64) {
        let period_ms = period_ms.max(1);
        self.tasks[driver.slot()] = Task {
            period_ms: Some(period_ms),
            next_due_ms: Some(self.now_ms + period_ms),
        };
    }

    /// (Re)arm a one-shot task `delay_ms` from now
    pub fn schedule_once(&mut self, driver: Driver, delay_ms: u64) {
        self.tasks[driver.slot()] = Task {
            period_ms: None,
            next_due_ms: Some(self.now_ms + delay_ms),
        };
    }

    pub fn cancel(&mut self, driver: Driver) {
        self.tasks[driver.slot()] = Task::default();
    }

    pub fn cancel_all(&mut self) {
        self.tasks = [Task::default(); 4];
    }

    pub fn is_active(&self, driver: Driver) -> bool {
        self.tasks[driver.slot()].next_due_ms.is_some()
    }

    /// Drivers that are currently armed
    pub fn active(&self) -> Vec<Driver> {
        Driver::ALL
            .into_iter()
            .filter(|d| self.is_active(*d))
            .collect()
    }

    /// When `driver` fires next, if armed
    pub fn next_due_ms(&self, driver: Driver) -> Option<u64> {
        self.tasks[driver.slot()].next_due_ms
    }

    /// Pop the earliest task due at or before `until_ms`
    ///
    /// Moves the clock to that task's due time and re-arms it if it repeats.
    /// Tasks cancelled or re-armed by the caller between pops are honored.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<Driver> {
        let (driver, due) = Driver::ALL
            .into_iter()
            .filter_map(|d| self.tasks[d.slot()].next_due_ms.map(|due| (d, due)))
            .filter(|(_, due)| *due <= until_ms)
            .min_by_key(|(d, due)| (*due, *d))?;

        self.now_ms = self.now_ms.max(due);
        let task = &mut self.tasks[driver.slot()];
        task.next_due_ms = task.period_ms.map(|p| due + p);
        Some(driver)
    }

    /// Move the clock forward to `until_ms` once nothing else is due
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
