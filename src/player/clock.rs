//! One-second step clock.
//!
//! The clock is a spawned interval task that sends [`ClockTick`]s into a
//! channel drained by the player's event loop. Every `start` and `stop` bumps
//! the clock's generation, so ticks that a stopped instance left buffered in
//! the channel are recognisably stale and get discarded.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const TICK_BUFFER: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    pub generation: u64,
}

pub struct StepClock {
    period: Duration,
    tx: mpsc::Sender<ClockTick>,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl StepClock {
    pub fn new(period: Duration) -> (Self, mpsc::Receiver<ClockTick>) {
        let (tx, rx) = mpsc::channel(TICK_BUFFER);
        let clock = Self {
            period,
            tx,
            generation: 0,
            task: None,
        };
        (clock, rx)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Start a fresh instance. Any running instance is stopped first.
    pub fn start(&mut self) {
        self.stop();
        self.generation += 1;
        let generation = self.generation;
        let period = self.period;
        let tx = self.tx.clone();

        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately; the first real one lands
            // one period after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(ClockTick { generation }).await.is_err() {
                    return;
                }
            }
        }));
    }

    /// Stop the running instance, if any. Takes effect before returning.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
    }

    /// Whether a tick came from the instance that is running now.
    pub fn accepts(&self, tick: ClockTick) -> bool {
        self.task.is_some() && tick.generation == self.generation
    }
}

impl Drop for StepClock {
    fn drop(&mut self) {
        self.stop();
    }
}
