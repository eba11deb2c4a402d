use std::time::Duration;

use instant::Instant;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::pet::{PetSnapshot, SharedPet};

/// Simulated seconds per tick.
pub const TICK_DT: f32 = 0.1;
/// Wall-clock period between ticks (~10 Hz).
const TICK_PERIOD: Duration = Duration::from_millis(100);
/// Pause after a failed tick before trying again.
const ERROR_BACKOFF: Duration = Duration::from_secs(1);
/// How often to log tick stats (seconds).
const STATS_LOG_INTERVAL: f64 = 30.0;
/// Updates buffered per subscriber before a slow one starts skipping.
const UPDATE_BUFFER: usize = 64;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to encode pet state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Pushes serialized pet state to observers.
pub trait Publisher: Send + Sync + 'static {
    /// Returns how many observers the update reached.
    fn publish(&self, snapshot: &PetSnapshot) -> Result<usize, PublishError>;
}

/// Fan-out of JSON-encoded updates to every live subscriber.
#[derive(Clone)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<String>,
}

impl BroadcastPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(UPDATE_BUFFER);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl Publisher for BroadcastPublisher {
    fn publish(&self, snapshot: &PetSnapshot) -> Result<usize, PublishError> {
        let json = serde_json::to_string(snapshot)?;
        // No subscribers is not a failure; the update just goes nowhere.
        Ok(self.tx.send(json).unwrap_or(0))
    }
}

// ---------------------------------------------------------------------------
// Tick timing
// ---------------------------------------------------------------------------

struct TickStats {
    tick_count: u64,
    last_log_time: Instant,
    tick_time_sum: f64,
    tick_time_max: f64,
    ticks_since_log: u32,
    subscribers: usize,
}

impl TickStats {
    fn new() -> Self {
        Self {
            tick_count: 0,
            last_log_time: Instant::now(),
            tick_time_sum: 0.0,
            tick_time_max: 0.0,
            ticks_since_log: 0,
            subscribers: 0,
        }
    }

    fn record_tick(&mut self, secs: f64, subscribers: usize) {
        self.tick_count += 1;
        self.ticks_since_log += 1;
        self.tick_time_sum += secs;
        self.tick_time_max = self.tick_time_max.max(secs);
        self.subscribers = subscribers;

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= STATS_LOG_INTERVAL {
            let avg_us = (self.tick_time_sum / self.ticks_since_log as f64) * 1_000_000.0;
            log::debug!(
                "Pet ticks: {} in {:.0}s | avg: {:.1}us | max: {:.1}us | subscribers: {} | total: {}",
                self.ticks_since_log,
                elapsed,
                avg_us,
                self.tick_time_max * 1_000_000.0,
                self.subscribers,
                self.tick_count,
            );
            self.last_log_time = Instant::now();
            self.tick_time_sum = 0.0;
            self.tick_time_max = 0.0;
            self.ticks_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Background task that ticks the pet and publishes every result.
pub struct TickDriver {
    handle: JoinHandle<()>,
}

impl TickDriver {
    pub fn spawn(pet: SharedPet, publisher: impl Publisher) -> Self {
        Self {
            handle: tokio::spawn(run(pet, publisher)),
        }
    }

    /// Stop ticking. Anything mid-publish is dropped, not drained.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

async fn run(pet: SharedPet, publisher: impl Publisher) {
    let mut interval = tokio::time::interval(TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut stats = TickStats::new();

    loop {
        interval.tick().await;

        let started = Instant::now();
        let snapshot = pet.with(|engine| {
            engine.tick(TICK_DT);
            engine.snapshot()
        });

        match publisher.publish(&snapshot) {
            Ok(subscribers) => stats.record_tick(started.elapsed().as_secs_f64(), subscribers),
            Err(e) => {
                log::warn!("Pet update failed: {e}; retrying in {ERROR_BACKOFF:?}");
                tokio::time::sleep(ERROR_BACKOFF).await;
            }
        }
    }
}
