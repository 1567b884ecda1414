//! Periodic sampling of the host into the metric store.
//!
//! A probe call that outlives its tick is abandoned, not cancelled: the
//! blocking thread keeps running. Until it returns, later ticks do not start
//! another probe, so a hung host query costs one thread, not one per tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::store::MetricStore;
use crate::probe::{memory, HostProbe};

/// Time between two samples.
pub const COLLECT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Idle,
    Sampling,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// A sample was handed to the store.
    Recorded { cpu_load: f64, memory_usage: f64 },
    /// The probe failed, timed out or returned unusable counters.
    ProbeFailed,
    /// A probe abandoned by an earlier tick has not returned yet.
    ProbeStalled,
    /// A previous tick was still sampling.
    Skipped,
}

/// Samples the host every [`COLLECT_INTERVAL`] and appends to the store.
pub struct Collector {
    probe: Arc<dyn HostProbe>,
    store: MetricStore,
    interval: Duration,
    sampling: AtomicBool,
    probe_in_flight: Arc<AtomicBool>,
}

/// Returns the collector to `Idle` however the tick ends.
struct SamplingGuard<'a>(&'a AtomicBool);

impl Drop for SamplingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Cleared when the blocking probe call returns (or never gets to run).
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Collector {
    pub fn new(probe: Arc<dyn HostProbe>, store: MetricStore) -> Self {
        Self {
            probe,
            store,
            interval: COLLECT_INTERVAL,
            sampling: AtomicBool::new(false),
            probe_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    #[cfg(test)]
    fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> CollectorState {
        if self.sampling.load(Ordering::Acquire) {
            CollectorState::Sampling
        } else {
            CollectorState::Idle
        }
    }

    /// Run one tick: probe the host and store the reading.
    ///
    /// Never fails. Errors are logged and the collector goes back to `Idle`.
    pub async fn tick(&self) -> TickOutcome {
        if self
            .sampling
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Previous metrics tick still running, skipping");
            return TickOutcome::Skipped;
        }
        let _guard = SamplingGuard(&self.sampling);

        if self.probe_in_flight.swap(true, Ordering::AcqRel) {
            warn!("Host probe from an earlier tick has not returned, skipping");
            return TickOutcome::ProbeStalled;
        }
        let in_flight = InFlightGuard(self.probe_in_flight.clone());
        let probe = self.probe.clone();
        let task = tokio::task::spawn_blocking(move || {
            let _in_flight = in_flight;
            probe.sample()
        });
        let reading = tokio::time::timeout(self.interval, task).await;

        let snapshot = match reading {
            Ok(Ok(Ok(snapshot))) => snapshot,
            Ok(Ok(Err(e))) => {
                error!("Error collecting metrics: {e:#}");
                return TickOutcome::ProbeFailed;
            }
            Ok(Err(e)) => {
                error!("Host probe task failed: {e}");
                return TickOutcome::ProbeFailed;
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.interval.as_secs_f64(),
                    "Host probe timed out"
                );
                return TickOutcome::ProbeFailed;
            }
        };

        let Some(memory_usage) =
            memory::used_percent(snapshot.memory_used_bytes, snapshot.memory_total_bytes)
        else {
            error!("Error collecting metrics: host reported zero total memory");
            return TickOutcome::ProbeFailed;
        };
        let cpu_load = snapshot.cpu_load_percent;

        self.store.insert(cpu_load, memory_usage).await;
        debug!(cpu_load, memory_usage, "Metrics tick complete");

        TickOutcome::Recorded {
            cpu_load,
            memory_usage,
        }
    }

    /// Start the collection loop on its own task. It runs until the process
    /// exits; the first sample is taken one interval after start.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await; // skip the immediate first tick
            info!(
                interval_secs = self.interval.as_secs(),
                "Metrics collection started"
            );
            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }
}
