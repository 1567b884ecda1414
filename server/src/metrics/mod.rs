//! Host metrics pipeline.
//!
//! ```text
//!  HostProbe ──► Collector ──► MetricStore ──► HistoryService ──► /api/metrics/history
//!               (every 10s)   (48h retention)   (1h raw, 24h per-minute)
//! ```

pub mod collector;
pub mod history;
pub mod store;

pub use collector::{Collector, CollectorState, TickOutcome, COLLECT_INTERVAL};
pub use history::{HistoryRange, HistoryService};
pub use store::{MetricSample, MetricStore};
