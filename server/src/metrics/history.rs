//! Named history windows over the metric store.

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::store::{MetricSample, MetricStore};

/// Bucket width used for the 24h view.
pub const DOWNSAMPLE_BUCKET_SECS: u32 = 60;

/// Window of history a client can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryRange {
    /// Last hour at native resolution.
    #[default]
    OneHour,
    /// Last day, one point per minute.
    TwentyFourHours,
}

impl HistoryRange {
    /// Lenient parse: anything that is not a known range means `1h`.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("24h") => Self::TwentyFourHours,
            _ => Self::OneHour,
        }
    }

    pub fn window(&self) -> Duration {
        match self {
            Self::OneHour => Duration::hours(1),
            Self::TwentyFourHours => Duration::hours(24),
        }
    }
}

/// Start of the first bucket that lies entirely after `since`.
///
/// The bucket containing `since` is dropped even when `since` sits exactly on
/// a boundary, because the bucket containing "now" is already counted. A
/// window of `n` buckets therefore never yields more than `n` rows.
pub fn first_whole_bucket(since: DateTime<Utc>, bucket_seconds: u32) -> DateTime<Utc> {
    let bucket_ms = i64::from(bucket_seconds.max(1)) * 1000;
    let start_ms = (since.timestamp_millis().div_euclid(bucket_ms) + 1) * bucket_ms;
    let start = Utc.timestamp_millis_opt(start_ms);
    start.single().unwrap_or(since)
}

/// Read side of the metrics pipeline.
#[derive(Clone)]
pub struct HistoryService {
    store: MetricStore,
}

impl HistoryService {
    pub fn new(store: MetricStore) -> Self {
        Self { store }
    }

    /// Samples for `range`, oldest first. Empty when storage is unavailable.
    pub async fn get_history(&self, range: HistoryRange) -> Vec<MetricSample> {
        let since = self.store.now() - range.window();
        match range {
            HistoryRange::OneHour => self.store.query_raw(since).await,
            HistoryRange::TwentyFourHours => {
                let start = first_whole_bucket(since, DOWNSAMPLE_BUCKET_SECS);
                self.store
                    .query_downsampled(start, DOWNSAMPLE_BUCKET_SECS)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::db;
    use std::sync::Arc;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    async fn setup() -> (MetricStore, HistoryService, Arc<ManualClock>) {
        let pool = db::init(":memory:")
            .await
            .expect("in-memory DB init failed");
        let clock = Arc::new(ManualClock::new(start()));
        let store = MetricStore::with_clock(pool, clock.clone());
        (store.clone(), HistoryService::new(store), clock)
    }

    fn values(rows: &[MetricSample]) -> Vec<(f64, f64)> {
        rows.iter().map(|s| (s.cpu_load, s.memory_usage)).collect()
    }

    #[test]
    fn test_parse_falls_back_to_one_hour() {
        assert_eq!(HistoryRange::parse(None), HistoryRange::OneHour);
        assert_eq!(HistoryRange::parse(Some("1h")), HistoryRange::OneHour);
        assert_eq!(
            HistoryRange::parse(Some("24h")),
            HistoryRange::TwentyFourHours
        );
        assert_eq!(HistoryRange::parse(Some("bogus")), HistoryRange::OneHour);
        assert_eq!(HistoryRange::parse(Some("")), HistoryRange::OneHour);
    }

    #[tokio::test]
    async fn test_one_hour_returns_raw_samples_in_order() {
        let (store, history, clock) = setup().await;

        store.insert(10.0, 20.0).await;
        clock.advance(Duration::seconds(30));
        store.insert(30.0, 40.0).await;
        clock.advance(Duration::seconds(10));

        let rows = history.get_history(HistoryRange::OneHour).await;
        assert_eq!(values(&rows), vec![(10.0, 20.0), (30.0, 40.0)]);
    }

    #[tokio::test]
    async fn test_one_hour_excludes_older_samples() {
        let (store, history, clock) = setup().await;

        store.insert(1.0, 1.0).await;
        clock.advance(Duration::minutes(61));
        store.insert(2.0, 2.0).await;

        let rows = history.get_history(HistoryRange::OneHour).await;
        assert_eq!(values(&rows), vec![(2.0, 2.0)]);
    }

    #[tokio::test]
    async fn test_twenty_four_hours_is_one_point_per_minute() {
        let (store, history, clock) = setup().await;

        for (cpu, mem) in [(10.0, 20.0), (20.0, 30.0), (30.0, 40.0)] {
            store.insert(cpu, mem).await;
            clock.advance(Duration::minutes(1));
        }

        let rows = history.get_history(HistoryRange::TwentyFourHours).await;
        assert_eq!(
            rows.iter().map(|s| s.cpu_load).collect::<Vec<_>>(),
            vec![10.0, 20.0, 30.0]
        );
    }

    #[tokio::test]
    async fn test_twenty_four_hours_is_bounded_by_minutes_in_a_day() {
        let (store, history, clock) = setup().await;

        // Two samples per minute for a little over a day.
        for _ in 0..(2 * 1450) {
            store.insert(5.0, 5.0).await;
            clock.advance(Duration::seconds(30));
        }

        let rows = history.get_history(HistoryRange::TwentyFourHours).await;
        assert!(rows.len() <= 1440, "got {} rows", rows.len());
        assert!(rows.len() >= 1439, "got {} rows", rows.len());
        assert!(rows.windows(2).all(|w| w[0].created_at < w[1].created_at));
    }

    #[tokio::test]
    async fn test_twenty_four_hours_on_minute_boundary_caps_at_1440() {
        let (store, history, clock) = setup().await;

        // One sample per minute from 00:00 through exactly 24h later, so both
        // ends of the window land on a minute boundary.
        for i in 0..=1440 {
            store.insert(f64::from(i % 100), 50.0).await;
            if i < 1440 {
                clock.advance(Duration::minutes(1));
            }
        }
        assert_eq!(store.now(), start() + Duration::hours(24));

        let rows = history.get_history(HistoryRange::TwentyFourHours).await;
        assert_eq!(rows.len(), 1440);
        assert_eq!(rows[0].created_at, start() + Duration::minutes(1));
        assert_eq!(rows[1439].created_at, start() + Duration::hours(24));
    }

    #[tokio::test]
    async fn test_twenty_four_hours_off_boundary_caps_at_1440() {
        let (store, history, clock) = setup().await;

        clock.advance(Duration::seconds(25));
        for _ in 0..=1440 {
            store.insert(1.0, 1.0).await;
            clock.advance(Duration::minutes(1));
        }

        let rows = history.get_history(HistoryRange::TwentyFourHours).await;
        assert!(rows.len() <= 1440, "got {} rows", rows.len());
    }

    #[test]
    fn test_first_whole_bucket() {
        let aligned = start() + Duration::minutes(5);
        assert_eq!(
            first_whole_bucket(aligned, 60),
            start() + Duration::minutes(6)
        );

        let mid = start() + Duration::seconds(5 * 60 + 30);
        assert_eq!(
            first_whole_bucket(mid, 60),
            start() + Duration::minutes(6)
        );
    }

    #[tokio::test]
    async fn test_bogus_range_matches_one_hour() {
        let (store, history, clock) = setup().await;
        store.insert(10.0, 20.0).await;
        clock.advance(Duration::seconds(30));
        store.insert(30.0, 40.0).await;

        let bogus = history.get_history(HistoryRange::parse(Some("bogus"))).await;
        let hour = history.get_history(HistoryRange::OneHour).await;
        assert_eq!(bogus, hour);
    }
}
