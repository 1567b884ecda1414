//! Append-only storage for CPU/memory samples.
//!
//! # Failure contract
//!
//! Storage errors never leave this module. Every public operation logs the
//! underlying `sqlx::Error` and degrades: reads return an empty `Vec`, writes
//! become no-ops. Neither the collector loop nor an API request can be taken
//! down by a database hiccup. The fallible versions live in the private
//! `try_*` functions.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::clock::{Clock, SystemClock};
use crate::retention;

/// One stored observation (or one downsampled bucket).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub id: i64,
    pub cpu_load: f64,
    pub memory_usage: f64,
    pub created_at: DateTime<Utc>,
}

type SampleRow = (i64, f64, f64, i64);

impl MetricSample {
    fn from_row((id, cpu_load, memory_usage, created_at_ms): SampleRow) -> Option<Self> {
        let created_at = Utc.timestamp_millis_opt(created_at_ms).single()?;
        Some(Self {
            id,
            cpu_load,
            memory_usage,
            created_at,
        })
    }
}

/// Handle to the `system_metrics` series. Cheap to clone.
#[derive(Clone)]
pub struct MetricStore {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl MetricStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    /// Create a store whose timestamps come from `clock`.
    pub fn with_clock(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    #[cfg(test)]
    pub(crate) fn pool_for_tests(&self) -> &SqlitePool {
        &self.pool
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Append a sample stamped with the current time, then trim everything
    /// past the retention horizon.
    ///
    /// A failed insert is logged and skips the trim. A failed trim is logged
    /// and leaves the inserted sample in place.
    pub async fn insert(&self, cpu_load: f64, memory_usage: f64) {
        let now = self.now();
        match self.try_insert(cpu_load, memory_usage, now).await {
            Ok(id) => {
                debug!(id, cpu_load, memory_usage, "Stored metric sample");
            }
            Err(e) => {
                error!("metrics: failed to save sample: {e}");
                return;
            }
        }
        retention::delete_expired_samples(&self.pool, retention::cutoff(now)).await;
    }

    /// Delete every sample.
    pub async fn clear(&self) {
        match sqlx::query("DELETE FROM system_metrics")
            .execute(&self.pool)
            .await
        {
            Ok(r) => info!(deleted = r.rows_affected(), "Cleared metrics history"),
            Err(e) => error!("metrics: failed to clear history: {e}"),
        }
    }

    /// Samples created at or after `since`, oldest first.
    pub async fn query_raw(&self, since: DateTime<Utc>) -> Vec<MetricSample> {
        self.try_query_raw(since).await.unwrap_or_else(|e| {
            error!("metrics: failed to read history: {e}");
            Vec::new()
        })
    }

    /// Samples created at or after `since`, averaged into buckets of
    /// `bucket_seconds` aligned to the Unix epoch.
    ///
    /// Each row carries the smallest id and earliest timestamp of its bucket.
    pub async fn query_downsampled(
        &self,
        since: DateTime<Utc>,
        bucket_seconds: u32,
    ) -> Vec<MetricSample> {
        if bucket_seconds == 0 {
            error!("metrics: refusing to downsample with a zero-width bucket");
            return Vec::new();
        }
        self.try_query_downsampled(since, bucket_seconds)
            .await
            .unwrap_or_else(|e| {
                error!("metrics: failed to read downsampled history: {e}");
                Vec::new()
            })
    }

    async fn try_insert(
        &self,
        cpu_load: f64,
        memory_usage: f64,
        now: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO system_metrics (cpu_load, memory_usage, created_at) VALUES (?, ?, ?)"#,
        )
        .bind(cpu_load)
        .bind(memory_usage)
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn try_query_raw(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<MetricSample>, sqlx::Error> {
        let rows: Vec<SampleRow> = sqlx::query_as(
            r#"SELECT id, cpu_load, memory_usage, created_at
               FROM system_metrics
               WHERE created_at >= ?
               ORDER BY created_at ASC, id ASC"#,
        )
        .bind(since.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().filter_map(MetricSample::from_row).collect())
    }

    async fn try_query_downsampled(
        &self,
        since: DateTime<Utc>,
        bucket_seconds: u32,
    ) -> Result<Vec<MetricSample>, sqlx::Error> {
        // created_at is non-negative milliseconds, so integer division floors.
        let bucket_ms = i64::from(bucket_seconds) * 1000;
        let rows: Vec<SampleRow> = sqlx::query_as(
            r#"SELECT MIN(id), AVG(cpu_load), AVG(memory_usage), MIN(created_at)
               FROM system_metrics
               WHERE created_at >= ?
               GROUP BY created_at / ?
               ORDER BY MIN(created_at) ASC"#,
        )
        .bind(since.timestamp_millis())
        .bind(bucket_ms)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().filter_map(MetricSample::from_row).collect())
    }
}
