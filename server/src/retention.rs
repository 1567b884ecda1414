//! Rolling retention for the metrics time series.
//!
//! Trimming happens eagerly after every insert instead of on a periodic
//! sweep, so the table never holds much more than one horizon of samples.

use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::{debug, error};

/// Samples older than this are deleted.
pub fn horizon() -> Duration {
    Duration::hours(48)
}

/// Oldest timestamp still retained at `now`.
pub fn cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - horizon()
}

/// Delete every sample created strictly before `cutoff`.
///
/// Returns the number of rows removed; failures are logged and count as zero.
pub async fn delete_expired_samples(pool: &SqlitePool, cutoff: DateTime<Utc>) -> u64 {
    match sqlx::query(r#"DELETE FROM system_metrics WHERE created_at < ?"#)
        .bind(cutoff.timestamp_millis())
        .execute(pool)
        .await
    {
        Ok(r) => {
            let deleted = r.rows_affected();
            if deleted > 0 {
                debug!(deleted, %cutoff, "retention: trimmed expired samples");
            }
            deleted
        }
        Err(e) => {
            error!("retention: failed to delete expired system_metrics: {e}");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::TimeZone;

    async fn setup_test_db() -> SqlitePool {
        db::init(":memory:")
            .await
            .expect("test DB init failed")
    }

    async fn insert_at(pool: &SqlitePool, at: DateTime<Utc>) {
        sqlx::query(
            r#"INSERT INTO system_metrics (cpu_load, memory_usage, created_at) VALUES (1.0, 2.0, ?)"#,
        )
        .bind(at.timestamp_millis())
        .execute(pool)
        .await
        .unwrap();
    }

    async fn count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM system_metrics")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[test]
    fn test_cutoff_is_48_hours_back() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(
            cutoff(now),
            Utc.with_ymd_and_hms(2026, 3, 8, 12, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_retention_deletes_old_samples() {
        let pool = setup_test_db().await;
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

        // 72 hours old: outside the 48h horizon.
        insert_at(&pool, now - Duration::hours(72)).await;

        let deleted = delete_expired_samples(&pool, cutoff(now)).await;
        assert_eq!(deleted, 1, "Should delete 1 expired sample");
        assert_eq!(count(&pool).await, 0, "No samples should remain");
    }

    #[tokio::test]
    async fn test_retention_keeps_recent_samples() {
        let pool = setup_test_db().await;
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();

        insert_at(&pool, now - Duration::hours(1)).await;
        // Exactly on the horizon is still retained.
        insert_at(&pool, cutoff(now)).await;

        let deleted = delete_expired_samples(&pool, cutoff(now)).await;
        assert_eq!(deleted, 0, "Should not delete samples within 48h");
        assert_eq!(count(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_retention_failure_counts_as_zero() {
        let pool = setup_test_db().await;
        pool.close().await;

        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(delete_expired_samples(&pool, cutoff(now)).await, 0);
    }
}
