use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Migrations embedded at compile time, applied in order.
const MIGRATIONS: &[(i64, &str, &str)] = &[(
    1,
    "001_system_metrics.sql",
    include_str!("migrations/001_system_metrics.sql"),
)];

/// Initialize the SQLite database pool and run migrations.
pub async fn init(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run migrations manually (avoids compile-time DATABASE_URL requirement).
    run_migrations(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Apply migrations using a simple version-tracking approach.
pub(crate) async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (\
         version INTEGER PRIMARY KEY, \
         applied_at TEXT NOT NULL DEFAULT (datetime('now')))",
    )
    .execute(pool)
    .await?;

    for &(version, name, sql) in MIGRATIONS {
        let applied: bool = sqlx::query("SELECT 1 FROM _migrations WHERE version = ?")
            .bind(version)
            .fetch_optional(pool)
            .await?
            .is_some();
        if applied {
            continue;
        }

        for statement in sql.split(';') {
            // Strip leading comment lines to get to the actual SQL.
            let code = statement
                .lines()
                .skip_while(|l| l.trim().starts_with("--") || l.trim().is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            let stmt = code.trim();
            if stmt.is_empty() {
                continue;
            }
            sqlx::query(stmt).execute(pool).await?;
        }

        sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
            .bind(version)
            .execute(pool)
            .await?;

        info!(migration = %name, "Applied migration");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_apply_cleanly() {
        let pool = init(":memory:").await.expect("DB init failed");

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='system_metrics'",
        )
        .fetch_one(&pool)
        .await
        .expect("Query failed");
        assert_eq!(count, 1, "system_metrics should exist after migration");

        let index: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name='idx_system_metrics_created_at'",
        )
        .fetch_one(&pool)
        .await
        .expect("Query failed");
        assert_eq!(index, 1, "created_at index should exist for range scans");
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let pool = init(":memory:").await.expect("First init failed");
        run_migrations(&pool)
            .await
            .expect("Second migration run should succeed");

        let versions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(&pool)
            .await
            .expect("Query failed");
        assert_eq!(versions as usize, MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_migration_version_recorded() {
        let pool = init(":memory:").await.expect("DB init failed");

        let version: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations WHERE version = 1")
            .fetch_one(&pool)
            .await
            .expect("Query failed");

        assert_eq!(version, 1, "Migration version 1 should be recorded");
    }
}
