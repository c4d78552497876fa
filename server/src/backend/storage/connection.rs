use anyhow::Result;
use log::info;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

use super::repositories::{LedgerRepository, MemberRepository};
use super::traits::Connection;

/// DbConnection manages the SQLite pool and schema
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (and create if needed) the database at `url`
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize a private in-memory database for tests
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // One long-lived connection keeps the in-memory database alive and shared
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                role TEXT NOT NULL,
                monthly_fee INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Timestamps are microseconds since the Unix epoch
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS ledger_entries (
                id TEXT PRIMARY KEY,
                entry_type TEXT NOT NULL,
                status TEXT NOT NULL,
                amount INTEGER NOT NULL,
                month_key TEXT,
                note TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL,
                requested_at INTEGER NOT NULL,
                approved_at INTEGER,
                member_id TEXT,
                requested_by TEXT NOT NULL,
                approved_by TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_ledger_entries_type_month
            ON ledger_entries(entry_type, month_key);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_ledger_entries_status_requested
            ON ledger_entries(status, requested_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        // At most one live zero-paid waiver per member-month
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_ledger_entries_force_zero
            ON ledger_entries(member_id, month_key)
            WHERE source = 'admin_force_zero' AND status = 'approved';
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type LedgerRepository = LedgerRepository;
    type MemberRepository = MemberRepository;

    fn create_ledger_repository(&self) -> Self::LedgerRepository {
        LedgerRepository::new(self.clone())
    }

    fn create_member_repository(&self) -> Self::MemberRepository {
        MemberRepository::new(self.clone())
    }
}
