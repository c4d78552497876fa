use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use sqlx::{
    query::Query,
    sqlite::{SqliteArguments, SqliteRow},
    QueryBuilder, Row, Sqlite,
};

use super::{from_micros, is_unique_violation, to_micros};
use crate::backend::domain::models::{
    ApprovedTotals, DepositDetails, EntryKind, EntrySource, EntryStatus, EntryType, LedgerEntry,
    MonthKey,
};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::{CascadeGuard, CascadeInsert, EntryUpdate, LedgerStorage};

const ENTRY_COLUMNS: &str = "id, entry_type, status, amount, month_key, note, source, \
     requested_at, approved_at, member_id, requested_by, approved_by";

/// Repository for ledger entries
#[derive(Clone)]
pub struct LedgerRepository {
    db: DbConnection,
}

impl LedgerRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn bind_entry<'q>(
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
        entry: &'q LedgerEntry,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(&entry.id)
            .bind(entry.entry_type().as_str())
            .bind(entry.status().as_str())
            .bind(entry.amount)
            .bind(entry.month_key().map(|key| key.to_string()))
            .bind(&entry.note)
            .bind(entry.source().as_str())
            .bind(to_micros(entry.requested_at))
            .bind(entry.approved_at.map(to_micros))
            .bind(entry.member_id.as_deref())
            .bind(&entry.requested_by)
            .bind(entry.approved_by.as_deref())
    }

    fn insert_query(entry: &LedgerEntry) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        Self::bind_entry(
            sqlx::query(
                r#"
                INSERT INTO ledger_entries (
                    id, entry_type, status, amount, month_key, note, source,
                    requested_at, approved_at, member_id, requested_by, approved_by
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            ),
            entry,
        )
    }

    /// Insert that only happens while the member-month's approved deposits
    /// still sum to `approved_total`
    fn guarded_insert_query<'q>(
        entry: &'q LedgerEntry,
        member_id: &'q str,
        month_key: MonthKey,
        approved_total: i64,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        Self::bind_entry(
            sqlx::query(
                r#"
                INSERT INTO ledger_entries (
                    id, entry_type, status, amount, month_key, note, source,
                    requested_at, approved_at, member_id, requested_by, approved_by
                )
                SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
                WHERE (
                    SELECT COALESCE(SUM(amount), 0)
                    FROM ledger_entries
                    WHERE entry_type = 'deposit'
                      AND status = 'approved'
                      AND member_id = ?
                      AND month_key = ?
                ) = ?
                "#,
            ),
            entry,
        )
        .bind(member_id)
        .bind(month_key.to_string())
        .bind(approved_total)
    }

    fn row_to_entry(row: &SqliteRow) -> Result<LedgerEntry> {
        let id: String = row.try_get("id")?;
        let entry_type: EntryType = row.try_get::<String, _>("entry_type")?.parse()?;

        let kind = match entry_type {
            EntryType::Deposit => {
                let month_key: Option<String> = row.try_get("month_key")?;
                let month_key = month_key
                    .ok_or_else(|| anyhow!("deposit {} has no month key", id))?;
                EntryKind::Deposit(DepositDetails {
                    month_key: MonthKey::parse(&month_key)?,
                    status: row.try_get::<String, _>("status")?.parse()?,
                    source: row.try_get::<String, _>("source")?.parse()?,
                })
            }
            EntryType::Withdrawal => EntryKind::Withdrawal,
            EntryType::Adjustment => EntryKind::Adjustment,
        };

        let approved_at: Option<i64> = row.try_get("approved_at")?;

        Ok(LedgerEntry {
            id,
            kind,
            amount: row.try_get("amount")?,
            note: row.try_get("note")?,
            requested_at: from_micros(row.try_get("requested_at")?)?,
            approved_at: approved_at.map(from_micros).transpose()?,
            member_id: row.try_get("member_id")?,
            requested_by: row.try_get("requested_by")?,
            approved_by: row.try_get("approved_by")?,
        })
    }

    fn rows_to_entries(rows: &[SqliteRow]) -> Result<Vec<LedgerEntry>> {
        rows.iter().map(Self::row_to_entry).collect()
    }
}

#[async_trait]
impl LedgerStorage for LedgerRepository {
    async fn insert_entry(&self, entry: &LedgerEntry) -> Result<()> {
        Self::insert_query(entry).execute(self.db.pool()).await?;
        Ok(())
    }

    async fn insert_entry_rejecting_pending(
        &self,
        entry: &LedgerEntry,
        decided_by: &str,
        guard: CascadeGuard,
    ) -> Result<CascadeInsert> {
        let insert = match guard {
            CascadeGuard::Unconditional => Self::insert_query(entry),
            CascadeGuard::ApprovedTotal(approved_total) => {
                let (Some(member_id), Some(month_key)) = (entry.member_id.as_deref(), entry.month_key())
                else {
                    return Err(anyhow!("guarded insert of {} needs a member and month", entry.id));
                };
                Self::guarded_insert_query(entry, member_id, month_key, approved_total)
            }
        };

        let mut tx = self.db.pool().begin().await?;

        match insert.execute(&mut *tx).await {
            Ok(result) if result.rows_affected() == 0 => {
                warn!("Approved deposits changed before entry {} was stored", entry.id);
                tx.rollback().await?;
                return Ok(CascadeInsert::Stale);
            }
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                warn!("Refused duplicate entry {} ({})", entry.id, entry.source().as_str());
                tx.rollback().await?;
                return Ok(CascadeInsert::Duplicate);
            }
            Err(err) => return Err(err.into()),
        }

        let rejected = match (entry.member_id.as_deref(), entry.month_key()) {
            (Some(member_id), Some(month_key)) => sqlx::query(
                r#"
                UPDATE ledger_entries
                SET status = 'rejected', approved_at = NULL, approved_by = ?
                WHERE id <> ?
                  AND entry_type = 'deposit'
                  AND status = 'pending'
                  AND member_id = ?
                  AND month_key = ?
                "#,
            )
            .bind(decided_by)
            .bind(&entry.id)
            .bind(member_id)
            .bind(month_key.to_string())
            .execute(&mut *tx)
            .await?
            .rows_affected(),
            _ => 0,
        };

        tx.commit().await?;
        debug!("Inserted entry {} and rejected {} pending deposit(s)", entry.id, rejected);
        Ok(CascadeInsert::Inserted { rejected })
    }

    async fn get_entry(&self, entry_id: &str) -> Result<Option<LedgerEntry>> {
        let sql = format!("SELECT {} FROM ledger_entries WHERE id = ?", ENTRY_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(entry_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn update_entry(&self, entry: &LedgerEntry) -> Result<EntryUpdate> {
        let result = sqlx::query(
            r#"
            UPDATE ledger_entries
            SET status = ?, amount = ?, month_key = ?, note = ?, source = ?,
                approved_at = ?, approved_by = ?
            WHERE id = ?
            "#,
        )
        .bind(entry.status().as_str())
        .bind(entry.amount)
        .bind(entry.month_key().map(|key| key.to_string()))
        .bind(&entry.note)
        .bind(entry.source().as_str())
        .bind(entry.approved_at.map(to_micros))
        .bind(entry.approved_by.as_deref())
        .bind(&entry.id)
        .execute(self.db.pool())
        .await;

        match result {
            Ok(done) if done.rows_affected() > 0 => Ok(EntryUpdate::Updated),
            Ok(_) => Ok(EntryUpdate::Missing),
            Err(err) if is_unique_violation(&err) => {
                warn!("Refused update of entry {}: duplicate", entry.id);
                Ok(EntryUpdate::Duplicate)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn decide_pending_deposit(
        &self,
        entry_id: &str,
        status: EntryStatus,
        approved_at: Option<DateTime<Utc>>,
        decided_by: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE ledger_entries
            SET status = ?, approved_at = ?, approved_by = ?
            WHERE id = ? AND entry_type = 'deposit' AND status = 'pending'
            "#,
        )
        .bind(status.as_str())
        .bind(approved_at.map(to_micros))
        .bind(decided_by)
        .bind(entry_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reject_approved_deposits(&self, member_id: &str, month_key: MonthKey) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE ledger_entries
            SET status = 'rejected', approved_at = NULL, approved_by = NULL
            WHERE entry_type = 'deposit'
              AND status = 'approved'
              AND member_id = ?
              AND month_key = ?
            "#,
        )
        .bind(member_id)
        .bind(month_key.to_string())
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_entry(&self, entry_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ledger_entries WHERE id = ?")
            .bind(entry_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_deposits_for_months(&self, month_keys: &[MonthKey]) -> Result<Vec<LedgerEntry>> {
        if month_keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM ledger_entries WHERE entry_type = 'deposit' AND month_key IN (",
            ENTRY_COLUMNS
        ));
        let mut keys = builder.separated(", ");
        for month_key in month_keys {
            keys.push_bind(month_key.to_string());
        }
        keys.push_unseparated(") ORDER BY requested_at ASC, id ASC");

        let rows = builder.build().fetch_all(self.db.pool()).await?;
        Self::rows_to_entries(&rows)
    }

    async fn list_member_month_deposits(
        &self,
        member_id: &str,
        month_key: MonthKey,
    ) -> Result<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {} FROM ledger_entries \
             WHERE entry_type = 'deposit' AND member_id = ? AND month_key = ? \
             ORDER BY requested_at ASC, id ASC",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(member_id)
            .bind(month_key.to_string())
            .fetch_all(self.db.pool())
            .await?;
        Self::rows_to_entries(&rows)
    }

    async fn list_recent_entries(
        &self,
        limit: u32,
        excluded_source: EntrySource,
    ) -> Result<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {} FROM ledger_entries \
             WHERE source <> ? \
             ORDER BY requested_at DESC, id DESC \
             LIMIT ?",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(excluded_source.as_str())
            .bind(i64::from(limit))
            .fetch_all(self.db.pool())
            .await?;
        Self::rows_to_entries(&rows)
    }

    async fn approved_totals_before(
        &self,
        before: Option<(DateTime<Utc>, &str)>,
    ) -> Result<ApprovedTotals> {
        let rows = match before {
            Some((requested_at, id)) => {
                let micros = to_micros(requested_at);
                sqlx::query(
                    r#"
                    SELECT entry_type, SUM(amount) AS total
                    FROM ledger_entries
                    WHERE status = 'approved'
                      AND (requested_at < ? OR (requested_at = ? AND id < ?))
                    GROUP BY entry_type
                    "#,
                )
                .bind(micros)
                .bind(micros)
                .bind(id)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT entry_type, SUM(amount) AS total
                    FROM ledger_entries
                    WHERE status = 'approved'
                    GROUP BY entry_type
                    "#,
                )
                .fetch_all(self.db.pool())
                .await?
            }
        };

        let mut totals = ApprovedTotals::default();
        for row in &rows {
            let entry_type: EntryType = row.try_get::<String, _>("entry_type")?.parse()?;
            let total: i64 = row.try_get("total")?;
            totals.add(entry_type, total);
        }
        Ok(totals)
    }

    async fn list_approved_requested_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {} FROM ledger_entries \
             WHERE status = 'approved' AND requested_at >= ? AND requested_at < ? \
             ORDER BY requested_at ASC, id ASC",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(to_micros(start))
            .bind(to_micros(end))
            .fetch_all(self.db.pool())
            .await?;
        Self::rows_to_entries(&rows)
    }
}
