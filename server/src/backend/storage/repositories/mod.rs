pub mod ledger_repository;
pub mod member_repository;

pub use ledger_repository::LedgerRepository;
pub use member_repository::MemberRepository;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

/// Timestamps are persisted as microseconds since the Unix epoch
pub(crate) fn to_micros(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_micros()
}

pub(crate) fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::from_timestamp(secs, nanos).ok_or_else(|| anyhow!("timestamp out of range: {}", micros))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}
