//! Fixtures shared by the service tests.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use super::fiscal_calendar::FiscalCalendar;
use super::models::{
    DepositDetails, EntryKind, EntrySource, EntryStatus, LedgerEntry, Member, MonthKey, Role,
};
use crate::backend::storage::{Connection, DbConnection, LedgerStorage, MemberStorage};

pub fn calendar() -> FiscalCalendar {
    FiscalCalendar::new(
        MonthKey::parse("2025-10").unwrap(),
        FixedOffset::east_opt(9 * 3600).unwrap(),
    )
}

/// 09:00 UTC on the given day
pub fn utc(year: i32, month: u32, day: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, minute, 0).unwrap()
}

pub async fn seed_member(db: &DbConnection, name: &str, role: Role, monthly_fee: i64) -> Member {
    let member = Member {
        id: Member::generate_id(),
        name: name.to_string(),
        role,
        monthly_fee,
        created_at: Utc::now(),
    };
    db.create_member_repository().store_member(&member).await.unwrap();
    member
}

pub async fn insert(db: &DbConnection, entry: &LedgerEntry) {
    db.create_ledger_repository().insert_entry(entry).await.unwrap();
}

pub fn deposit(
    id: &str,
    member_id: Option<&str>,
    month_key: &str,
    status: EntryStatus,
    source: EntrySource,
    amount: i64,
    requested_at: DateTime<Utc>,
) -> LedgerEntry {
    let approved = status == EntryStatus::Approved;
    LedgerEntry {
        id: id.to_string(),
        kind: EntryKind::Deposit(DepositDetails {
            month_key: MonthKey::parse(month_key).unwrap(),
            status,
            source,
        }),
        amount,
        note: String::new(),
        requested_at,
        approved_at: approved.then_some(requested_at),
        member_id: member_id.map(str::to_string),
        requested_by: member_id.unwrap_or("admin").to_string(),
        approved_by: approved.then(|| "admin".to_string()),
    }
}

pub fn cash(id: &str, kind: EntryKind, amount: i64, requested_at: DateTime<Utc>, admin_id: &str) -> LedgerEntry {
    LedgerEntry {
        id: id.to_string(),
        kind,
        amount,
        note: String::new(),
        requested_at,
        approved_at: Some(requested_at),
        member_id: None,
        requested_by: admin_id.to_string(),
        approved_by: Some(admin_id.to_string()),
    }
}
