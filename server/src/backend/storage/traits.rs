//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::backend::domain::models::{
    ApprovedTotals, EntrySource, EntryStatus, LedgerEntry, Member, MonthKey,
};

/// Outcome of [`LedgerStorage::insert_entry_rejecting_pending`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeInsert {
    /// Entry stored; `rejected` sibling pending deposits were rejected
    Inserted { rejected: u64 },
    /// A uniqueness rule refused the entry; nothing was written
    Duplicate,
    /// The [`CascadeGuard`] no longer held; nothing was written
    Stale,
}

/// Precondition re-checked inside the cascade's transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeGuard {
    /// Insert unless a uniqueness rule refuses it
    Unconditional,
    /// Insert only while the approved deposits of the entry's member-month
    /// still sum to this amount
    ApprovedTotal(i64),
}

/// Outcome of [`LedgerStorage::update_entry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryUpdate {
    Updated,
    Missing,
    /// A uniqueness rule refused the new values; nothing changed
    Duplicate,
}

/// Trait defining the interface for ledger entry storage operations
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Store a new entry
    async fn insert_entry(&self, entry: &LedgerEntry) -> Result<()>;

    /// Store a new member deposit and reject every other pending deposit for
    /// the same member and month, atomically. `guard` is evaluated by the
    /// insert itself, so concurrent callers cannot both pass it.
    async fn insert_entry_rejecting_pending(
        &self,
        entry: &LedgerEntry,
        decided_by: &str,
        guard: CascadeGuard,
    ) -> Result<CascadeInsert>;

    /// Retrieve a specific entry by ID
    async fn get_entry(&self, entry_id: &str) -> Result<Option<LedgerEntry>>;

    /// Overwrite an existing entry
    async fn update_entry(&self, entry: &LedgerEntry) -> Result<EntryUpdate>;

    /// Move a deposit out of `pending`. Only succeeds while the deposit is
    /// still pending, so concurrent decisions cannot both win.
    async fn decide_pending_deposit(
        &self,
        entry_id: &str,
        status: EntryStatus,
        approved_at: Option<DateTime<Utc>>,
        decided_by: &str,
    ) -> Result<bool>;

    /// Revert every approved deposit of a member-month to rejected
    /// Returns the number of entries changed
    async fn reject_approved_deposits(&self, member_id: &str, month_key: MonthKey) -> Result<u64>;

    /// Hard delete; returns true if the entry existed
    async fn delete_entry(&self, entry_id: &str) -> Result<bool>;

    /// All deposits whose due month is one of `month_keys`
    async fn list_deposits_for_months(&self, month_keys: &[MonthKey]) -> Result<Vec<LedgerEntry>>;

    /// All deposits of one member for one due month
    async fn list_member_month_deposits(
        &self,
        member_id: &str,
        month_key: MonthKey,
    ) -> Result<Vec<LedgerEntry>>;

    /// Most recent entries first, ordered by (requested_at, id) descending,
    /// skipping entries with `excluded_source`
    async fn list_recent_entries(
        &self,
        limit: u32,
        excluded_source: EntrySource,
    ) -> Result<Vec<LedgerEntry>>;

    /// Approved amounts grouped by type, restricted to entries strictly
    /// before `before` in (requested_at, id) order when given
    async fn approved_totals_before(
        &self,
        before: Option<(DateTime<Utc>, &str)>,
    ) -> Result<ApprovedTotals>;

    /// Approved entries requested in `[start, end)`
    async fn list_approved_requested_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>>;
}

/// Trait defining the interface for the member directory
#[async_trait]
pub trait MemberStorage: Send + Sync {
    /// Store a new member
    async fn store_member(&self, member: &Member) -> Result<()>;

    /// Retrieve a specific member by ID
    async fn get_member(&self, member_id: &str) -> Result<Option<Member>>;

    /// Retrieve a member by exact name
    async fn get_member_by_name(&self, name: &str) -> Result<Option<Member>>;

    /// List all members ordered by name
    async fn list_members(&self) -> Result<Vec<Member>>;

    /// Set a member's monthly fee; returns false if the member does not exist
    async fn update_monthly_fee(&self, member_id: &str, monthly_fee: i64) -> Result<bool>;
}

/// Trait defining the interface for storage connections
///
/// This trait abstracts away the specific connection type and provides
/// factory methods for creating repositories. This allows the domain
/// layer to work with any storage backend without knowing the implementation details.
pub trait Connection: Send + Sync + Clone + 'static {
    type LedgerRepository: LedgerStorage + Clone;
    type MemberRepository: MemberStorage + Clone;

    fn create_ledger_repository(&self) -> Self::LedgerRepository;

    fn create_member_repository(&self) -> Self::MemberRepository;
}
