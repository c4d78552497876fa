//! Domain model for a ledger entry.
//!
//! Every money movement is one `LedgerEntry`. Fields that only make sense for
//! deposits (due month, lifecycle status, provenance) live in
//! [`DepositDetails`] inside [`EntryKind::Deposit`]; withdrawals and
//! adjustments are always approved and carry a fixed source.
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

use super::month_key::MonthKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Deposit,
    Withdrawal,
    Adjustment,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Deposit => "deposit",
            EntryType::Withdrawal => "withdrawal",
            EntryType::Adjustment => "adjustment",
        }
    }

    /// Check an amount against the sign rules of this entry type.
    pub fn validate_amount(&self, amount: i64) -> Result<(), String> {
        match self {
            EntryType::Deposit | EntryType::Withdrawal if amount <= 0 => {
                Err("amount must be a positive number".to_string())
            }
            EntryType::Adjustment if amount == 0 => Err("amount must be non-zero".to_string()),
            _ => Ok(()),
        }
    }
}

impl FromStr for EntryType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(EntryType::Deposit),
            "withdrawal" => Ok(EntryType::Withdrawal),
            "adjustment" => Ok(EntryType::Adjustment),
            other => Err(anyhow!("unknown entry type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    Pending,
    Approved,
    Rejected,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Approved => "approved",
            EntryStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for EntryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EntryStatus::Pending),
            "approved" => Ok(EntryStatus::Approved),
            "rejected" => Ok(EntryStatus::Rejected),
            other => Err(anyhow!("unknown entry status: {}", other)),
        }
    }
}

/// Provenance tag of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    UserRequest,
    AdminDirect,
    AdminSponsorship,
    AdminForcePaid,
    AdminForceZero,
    AdminWithdrawal,
    AdminAdjustment,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::UserRequest => "user_request",
            EntrySource::AdminDirect => "admin_direct",
            EntrySource::AdminSponsorship => "admin_sponsorship",
            EntrySource::AdminForcePaid => "admin_force_paid",
            EntrySource::AdminForceZero => "admin_force_zero",
            EntrySource::AdminWithdrawal => "admin_withdrawal",
            EntrySource::AdminAdjustment => "admin_adjustment",
        }
    }
}

impl FromStr for EntrySource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_request" => Ok(EntrySource::UserRequest),
            "admin_direct" => Ok(EntrySource::AdminDirect),
            "admin_sponsorship" => Ok(EntrySource::AdminSponsorship),
            "admin_force_paid" => Ok(EntrySource::AdminForcePaid),
            "admin_force_zero" => Ok(EntrySource::AdminForceZero),
            "admin_withdrawal" => Ok(EntrySource::AdminWithdrawal),
            "admin_adjustment" => Ok(EntrySource::AdminAdjustment),
            other => Err(anyhow!("unknown entry source: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepositDetails {
    pub month_key: MonthKey,
    pub status: EntryStatus,
    pub source: EntrySource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    Deposit(DepositDetails),
    Withdrawal,
    Adjustment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub id: String,
    pub kind: EntryKind,
    /// Positive for deposits and withdrawals, signed for adjustments
    pub amount: i64,
    pub note: String,
    /// Canonical ordering key
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    /// Owning member; `None` for sponsorships and cash movements
    pub member_id: Option<String>,
    pub requested_by: String,
    pub approved_by: Option<String>,
}

impl LedgerEntry {
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn entry_type(&self) -> EntryType {
        match self.kind {
            EntryKind::Deposit(_) => EntryType::Deposit,
            EntryKind::Withdrawal => EntryType::Withdrawal,
            EntryKind::Adjustment => EntryType::Adjustment,
        }
    }

    pub fn deposit(&self) -> Option<&DepositDetails> {
        match &self.kind {
            EntryKind::Deposit(details) => Some(details),
            _ => None,
        }
    }

    pub fn status(&self) -> EntryStatus {
        match &self.kind {
            EntryKind::Deposit(details) => details.status,
            EntryKind::Withdrawal | EntryKind::Adjustment => EntryStatus::Approved,
        }
    }

    pub fn source(&self) -> EntrySource {
        match &self.kind {
            EntryKind::Deposit(details) => details.source,
            EntryKind::Withdrawal => EntrySource::AdminWithdrawal,
            EntryKind::Adjustment => EntrySource::AdminAdjustment,
        }
    }

    pub fn month_key(&self) -> Option<MonthKey> {
        self.deposit().map(|details| details.month_key)
    }

    pub fn is_approved(&self) -> bool {
        self.status() == EntryStatus::Approved
    }

    /// Signed contribution of this entry to the fund balance.
    pub fn balance_impact(&self) -> i64 {
        if !self.is_approved() {
            return 0;
        }
        match self.kind {
            EntryKind::Deposit(_) | EntryKind::Adjustment => self.amount,
            EntryKind::Withdrawal => -self.amount,
        }
    }

    /// Chronological order: request time, then id for equal timestamps.
    pub fn chronological_cmp(&self, other: &LedgerEntry) -> Ordering {
        self.requested_at
            .cmp(&other.requested_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Approved amounts grouped by entry type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApprovedTotals {
    pub deposits: i64,
    pub withdrawals: i64,
    pub adjustments: i64,
}

impl ApprovedTotals {
    pub fn add(&mut self, entry_type: EntryType, total: i64) {
        match entry_type {
            EntryType::Deposit => self.deposits += total,
            EntryType::Withdrawal => self.withdrawals += total,
            EntryType::Adjustment => self.adjustments += total,
        }
    }

    pub fn balance(&self) -> i64 {
        self.deposits - self.withdrawals + self.adjustments
    }
}
