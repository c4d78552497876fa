//! Per member-month payment status.
//!
//! A [`MonthCell`] folds every deposit credited to one member for one month
//! and classifies the result. Donation cells fold sponsorship deposits and
//! always report [`PaymentStatus::Donation`].

use chrono::{DateTime, Utc};

use super::models::{EntrySource, EntryStatus, LedgerEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Partial,
    Pending,
    Unpaid,
    Donation,
}

impl PaymentStatus {
    /// Status for a member-month, highest priority rule first.
    pub fn classify(
        due_amount: i64,
        amount: i64,
        approved_count: u32,
        pending_amount: i64,
        force_zero_paid: bool,
    ) -> Self {
        if force_zero_paid {
            return PaymentStatus::Paid;
        }

        if due_amount == 0 {
            return if approved_count > 0 {
                PaymentStatus::Paid
            } else if pending_amount > 0 {
                PaymentStatus::Pending
            } else {
                PaymentStatus::Unpaid
            };
        }

        if amount >= due_amount {
            PaymentStatus::Paid
        } else if amount > 0 {
            PaymentStatus::Partial
        } else if pending_amount > 0 {
            PaymentStatus::Pending
        } else {
            PaymentStatus::Unpaid
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthCell {
    /// Sum of approved deposits
    pub amount: i64,
    pub approved_count: u32,
    pub due_amount: i64,
    pub remaining_amount: i64,
    pub pending_amount: i64,
    pub force_zero_paid: bool,
    pub status: PaymentStatus,
    /// Latest request over every folded deposit
    pub requested_at: Option<DateTime<Utc>>,
    /// Latest approval over approved deposits
    pub approved_at: Option<DateTime<Utc>>,
}

impl MonthCell {
    pub fn new(due_amount: i64) -> Self {
        Self {
            amount: 0,
            approved_count: 0,
            due_amount,
            remaining_amount: due_amount.max(0),
            pending_amount: 0,
            force_zero_paid: false,
            status: PaymentStatus::Unpaid,
            requested_at: None,
            approved_at: None,
        }
    }

    pub fn donation() -> Self {
        Self {
            status: PaymentStatus::Donation,
            ..Self::new(0)
        }
    }

    /// Fold one deposit into the cell. Non-deposits are ignored.
    pub fn absorb(&mut self, entry: &LedgerEntry) {
        let Some(details) = entry.deposit() else {
            return;
        };

        match details.status {
            EntryStatus::Approved => {
                self.amount += entry.amount;
                self.approved_count += 1;
                if entry.approved_at > self.approved_at {
                    self.approved_at = entry.approved_at;
                }
                if details.source == EntrySource::AdminForceZero {
                    self.force_zero_paid = true;
                }
            }
            EntryStatus::Pending => self.pending_amount += entry.amount,
            EntryStatus::Rejected => {}
        }

        if self.requested_at.map_or(true, |latest| entry.requested_at > latest) {
            self.requested_at = Some(entry.requested_at);
        }
    }

    /// Recompute the derived fields of a member cell
    pub fn settle(&mut self) {
        self.remaining_amount = (self.due_amount - self.amount).max(0);
        self.status = PaymentStatus::classify(
            self.due_amount,
            self.amount,
            self.approved_count,
            self.pending_amount,
            self.force_zero_paid,
        );
    }

    /// Donation cells carry no due amount
    pub fn settle_donation(&mut self) {
        self.due_amount = 0;
        self.remaining_amount = 0;
        self.status = PaymentStatus::Donation;
    }

    pub fn fold<'a>(due_amount: i64, entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Self {
        let mut cell = Self::new(due_amount);
        for entry in entries {
            cell.absorb(entry);
        }
        cell.settle();
        cell
    }

    pub fn fold_donation<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Self {
        let mut cell = Self::donation();
        for entry in entries {
            cell.absorb(entry);
        }
        cell.settle_donation();
        cell
    }
}
