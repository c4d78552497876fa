//! Ledger command handlers.
//!
//! Every mutation validates its input before touching the store. Handlers
//! take the acting [`Actor`] for attribution only; who may call what is decided
//! by the HTTP layer.
//!
//! ## Force commands
//!
//! - **force-paid** tops a member-month up to the monthly fee with one
//!   approved deposit and rejects the member's other pending requests for that
//!   month.
//! - **force-zero-paid** waives a month with an approved deposit of 0. At
//!   most one such waiver may be live per member-month.
//! - **force-unpaid** reverts every approved deposit of a member-month.
//!
//! The two creating commands go through
//! [`LedgerStorage::insert_entry_rejecting_pending`] so the insert and the
//! rejection of pending siblings land together. Force-paid also passes the
//! approved total it computed the top-up from; the store refuses the insert
//! if that total moved in the meantime.

use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use super::commands::deposits::{
    AdminDepositCommand, Decision, DecisionResult, DepositTarget, ForcePaidResult,
    MemberMonthCommand, RequestDepositCommand,
};
use super::commands::entries::{CashMovementCommand, UpdateEntryCommand};
use super::error::{LedgerError, LedgerResult};
use super::models::{
    Actor, DepositDetails, EntryKind, EntrySource, EntryStatus, EntryType, LedgerEntry, Member,
    MonthKey,
};
use crate::backend::storage::{
    CascadeGuard, CascadeInsert, Connection, EntryUpdate, LedgerStorage, MemberStorage,
};

const FORCE_PAID_NOTE: &str = "Marked as paid by admin";
const FORCE_ZERO_NOTE: &str = "Marked as paid with no amount due";

#[derive(Clone)]
pub struct LedgerService<C: Connection> {
    ledger_repository: C::LedgerRepository,
    member_repository: C::MemberRepository,
}

impl<C: Connection> LedgerService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let ledger_repository = connection.create_ledger_repository();
        let member_repository = connection.create_member_repository();
        Self {
            ledger_repository,
            member_repository,
        }
    }

    /// A member asks for a deposit to be credited; it stays pending until decided.
    pub async fn request_deposit(
        &self,
        actor: &Actor,
        command: RequestDepositCommand,
    ) -> LedgerResult<LedgerEntry> {
        validate_amount(EntryType::Deposit, command.amount)?;
        let month_key = MonthKey::parse(command.month_key.trim())?;
        let member = self.require_member(&actor.member_id).await?;

        let entry = LedgerEntry {
            id: LedgerEntry::generate_id(),
            kind: EntryKind::Deposit(DepositDetails {
                month_key,
                status: EntryStatus::Pending,
                source: EntrySource::UserRequest,
            }),
            amount: command.amount,
            note: command.note.trim().to_string(),
            requested_at: Utc::now(),
            approved_at: None,
            member_id: Some(member.id.clone()),
            requested_by: member.id,
            approved_by: None,
        };

        self.ledger_repository.insert_entry(&entry).await?;
        info!("Deposit request {} for {}: {}", entry.id, month_key, entry.amount);
        Ok(entry)
    }

    /// An admin records an already-received deposit, for a member or as a donation.
    pub async fn admin_deposit(
        &self,
        actor: &Actor,
        command: AdminDepositCommand,
    ) -> LedgerResult<LedgerEntry> {
        validate_amount(EntryType::Deposit, command.amount)?;
        let month_key = MonthKey::parse(command.month_key.trim())?;

        let (member_id, source) = match &command.target {
            DepositTarget::Member(member_id) => {
                let member = self.require_member(member_id).await?;
                (Some(member.id), EntrySource::AdminDirect)
            }
            DepositTarget::Donation => (None, EntrySource::AdminSponsorship),
        };

        let entry = approved_deposit(actor, member_id, month_key, source, command.amount, &command.note);
        self.ledger_repository.insert_entry(&entry).await?;
        info!(
            "Admin deposit {} ({}) for {}: {}",
            entry.id,
            source.as_str(),
            month_key,
            entry.amount
        );
        Ok(entry)
    }

    /// Approve or reject a pending deposit. A deposit is decided once.
    pub async fn decide_deposit(
        &self,
        actor: &Actor,
        entry_id: &str,
        decision: Decision,
    ) -> LedgerResult<DecisionResult> {
        let entry = self
            .ledger_repository
            .get_entry(entry_id)
            .await?
            .filter(|entry| entry.deposit().is_some())
            .ok_or_else(|| LedgerError::not_found("deposit request not found"))?;

        if entry.status() != EntryStatus::Pending {
            return Err(LedgerError::conflict("deposit request already decided"));
        }

        let (status, approved_at) = match decision {
            Decision::Approve => (EntryStatus::Approved, Some(Utc::now())),
            Decision::Reject => (EntryStatus::Rejected, None),
        };

        let decided = self
            .ledger_repository
            .decide_pending_deposit(entry_id, status, approved_at, &actor.member_id)
            .await?;
        if !decided {
            warn!("Deposit {} was decided concurrently", entry_id);
            return Err(LedgerError::conflict("deposit request already decided"));
        }

        info!("Deposit {} {}", entry_id, status.as_str());
        Ok(DecisionResult {
            entry_id: entry_id.to_string(),
            status,
        })
    }

    /// Top a member-month up to the monthly fee.
    pub async fn force_paid(
        &self,
        actor: &Actor,
        command: MemberMonthCommand,
    ) -> LedgerResult<ForcePaidResult> {
        let month_key = MonthKey::parse(command.month_key.trim())?;
        let member = self.require_member(&command.member_id).await?;

        if member.monthly_fee <= 0 {
            return Err(LedgerError::validation(
                "monthly fee is not set for this member; set it first",
            ));
        }

        let approved_sum: i64 = self
            .ledger_repository
            .list_member_month_deposits(&member.id, month_key)
            .await?
            .iter()
            .filter(|entry| entry.is_approved())
            .map(|entry| entry.amount)
            .sum();

        if approved_sum >= member.monthly_fee {
            return Err(LedgerError::conflict("this month is already paid for the member"));
        }

        let amount = member.monthly_fee - approved_sum;
        let note = note_or_default(command.note.as_deref(), FORCE_PAID_NOTE);
        let entry = approved_deposit(
            actor,
            Some(member.id.clone()),
            month_key,
            EntrySource::AdminForcePaid,
            amount,
            &note,
        );

        match self
            .ledger_repository
            .insert_entry_rejecting_pending(
                &entry,
                &actor.member_id,
                CascadeGuard::ApprovedTotal(approved_sum),
            )
            .await?
        {
            CascadeInsert::Inserted { rejected } => {
                info!(
                    "Force-paid {} for '{}': {} added, {} pending request(s) rejected",
                    month_key, member.name, amount, rejected
                );
                Ok(ForcePaidResult {
                    entry_id: entry.id,
                    amount,
                })
            }
            CascadeInsert::Duplicate => {
                Err(LedgerError::conflict("this month is already paid for the member"))
            }
            CascadeInsert::Stale => {
                warn!("Approved deposits for {} of '{}' changed during force-paid", month_key, member.name);
                Err(LedgerError::conflict(
                    "approved deposits for this month changed; reload and try again",
                ))
            }
        }
    }

    /// Revert every approved deposit of a member-month; returns how many changed.
    pub async fn force_unpaid(&self, actor: &Actor, command: MemberMonthCommand) -> LedgerResult<u64> {
        let month_key = MonthKey::parse(command.month_key.trim())?;
        let member = self.require_member(&command.member_id).await?;

        let updated = self
            .ledger_repository
            .reject_approved_deposits(&member.id, month_key)
            .await?;
        info!(
            "Force-unpaid {} for '{}' by {}: {} deposit(s) reverted",
            month_key, member.name, actor.member_id, updated
        );
        Ok(updated)
    }

    /// Waive a member-month with an approved deposit of 0.
    pub async fn force_zero_paid(
        &self,
        actor: &Actor,
        command: MemberMonthCommand,
    ) -> LedgerResult<LedgerEntry> {
        let month_key = MonthKey::parse(command.month_key.trim())?;
        let member = self.require_member(&command.member_id).await?;

        let deposits = self
            .ledger_repository
            .list_member_month_deposits(&member.id, month_key)
            .await?;
        if deposits.iter().any(is_live_zero_waiver) {
            return Err(LedgerError::conflict("this month is already marked as zero-paid"));
        }

        let note = note_or_default(command.note.as_deref(), FORCE_ZERO_NOTE);
        let entry = approved_deposit(
            actor,
            Some(member.id.clone()),
            month_key,
            EntrySource::AdminForceZero,
            0,
            &note,
        );

        match self
            .ledger_repository
            .insert_entry_rejecting_pending(&entry, &actor.member_id, CascadeGuard::Unconditional)
            .await?
        {
            CascadeInsert::Inserted { rejected } => {
                info!(
                    "Force-zero-paid {} for '{}', {} pending request(s) rejected",
                    month_key, member.name, rejected
                );
                Ok(entry)
            }
            CascadeInsert::Duplicate | CascadeInsert::Stale => {
                Err(LedgerError::conflict("this month is already marked as zero-paid"))
            }
        }
    }

    /// Patch an entry. Only the supplied fields change.
    pub async fn update_entry(
        &self,
        actor: &Actor,
        entry_id: &str,
        command: UpdateEntryCommand,
    ) -> LedgerResult<LedgerEntry> {
        let mut entry = self
            .ledger_repository
            .get_entry(entry_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("entry not found"))?;
        let entry_type = entry.entry_type();

        if let Some(amount) = command.amount {
            validate_amount(entry_type, amount)?;
            entry.amount = amount;
        }

        if let Some(note) = command.note {
            entry.note = note.trim().to_string();
        }

        if let Some(month_key) = command.month_key {
            let EntryKind::Deposit(details) = &mut entry.kind else {
                return Err(LedgerError::validation(
                    "month key can only be changed for deposit entries",
                ));
            };
            let month_key = month_key.trim();
            if month_key.is_empty() {
                return Err(LedgerError::validation("deposits require a month key"));
            }
            details.month_key = MonthKey::parse(month_key)?;
        }

        if let Some(status) = command.status {
            let EntryKind::Deposit(details) = &mut entry.kind else {
                return Err(LedgerError::validation(
                    "status change is only supported for deposit entries",
                ));
            };
            details.status = status;
            if status == EntryStatus::Approved {
                entry.approved_at = Some(Utc::now());
                entry.approved_by = Some(actor.member_id.clone());
            } else {
                entry.approved_at = None;
                entry.approved_by = None;
            }
        }

        if is_live_zero_waiver(&entry) {
            self.ensure_single_zero_waiver(&entry).await?;
        }

        match self.ledger_repository.update_entry(&entry).await? {
            EntryUpdate::Updated => {}
            EntryUpdate::Missing => return Err(LedgerError::not_found("entry not found")),
            EntryUpdate::Duplicate => {
                return Err(LedgerError::conflict("this month is already marked as zero-paid"))
            }
        }

        info!("Entry {} updated by {}", entry.id, actor.member_id);
        Ok(entry)
    }

    pub async fn delete_entry(&self, actor: &Actor, entry_id: &str) -> LedgerResult<()> {
        if !self.ledger_repository.delete_entry(entry_id).await? {
            return Err(LedgerError::not_found("entry not found"));
        }
        info!("Entry {} deleted by {}", entry_id, actor.member_id);
        Ok(())
    }

    pub async fn create_withdrawal(
        &self,
        actor: &Actor,
        command: CashMovementCommand,
    ) -> LedgerResult<LedgerEntry> {
        validate_amount(EntryType::Withdrawal, command.amount)?;
        let entry = approved_cash_movement(actor, EntryKind::Withdrawal, command);
        self.ledger_repository.insert_entry(&entry).await?;
        info!("Withdrawal {}: {}", entry.id, entry.amount);
        Ok(entry)
    }

    pub async fn create_adjustment(
        &self,
        actor: &Actor,
        command: CashMovementCommand,
    ) -> LedgerResult<LedgerEntry> {
        validate_amount(EntryType::Adjustment, command.amount)?;
        let entry = approved_cash_movement(actor, EntryKind::Adjustment, command);
        self.ledger_repository.insert_entry(&entry).await?;
        info!("Adjustment {}: {}", entry.id, entry.amount);
        Ok(entry)
    }

    async fn require_member(&self, member_id: &str) -> LedgerResult<Member> {
        self.member_repository
            .get_member(member_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("member not found"))
    }

    async fn ensure_single_zero_waiver(&self, entry: &LedgerEntry) -> LedgerResult<()> {
        let (Some(member_id), Some(month_key)) = (entry.member_id.as_deref(), entry.month_key()) else {
            return Ok(());
        };

        let taken = self
            .ledger_repository
            .list_member_month_deposits(member_id, month_key)
            .await?
            .iter()
            .any(|other| other.id != entry.id && is_live_zero_waiver(other));
        if taken {
            return Err(LedgerError::conflict("this month is already marked as zero-paid"));
        }
        Ok(())
    }
}

fn validate_amount(entry_type: EntryType, amount: i64) -> LedgerResult<()> {
    entry_type.validate_amount(amount).map_err(LedgerError::Validation)
}

fn is_live_zero_waiver(entry: &LedgerEntry) -> bool {
    entry.source() == EntrySource::AdminForceZero && entry.is_approved()
}

fn note_or_default(note: Option<&str>, default: &str) -> String {
    match note.map(str::trim) {
        Some(note) if !note.is_empty() => note.to_string(),
        _ => default.to_string(),
    }
}

fn approved_deposit(
    actor: &Actor,
    member_id: Option<String>,
    month_key: MonthKey,
    source: EntrySource,
    amount: i64,
    note: &str,
) -> LedgerEntry {
    let now = Utc::now();
    LedgerEntry {
        id: LedgerEntry::generate_id(),
        kind: EntryKind::Deposit(DepositDetails {
            month_key,
            status: EntryStatus::Approved,
            source,
        }),
        amount,
        note: note.trim().to_string(),
        requested_at: now,
        approved_at: Some(now),
        member_id,
        requested_by: actor.member_id.clone(),
        approved_by: Some(actor.member_id.clone()),
    }
}

fn approved_cash_movement(actor: &Actor, kind: EntryKind, command: CashMovementCommand) -> LedgerEntry {
    let now = Utc::now();
    LedgerEntry {
        id: LedgerEntry::generate_id(),
        kind,
        amount: command.amount,
        note: command.note.trim().to_string(),
        requested_at: now,
        approved_at: Some(now),
        member_id: None,
        requested_by: actor.member_id.clone(),
        approved_by: Some(actor.member_id.clone()),
    }
}
