use shared::{
    DecisionAction, EntrySource as SharedEntrySource, EntryStatus as SharedEntryStatus,
    EntryType as SharedEntryType, LedgerTransaction,
};

use super::timestamp_to_dto;
use crate::backend::domain::balance_service::LedgerLine;
use crate::backend::domain::commands::deposits::Decision;
use crate::backend::domain::models::{EntrySource, EntryStatus, EntryType};

pub struct EntryMapper;

impl EntryMapper {
    pub fn entry_type_to_dto(entry_type: EntryType) -> SharedEntryType {
        match entry_type {
            EntryType::Deposit => SharedEntryType::Deposit,
            EntryType::Withdrawal => SharedEntryType::Withdrawal,
            EntryType::Adjustment => SharedEntryType::Adjustment,
        }
    }

    pub fn status_to_dto(status: EntryStatus) -> SharedEntryStatus {
        match status {
            EntryStatus::Pending => SharedEntryStatus::Pending,
            EntryStatus::Approved => SharedEntryStatus::Approved,
            EntryStatus::Rejected => SharedEntryStatus::Rejected,
        }
    }

    pub fn status_to_domain(status: SharedEntryStatus) -> EntryStatus {
        match status {
            SharedEntryStatus::Pending => EntryStatus::Pending,
            SharedEntryStatus::Approved => EntryStatus::Approved,
            SharedEntryStatus::Rejected => EntryStatus::Rejected,
        }
    }

    pub fn source_to_dto(source: EntrySource) -> SharedEntrySource {
        match source {
            EntrySource::UserRequest => SharedEntrySource::UserRequest,
            EntrySource::AdminDirect => SharedEntrySource::AdminDirect,
            EntrySource::AdminSponsorship => SharedEntrySource::AdminSponsorship,
            EntrySource::AdminForcePaid => SharedEntrySource::AdminForcePaid,
            EntrySource::AdminForceZero => SharedEntrySource::AdminForceZero,
            EntrySource::AdminWithdrawal => SharedEntrySource::AdminWithdrawal,
            EntrySource::AdminAdjustment => SharedEntrySource::AdminAdjustment,
        }
    }

    pub fn decision_to_domain(action: DecisionAction) -> Decision {
        match action {
            DecisionAction::Approve => Decision::Approve,
            DecisionAction::Reject => Decision::Reject,
        }
    }

    /// Convert one annotated feed line to its wire form
    pub fn to_transaction_dto(line: LedgerLine) -> LedgerTransaction {
        let entry = line.entry;
        LedgerTransaction {
            entry_type: Self::entry_type_to_dto(entry.entry_type()),
            status: Self::status_to_dto(entry.status()),
            source: Self::source_to_dto(entry.source()),
            month_key: entry.month_key().map(|key| key.to_string()),
            requested_at: timestamp_to_dto(entry.requested_at),
            approved_at: entry.approved_at.map(timestamp_to_dto),
            id: entry.id,
            amount: entry.amount,
            note: entry.note,
            member_name: line.member_name,
            requested_by_name: line.requested_by_name,
            approved_by_name: line.approved_by_name,
            balance_after: line.balance_after,
        }
    }

    pub fn to_transaction_dto_list(lines: Vec<LedgerLine>) -> Vec<LedgerTransaction> {
        lines.into_iter().map(Self::to_transaction_dto).collect()
    }
}
