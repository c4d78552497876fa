//! Wire types shared between the group fund server and its clients.
//!
//! Amounts are integers in the fund's single currency unit. Timestamps are
//! RFC 3339 strings and month keys are `YYYY-MM` strings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Literal member id a client sends to target the donation pseudo-member.
pub const DONATION_TARGET_ID: &str = "donation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    Deposit,
    Withdrawal,
    Adjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Pending,
    Approved,
    Rejected,
}

/// Provenance of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    UserRequest,
    AdminDirect,
    AdminSponsorship,
    AdminForcePaid,
    AdminForceZero,
    AdminWithdrawal,
    AdminAdjustment,
}

/// Payment state of one member-month cell in the status grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Pending,
    Unpaid,
    /// Reported by every cell of the donation row
    Donation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionAction {
    Approve,
    Reject,
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub role: Role,
    /// Due amount per calendar month (0 = no fixed due)
    pub monthly_fee: i64,
    /// Creation time (RFC 3339)
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberListResponse {
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    /// Defaults to `member`
    pub role: Option<Role>,
    /// Defaults to 0; ignored for admins
    pub monthly_fee: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMonthlyFeeRequest {
    pub monthly_fee: i64,
}

// ---------------------------------------------------------------------------
// Ledger commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDepositRequest {
    pub amount: i64,
    /// Due month the payment counts toward (YYYY-MM)
    pub month_key: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminDepositRequest {
    pub amount: i64,
    pub month_key: String,
    pub note: Option<String>,
    /// Target member id, or [`DONATION_TARGET_ID`] for a sponsorship
    pub member_id: String,
}

/// Targets one member's due month (force-paid, force-unpaid, force-zero-paid)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberMonthRequest {
    pub member_id: String,
    pub month_key: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub action: DecisionAction,
}

/// Partial update of an entry; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateEntryRequest {
    pub amount: Option<i64>,
    pub note: Option<String>,
    pub month_key: Option<String>,
    pub status: Option<EntryStatus>,
}

/// Withdrawal or adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashEntryRequest {
    pub amount: i64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryCreatedResponse {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForcePaidResponse {
    pub id: String,
    /// Amount actually applied to top the month up
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceUnpaidResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub id: String,
    pub status: EntryStatus,
}

// ---------------------------------------------------------------------------
// Ledger reads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: i64,
}

/// One row of the transaction feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: String,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    pub amount: i64,
    pub month_key: Option<String>,
    pub note: String,
    pub source: EntrySource,
    pub requested_at: String,
    pub approved_at: Option<String>,
    pub member_name: Option<String>,
    pub requested_by_name: Option<String>,
    pub approved_by_name: Option<String>,
    /// Fund balance right after this entry, in chronological order
    pub balance_after: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<LedgerTransaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthCell {
    pub amount: i64,
    pub approved_count: u32,
    pub due_amount: i64,
    pub remaining_amount: i64,
    pub pending_amount: i64,
    pub force_zero_paid: bool,
    pub status: PaymentStatus,
    pub requested_at: Option<String>,
    pub approved_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummaryRow {
    pub member_id: String,
    pub member_name: String,
    pub monthly_fee: i64,
    /// Cells keyed by month key
    pub months: BTreeMap<String, MonthCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationSummaryRow {
    pub months: BTreeMap<String, MonthCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryRow {
    Member(MemberSummaryRow),
    Donation(DonationSummaryRow),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthWindowResponse {
    pub selected_year: i32,
    pub available_years: Vec<i32>,
    /// Most recent month first
    pub month_keys: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub selected_year: i32,
    pub available_years: Vec<i32>,
    /// Most recent month first
    pub month_keys: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month_key: String,
    pub income: i64,
    pub expense: i64,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotalsResponse {
    pub selected_year: i32,
    pub available_years: Vec<i32>,
    pub month_keys: Vec<String>,
    pub totals: Vec<MonthlyTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_row_is_tagged_by_kind() {
        let row = SummaryRow::Donation(DonationSummaryRow {
            months: BTreeMap::new(),
        });
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["kind"], "donation");

        let back: SummaryRow = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_enums_use_snake_case() {
        assert_eq!(
            serde_json::to_string(&EntrySource::AdminForceZero).unwrap(),
            "\"admin_force_zero\""
        );
        let status: EntryStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(status, EntryStatus::Approved);
    }

    #[test]
    fn test_update_entry_request_fields_are_optional() {
        let request: UpdateEntryRequest = serde_json::from_str(r#"{"note":"fixed"}"#).unwrap();
        assert_eq!(request.note.as_deref(), Some("fixed"));
        assert!(request.amount.is_none());
        assert!(request.status.is_none());
    }
}
