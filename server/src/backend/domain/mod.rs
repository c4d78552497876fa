//! # Domain Module
//!
//! Business rules of the group fund ledger.
//!
//! ## Module Organization
//!
//! - **models**: Members, ledger entries and month keys
//! - **fiscal_calendar**: Which months and years a report covers
//! - **payment_status**: Folding a member-month's deposits into a status cell
//! - **balance_service**: Fund balance and the running-balance transaction feed
//! - **summary_service**: Status grid and monthly income/expense totals
//! - **ledger_service**: Deposit, decision, force, edit and cash commands
//! - **member_service**: Member directory
//!
//! ## Business Rules
//!
//! - Only approved entries move the balance
//! - Deposits are credited against a due month (`YYYY-MM`)
//! - Withdrawals and adjustments are approved on creation
//! - Nothing is cached; every read recomputes from the store
//!
//! Services are storage agnostic: they are generic over
//! [`Connection`](crate::backend::storage::Connection) and never check roles.

pub mod balance_service;
pub mod commands;
pub mod error;
pub mod fiscal_calendar;
pub mod ledger_service;
pub mod member_service;
pub mod models;
pub mod payment_status;
pub mod summary_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use balance_service::BalanceService;
pub use error::{LedgerError, LedgerResult};
pub use fiscal_calendar::FiscalCalendar;
pub use ledger_service::LedgerService;
pub use member_service::MemberService;
pub use summary_service::SummaryService;
