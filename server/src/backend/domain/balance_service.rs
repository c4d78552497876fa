//! Balance reconstruction for the fund.
//!
//! The fund balance is never stored. It is recomputed from approved entries
//! on every read:
//!
//! - approved deposit: `+amount`
//! - withdrawal: `-amount`
//! - adjustment: `+amount` (signed)
//!
//! The transaction feed shows a page of the most recent entries, each with
//! the balance right after it. The page is seeded with the approved balance of
//! everything strictly before its oldest entry, so a page never needs the
//! whole history in memory.

use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

use super::commands::reports::TransactionPageQuery;
use super::error::LedgerResult;
use super::models::{EntrySource, LedgerEntry};
use crate::backend::storage::{Connection, LedgerStorage, MemberStorage};

pub const DEFAULT_PAGE_LIMIT: u32 = 150;
pub const MAX_PAGE_LIMIT: u32 = 500;

/// One row of the transaction feed
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerLine {
    pub entry: LedgerEntry,
    pub balance_after: i64,
    pub member_name: Option<String>,
    pub requested_by_name: Option<String>,
    pub approved_by_name: Option<String>,
}

pub fn clamp_page_limit(limit: Option<i64>) -> u32 {
    match limit {
        Some(limit) => limit.clamp(1, i64::from(MAX_PAGE_LIMIT)) as u32,
        None => DEFAULT_PAGE_LIMIT,
    }
}

/// Annotate `page` with running balances, starting from `opening`.
///
/// The walk is chronological by (requested_at, id); the returned vector keeps
/// the order of `page`.
pub fn annotate_running_balance(page: Vec<LedgerEntry>, opening: i64) -> Vec<(LedgerEntry, i64)> {
    let mut order: Vec<usize> = (0..page.len()).collect();
    order.sort_by(|&a, &b| page[a].chronological_cmp(&page[b]));

    let mut balances = vec![0; page.len()];
    let mut running = opening;
    for index in order {
        running += page[index].balance_impact();
        balances[index] = running;
    }

    page.into_iter().zip(balances).collect()
}

/// Service responsible for balance calculations
#[derive(Clone)]
pub struct BalanceService<C: Connection> {
    ledger_repository: C::LedgerRepository,
    member_repository: C::MemberRepository,
}

impl<C: Connection> BalanceService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let ledger_repository = connection.create_ledger_repository();
        let member_repository = connection.create_member_repository();
        Self {
            ledger_repository,
            member_repository,
        }
    }

    /// Current fund balance over all approved entries
    pub async fn calculate_balance(&self) -> LedgerResult<i64> {
        let totals = self.ledger_repository.approved_totals_before(None).await?;
        debug!(
            "Approved totals: deposits={} withdrawals={} adjustments={}",
            totals.deposits, totals.withdrawals, totals.adjustments
        );
        Ok(totals.balance())
    }

    /// Most recent entries first, each annotated with the balance after it.
    /// Zero-paid waivers are bookkeeping only and never shown.
    pub async fn transaction_page(&self, query: TransactionPageQuery) -> LedgerResult<Vec<LedgerLine>> {
        let limit = clamp_page_limit(query.limit);
        let page = self
            .ledger_repository
            .list_recent_entries(limit, EntrySource::AdminForceZero)
            .await?;

        let Some(oldest) = page.last() else {
            return Ok(Vec::new());
        };

        let opening = self
            .ledger_repository
            .approved_totals_before(Some((oldest.requested_at, oldest.id.as_str())))
            .await?
            .balance();
        info!("Transaction page: {} entries, opening balance {}", page.len(), opening);

        let names: HashMap<String, String> = self
            .member_repository
            .list_members()
            .await?
            .into_iter()
            .map(|member| (member.id, member.name))
            .collect();
        let name_of = |id: Option<&str>| id.and_then(|id| names.get(id).cloned());

        let lines = annotate_running_balance(page, opening)
            .into_iter()
            .map(|(entry, balance_after)| LedgerLine {
                member_name: name_of(entry.member_id.as_deref()),
                requested_by_name: name_of(Some(entry.requested_by.as_str())),
                approved_by_name: name_of(entry.approved_by.as_deref()),
                entry,
                balance_after,
            })
            .collect();

        Ok(lines)
    }
}
