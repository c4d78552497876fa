//! Summary grid and monthly totals.
//!
//! The grid buckets deposits by the month they are credited against
//! (`month_key`). Monthly totals bucket approved entries by the month they were
//! requested in, in the fund's offset. The two views can disagree for
//! deposits paid ahead or late.

use log::info;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::error::{LedgerError, LedgerResult};
use super::fiscal_calendar::{FiscalCalendar, MonthWindow};
use super::models::{EntryKind, EntrySource, LedgerEntry, Member, MonthKey, Role};
use super::payment_status::MonthCell;
use crate::backend::storage::{Connection, LedgerStorage, MemberStorage};

#[derive(Debug, Clone, PartialEq)]
pub struct MemberRow {
    pub member_id: String,
    pub member_name: String,
    pub monthly_fee: i64,
    pub months: BTreeMap<MonthKey, MonthCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonationRow {
    pub months: BTreeMap<MonthKey, MonthCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryRow {
    Member(MemberRow),
    Donation(DonationRow),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub window: MonthWindow,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub month_key: MonthKey,
    pub income: i64,
    pub expense: i64,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    pub window: MonthWindow,
    pub totals: Vec<MonthlyTotal>,
}

/// One row per `member` account (by name), then the donation row.
pub fn build_summary(members: &[Member], entries: &[LedgerEntry], month_keys: &[MonthKey]) -> Vec<SummaryRow> {
    let mut by_member: HashMap<(&str, MonthKey), Vec<&LedgerEntry>> = HashMap::new();
    let mut donations: HashMap<MonthKey, Vec<&LedgerEntry>> = HashMap::new();

    for entry in entries {
        let Some(details) = entry.deposit() else {
            continue;
        };
        if details.source == EntrySource::AdminSponsorship {
            donations.entry(details.month_key).or_default().push(entry);
        } else if let Some(member_id) = entry.member_id.as_deref() {
            by_member
                .entry((member_id, details.month_key))
                .or_default()
                .push(entry);
        }
    }

    let mut payers: Vec<&Member> = members.iter().filter(|m| m.role == Role::Member).collect();
    payers.sort_by(|a, b| a.name.cmp(&b.name));

    let mut rows: Vec<SummaryRow> = payers
        .into_iter()
        .map(|member| {
            let months = month_keys
                .iter()
                .map(|&key| {
                    let folded = by_member
                        .get(&(member.id.as_str(), key))
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    (key, MonthCell::fold(member.monthly_fee, folded.iter().copied()))
                })
                .collect();
            SummaryRow::Member(MemberRow {
                member_id: member.id.clone(),
                member_name: member.name.clone(),
                monthly_fee: member.monthly_fee,
                months,
            })
        })
        .collect();

    let donation_months = month_keys
        .iter()
        .map(|&key| {
            let folded = donations.get(&key).map(Vec::as_slice).unwrap_or_default();
            (key, MonthCell::fold_donation(folded.iter().copied()))
        })
        .collect();
    rows.push(SummaryRow::Donation(DonationRow { months: donation_months }));

    rows
}

/// Income and expense per request month, in `month_keys` order.
/// Entries requested outside the window are ignored.
pub fn bucket_monthly_totals(
    entries: &[LedgerEntry],
    month_keys: &[MonthKey],
    calendar: &FiscalCalendar,
) -> Vec<MonthlyTotal> {
    let mut sums: HashMap<MonthKey, (i64, i64)> =
        month_keys.iter().map(|&key| (key, (0, 0))).collect();

    for entry in entries.iter().filter(|entry| entry.is_approved()) {
        let Some(month_key) = calendar.month_of(entry.requested_at) else {
            continue;
        };
        let Some((income, expense)) = sums.get_mut(&month_key) else {
            continue;
        };

        match entry.kind {
            EntryKind::Deposit(_) => *income += entry.amount,
            EntryKind::Withdrawal => *expense += entry.amount,
            EntryKind::Adjustment if entry.amount >= 0 => *income += entry.amount,
            EntryKind::Adjustment => *expense += entry.amount.abs(),
        }
    }

    month_keys
        .iter()
        .map(|key| {
            let (income, expense) = sums.get(key).copied().unwrap_or_default();
            MonthlyTotal {
                month_key: *key,
                income,
                expense,
                net: income - expense,
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct SummaryService<C: Connection> {
    ledger_repository: C::LedgerRepository,
    member_repository: C::MemberRepository,
    calendar: FiscalCalendar,
}

impl<C: Connection> SummaryService<C> {
    pub fn new(connection: Arc<C>, calendar: FiscalCalendar) -> Self {
        let ledger_repository = connection.create_ledger_repository();
        let member_repository = connection.create_member_repository();
        Self {
            ledger_repository,
            member_repository,
            calendar,
        }
    }

    /// Months and years a report for `year` covers, as of today
    pub fn month_window(&self, year: Option<i32>) -> MonthWindow {
        self.calendar.window(year, self.calendar.today())
    }

    pub async fn summary(&self, year: Option<i32>) -> LedgerResult<Summary> {
        self.summary_as_of(year, self.calendar.today()).await
    }

    pub async fn summary_as_of(&self, year: Option<i32>, today: chrono::NaiveDate) -> LedgerResult<Summary> {
        let window = self.calendar.window(year, today);
        let members = self.member_repository.list_members().await?;
        let entries = self
            .ledger_repository
            .list_deposits_for_months(&window.month_keys)
            .await?;

        info!(
            "Summary for {}: {} months, {} deposits",
            window.selected_year,
            window.month_keys.len(),
            entries.len()
        );
        let rows = build_summary(&members, &entries, &window.month_keys);
        Ok(Summary { window, rows })
    }

    pub async fn monthly_totals(&self, year: Option<i32>) -> LedgerResult<MonthlyTotals> {
        self.monthly_totals_as_of(year, self.calendar.today()).await
    }

    pub async fn monthly_totals_as_of(
        &self,
        year: Option<i32>,
        today: chrono::NaiveDate,
    ) -> LedgerResult<MonthlyTotals> {
        let window = self.calendar.window(year, today);
        let (start, end) = self
            .calendar
            .year_bounds(window.selected_year)
            .ok_or_else(|| LedgerError::validation(format!("year {} is out of range", window.selected_year)))?;

        let entries = self
            .ledger_repository
            .list_approved_requested_between(start, end)
            .await?;
        let totals = bucket_monthly_totals(&entries, &window.month_keys, &self.calendar);
        Ok(MonthlyTotals { window, totals })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::EntryStatus;
    use crate::backend::domain::payment_status::PaymentStatus;
    use crate::backend::domain::test_support::{calendar, cash, deposit, insert, seed_member, utc};
    use crate::backend::storage::DbConnection;
    use chrono::NaiveDate;

    fn key(value: &str) -> MonthKey {
        MonthKey::parse(value).unwrap()
    }

    fn member_rows(rows: &[SummaryRow]) -> Vec<&MemberRow> {
        rows.iter()
            .filter_map(|row| match row {
                SummaryRow::Member(member) => Some(member),
                SummaryRow::Donation(_) => None,
            })
            .collect()
    }

    fn donation_row(rows: &[SummaryRow]) -> &DonationRow {
        match rows.last() {
            Some(SummaryRow::Donation(row)) => row,
            other => panic!("expected donation row last, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_summary_rows_members_by_name_then_donation() {
        let db = DbConnection::init_test().await.unwrap();
        seed_member(&db, "zed", Role::Member, 1000).await;
        seed_member(&db, "admin", Role::Admin, 0).await;
        let amy = seed_member(&db, "amy", Role::Member, 1000).await;

        insert(&db, &deposit("s1", None, "2025-10", EntryStatus::Approved, EntrySource::AdminSponsorship, 7000, utc(2025, 10, 2, 0))).await;
        insert(&db, &deposit("a1", Some(&amy.id), "2025-11", EntryStatus::Pending, EntrySource::UserRequest, 1000, utc(2025, 11, 2, 0))).await;

        let service = SummaryService::new(Arc::new(db), calendar());
        let summary = service
            .summary_as_of(Some(2025), NaiveDate::from_ymd_opt(2025, 11, 20).unwrap())
            .await
            .unwrap();

        assert_eq!(summary.window.month_keys, vec![key("2025-11"), key("2025-10")]);
        assert_eq!(summary.rows.len(), 3);

        let members = member_rows(&summary.rows);
        let names: Vec<&str> = members.iter().map(|row| row.member_name.as_str()).collect();
        assert_eq!(names, vec!["amy", "zed"]);
        assert_eq!(members[0].months[&key("2025-11")].status, PaymentStatus::Pending);
        assert_eq!(members[0].months[&key("2025-10")].status, PaymentStatus::Unpaid);

        let donation = donation_row(&summary.rows);
        assert_eq!(donation.months[&key("2025-10")].amount, 7000);
        assert_eq!(donation.months[&key("2025-10")].status, PaymentStatus::Donation);
        assert_eq!(donation.months[&key("2025-11")].amount, 0);
    }

    #[test]
    fn test_build_summary_ignores_deposits_outside_window() {
        let members = vec![Member {
            id: "m1".to_string(),
            name: "amy".to_string(),
            role: Role::Member,
            monthly_fee: 500,
            created_at: utc(2025, 10, 1, 0),
        }];
        let entries = vec![
            deposit("in", Some("m1"), "2025-10", EntryStatus::Approved, EntrySource::AdminDirect, 500, utc(2025, 10, 1, 0)),
            deposit("out", Some("m1"), "2025-09", EntryStatus::Approved, EntrySource::AdminDirect, 500, utc(2025, 10, 1, 1)),
            deposit("ghost", Some("gone"), "2025-10", EntryStatus::Approved, EntrySource::AdminDirect, 500, utc(2025, 10, 1, 2)),
        ];

        let rows = build_summary(&members, &entries, &[key("2025-10")]);
        let member = member_rows(&rows)[0];
        assert_eq!(member.months.len(), 1);
        assert_eq!(member.months[&key("2025-10")].amount, 500);
        assert_eq!(member.months[&key("2025-10")].status, PaymentStatus::Paid);
    }

    #[test]
    fn test_bucket_monthly_totals_by_request_month() {
        let calendar = calendar();
        let keys = vec![key("2025-12"), key("2025-11"), key("2025-10")];
        let entries = vec![
            // Due in October, requested in November: counted for November
            deposit("d1", Some("m1"), "2025-10", EntryStatus::Approved, EntrySource::UserRequest, 1000, utc(2025, 11, 3, 0)),
            deposit("d2", Some("m1"), "2025-10", EntryStatus::Pending, EntrySource::UserRequest, 999, utc(2025, 11, 3, 1)),
            cash("w1", EntryKind::Withdrawal, 300, utc(2025, 11, 4, 0), "admin"),
            cash("j1", EntryKind::Adjustment, -50, utc(2025, 10, 4, 0), "admin"),
            cash("j2", EntryKind::Adjustment, 20, utc(2025, 10, 5, 0), "admin"),
            // Outside the window
            cash("w2", EntryKind::Withdrawal, 10, utc(2026, 1, 5, 0), "admin"),
        ];

        let totals = bucket_monthly_totals(&entries, &keys, &calendar);
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0], MonthlyTotal { month_key: key("2025-12"), income: 0, expense: 0, net: 0 });
        assert_eq!(totals[1], MonthlyTotal { month_key: key("2025-11"), income: 1000, expense: 300, net: 700 });
        assert_eq!(totals[2], MonthlyTotal { month_key: key("2025-10"), income: 20, expense: 50, net: -30 });
        for total in &totals {
            assert_eq!(total.net, total.income - total.expense);
        }
    }

    #[tokio::test]
    async fn test_monthly_totals_for_selected_year() {
        let db = DbConnection::init_test().await.unwrap();
        insert(&db, &cash("w1", EntryKind::Withdrawal, 400, utc(2025, 12, 10, 0), "admin")).await;
        insert(&db, &cash("w2", EntryKind::Withdrawal, 100, utc(2026, 1, 10, 0), "admin")).await;

        let service = SummaryService::new(Arc::new(db), calendar());
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();

        let totals = service.monthly_totals_as_of(Some(2025), today).await.unwrap();
        assert_eq!(totals.window.selected_year, 2025);
        assert_eq!(totals.totals.len(), 3);
        assert_eq!(totals.totals[0].expense, 400);

        let current = service.monthly_totals_as_of(None, today).await.unwrap();
        assert_eq!(current.window.selected_year, 2026);
        let months: Vec<String> = current.totals.iter().map(|t| t.month_key.to_string()).collect();
        assert_eq!(months, vec!["2026-02", "2026-01"]);
        assert_eq!(current.totals[1].net, -100);
        assert_eq!(current.totals[0].net, 0);
    }
}
