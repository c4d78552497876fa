use shared::{
    DonationSummaryRow, MemberSummaryRow, MonthCell as SharedMonthCell,
    MonthWindowResponse, MonthlyTotal as SharedMonthlyTotal, MonthlyTotalsResponse, PaymentStatus as SharedPaymentStatus,
    SummaryResponse, SummaryRow as SharedSummaryRow,
};
use std::collections::BTreeMap;

use super::timestamp_to_dto;
use crate::backend::domain::fiscal_calendar::MonthWindow;
use crate::backend::domain::models::MonthKey;
use crate::backend::domain::payment_status::{MonthCell, PaymentStatus};
use crate::backend::domain::summary_service::{MonthlyTotals, Summary, SummaryRow};

pub struct ReportMapper;

impl ReportMapper {
    pub fn payment_status_to_dto(status: PaymentStatus) -> SharedPaymentStatus {
        match status {
            PaymentStatus::Paid => SharedPaymentStatus::Paid,
            PaymentStatus::Partial => SharedPaymentStatus::Partial,
            PaymentStatus::Pending => SharedPaymentStatus::Pending,
            PaymentStatus::Unpaid => SharedPaymentStatus::Unpaid,
            PaymentStatus::Donation => SharedPaymentStatus::Donation,
        }
    }

    pub fn cell_to_dto(cell: MonthCell) -> SharedMonthCell {
        SharedMonthCell {
            amount: cell.amount,
            approved_count: cell.approved_count,
            due_amount: cell.due_amount,
            remaining_amount: cell.remaining_amount,
            pending_amount: cell.pending_amount,
            force_zero_paid: cell.force_zero_paid,
            status: Self::payment_status_to_dto(cell.status),
            requested_at: cell.requested_at.map(timestamp_to_dto),
            approved_at: cell.approved_at.map(timestamp_to_dto),
        }
    }

    fn months_to_dto(months: BTreeMap<MonthKey, MonthCell>) -> BTreeMap<String, SharedMonthCell> {
        months
            .into_iter()
            .map(|(key, cell)| (key.to_string(), Self::cell_to_dto(cell)))
            .collect()
    }

    pub fn row_to_dto(row: SummaryRow) -> SharedSummaryRow {
        match row {
            SummaryRow::Member(member) => SharedSummaryRow::Member(MemberSummaryRow {
                member_id: member.member_id,
                member_name: member.member_name,
                monthly_fee: member.monthly_fee,
                months: Self::months_to_dto(member.months),
            }),
            SummaryRow::Donation(donation) => SharedSummaryRow::Donation(DonationSummaryRow {
                months: Self::months_to_dto(donation.months),
            }),
        }
    }

    fn month_keys_to_dto(window: &MonthWindow) -> Vec<String> {
        window.month_keys.iter().map(MonthKey::to_string).collect()
    }

    pub fn window_to_dto(window: MonthWindow) -> MonthWindowResponse {
        MonthWindowResponse {
            month_keys: Self::month_keys_to_dto(&window),
            selected_year: window.selected_year,
            available_years: window.available_years,
        }
    }

    pub fn summary_to_dto(summary: Summary) -> SummaryResponse {
        SummaryResponse {
            month_keys: Self::month_keys_to_dto(&summary.window),
            selected_year: summary.window.selected_year,
            available_years: summary.window.available_years,
            rows: summary.rows.into_iter().map(Self::row_to_dto).collect(),
        }
    }

    pub fn totals_to_dto(totals: MonthlyTotals) -> MonthlyTotalsResponse {
        MonthlyTotalsResponse {
            month_keys: Self::month_keys_to_dto(&totals.window),
            selected_year: totals.window.selected_year,
            available_years: totals.window.available_years,
            totals: totals
                .totals
                .into_iter()
                .map(|total| SharedMonthlyTotal {
                    month_key: total.month_key.to_string(),
                    income: total.income,
                    expense: total.expense,
                    net: total.net,
                })
                .collect(),
        }
    }
}
