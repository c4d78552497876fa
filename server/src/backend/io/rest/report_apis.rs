//! # REST API for Ledger Reads
//!
//! Month window, status grid, monthly totals, balance and the transaction
//! feed. Any authenticated actor may read.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{error, info};
use serde::Deserialize;

use super::actor::AuthenticatedActor;
use super::error::ApiError;
use crate::backend::domain::commands::reports::TransactionPageQuery;
use crate::backend::io::rest::mappers::{entry_mapper::EntryMapper, report_mapper::ReportMapper};
use crate::backend::AppState;
use shared::{BalanceResponse, TransactionListResponse};

/// Create a router for ledger read APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/months", get(get_month_window))
        .route("/summary", get(get_summary))
        .route("/monthly-totals", get(get_monthly_totals))
        .route("/balance", get(get_balance))
        .route("/transactions", get(list_transactions))
}

/// `?year=`; anything unparsable falls back to the current year
#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<String>,
}

impl YearQuery {
    fn year(&self) -> Option<i32> {
        self.year.as_deref().and_then(|year| year.trim().parse().ok())
    }
}

/// `?limit=`; anything unparsable falls back to the default page size
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    fn limit(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|limit| limit.trim().parse().ok())
    }
}

pub async fn get_month_window(
    State(state): State<AppState>,
    _actor: AuthenticatedActor,
    Query(query): Query<YearQuery>,
) -> impl IntoResponse {
    info!("GET /api/ledger/months - query: {:?}", query);

    let window = state.summary_service.month_window(query.year());
    (StatusCode::OK, Json(ReportMapper::window_to_dto(window)))
}

pub async fn get_summary(
    State(state): State<AppState>,
    _actor: AuthenticatedActor,
    Query(query): Query<YearQuery>,
) -> impl IntoResponse {
    info!("GET /api/ledger/summary - query: {:?}", query);

    match state.summary_service.summary(query.year()).await {
        Ok(summary) => (StatusCode::OK, Json(ReportMapper::summary_to_dto(summary))).into_response(),
        Err(e) => {
            error!("Failed to build summary: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_monthly_totals(
    State(state): State<AppState>,
    _actor: AuthenticatedActor,
    Query(query): Query<YearQuery>,
) -> impl IntoResponse {
    info!("GET /api/ledger/monthly-totals - query: {:?}", query);

    match state.summary_service.monthly_totals(query.year()).await {
        Ok(totals) => (StatusCode::OK, Json(ReportMapper::totals_to_dto(totals))).into_response(),
        Err(e) => {
            error!("Failed to build monthly totals: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn get_balance(
    State(state): State<AppState>,
    _actor: AuthenticatedActor,
) -> impl IntoResponse {
    info!("GET /api/ledger/balance");

    match state.balance_service.calculate_balance().await {
        Ok(balance) => (StatusCode::OK, Json(BalanceResponse { balance })).into_response(),
        Err(e) => {
            error!("Failed to calculate balance: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn list_transactions(
    State(state): State<AppState>,
    _actor: AuthenticatedActor,
    Query(query): Query<LimitQuery>,
) -> impl IntoResponse {
    info!("GET /api/ledger/transactions - query: {:?}", query);

    let page_query = TransactionPageQuery {
        limit: query.limit(),
    };
    match state.balance_service.transaction_page(page_query).await {
        Ok(lines) => {
            let response = TransactionListResponse {
                transactions: EntryMapper::to_transaction_dto_list(lines),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list transactions: {}", e);
            ApiError::from(e).into_response()
        }
    }
}
