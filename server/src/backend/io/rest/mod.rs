//! # REST API Interface Layer
//!
//! ## Endpoints
//!
//! - `/api/ledger/*`: deposits, decisions, force operations, entry edits,
//!   withdrawals and adjustments ([`ledger_apis`]) plus the read side
//!   ([`report_apis`])
//! - `/api/members`: member directory ([`member_apis`])
//! - `/health`: liveness probe
//!
//! Every `/api` route needs the `x-actor-id` and `x-actor-role` headers
//! (see [`actor`]). Errors, including malformed JSON bodies (see [`json`]),
//! are returned as `{"message": ...}`.

pub mod actor;
pub mod error;
pub mod json;
pub mod ledger_apis;
pub mod mappers;
pub mod member_apis;
pub mod report_apis;

use axum::{http::StatusCode, response::IntoResponse, Json};

/// Liveness probe; does not touch the store
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
