//! # Backend Module
//!
//! Everything behind the HTTP port of the group fund server.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST handlers, actor extraction, DTO mappers)
//!     ↓
//! Domain Layer (ledger rules, reports, member directory)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! [`initialize_backend`] opens the store and wires the services;
//! [`create_router`] mounts the REST API with CORS for the client origin.

pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use log::info;
use tower_http::cors::{Any, CorsLayer};

use crate::backend::domain::{BalanceService, FiscalCalendar, LedgerService, MemberService, SummaryService};
use crate::backend::io::rest::{self, ledger_apis, member_apis, report_apis};
use crate::backend::storage::DbConnection;
use crate::config::AppConfig;

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub ledger_service: LedgerService<DbConnection>,
    pub balance_service: BalanceService<DbConnection>,
    pub summary_service: SummaryService<DbConnection>,
    pub member_service: MemberService<DbConnection>,
}

/// Wire every service onto one shared connection
pub fn build_state(db: DbConnection, calendar: FiscalCalendar) -> AppState {
    let connection = Arc::new(db);
    AppState {
        ledger_service: LedgerService::new(connection.clone()),
        balance_service: BalanceService::new(connection.clone()),
        summary_service: SummaryService::new(connection.clone(), calendar),
        member_service: MemberService::new(connection),
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let calendar = config.calendar()?;

    info!("Setting up database at {}", config.database.url);
    let db = DbConnection::new(&config.database.url).await?;

    info!(
        "Setting up domain model (inception {}, offset {})",
        calendar.inception(),
        calendar.offset()
    );
    let state = build_state(db, calendar);

    let admin = state
        .member_service
        .ensure_admin(&config.fund.admin_name)
        .await
        .context("Failed to seed the admin member")?;
    info!("Admin member ready: {} ({})", admin.name, admin.id);

    Ok(state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, client_origin: &str) -> Result<Router> {
    let origin = client_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid client origin: {}", client_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    let ledger_routes = ledger_apis::router().merge(report_apis::router());

    Ok(Router::new()
        .route("/health", get(rest::health))
        .nest("/api/ledger", ledger_routes)
        .nest("/api/members", member_apis::router())
        .layer(cors)
        .with_state(app_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::test_support::calendar;
    use crate::backend::io::rest::actor::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = DbConnection::init_test().await.unwrap();
        create_router(build_state(db, calendar()), "http://localhost:5173").unwrap()
    }

    #[tokio::test]
    async fn test_health_needs_no_actor() {
        let router = test_router().await;
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_requires_actor_headers() {
        let router = test_router().await;
        let response = router
            .oneshot(Request::builder().uri("/api/ledger/balance").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_balance_route_with_actor() {
        let router = test_router().await;
        let request = Request::builder()
            .uri("/api/ledger/balance")
            .header(ACTOR_ID_HEADER, "m1")
            .header(ACTOR_ROLE_HEADER, "member")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_member_cannot_withdraw() {
        let router = test_router().await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/ledger/withdrawals")
            .header(ACTOR_ID_HEADER, "m1")
            .header(ACTOR_ROLE_HEADER, "member")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"amount":1000,"note":"snacks"}"#))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    fn admin_json(method: &str, uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(ACTOR_ID_HEADER, "a1")
            .header(ACTOR_ROLE_HEADER, "admin")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_bad_requests() {
        let router = test_router().await;
        let cases = [
            ("POST", "/api/ledger/withdrawals", r#"{"amount":10.5}"#),
            ("POST", "/api/ledger/withdrawals", r#"{"note":"no amount"}"#),
            ("PATCH", "/api/ledger/deposits/d1/decision", r#"{"action":"maybe"}"#),
            ("PATCH", "/api/ledger/entries/d1", r#"{"status":"bogus"}"#),
            ("POST", "/api/members", r#"{"name":"bob","monthly_fee":"lots"}"#),
        ];

        for (method, uri, body) in cases {
            let response = router
                .clone()
                .oneshot(admin_json(method, uri, body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} {} {}", method, uri, body);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let error: shared::ErrorResponse = serde_json::from_slice(&bytes).unwrap();
            assert!(!error.message.is_empty());
        }
    }

    #[tokio::test]
    async fn test_invalid_client_origin_is_rejected() {
        let db = DbConnection::init_test().await.unwrap();
        assert!(create_router(build_state(db, calendar()), "bad\norigin").is_err());
    }
}
