//! # REST API for Ledger Commands
//!
//! Deposits, decisions, force commands, entry edits and cash movements.
//! Everything except the deposit request is admin only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{patch, post},
    Router,
};
use log::{info, warn};

use super::actor::AuthenticatedActor;
use super::error::ApiError;
use super::json::ApiJson;
use crate::backend::domain::commands::deposits::{
    AdminDepositCommand, DepositTarget, MemberMonthCommand, RequestDepositCommand,
};
use crate::backend::domain::commands::entries::{CashMovementCommand, UpdateEntryCommand};
use crate::backend::io::rest::mappers::entry_mapper::EntryMapper;
use crate::backend::AppState;
use shared::{
    AdminDepositRequest, CashEntryRequest, DecisionRequest, DecisionResponse, EntryCreatedResponse,
    ForcePaidResponse, ForceUnpaidResponse, MemberMonthRequest, RequestDepositRequest,
    UpdateEntryRequest, DONATION_TARGET_ID,
};

/// Create a router for ledger command APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/deposits/request", post(request_deposit))
        .route("/deposits/admin", post(admin_deposit))
        .route("/deposits/force-paid", post(force_paid))
        .route("/deposits/force-unpaid", post(force_unpaid))
        .route("/deposits/force-zero-paid", post(force_zero_paid))
        .route("/deposits/:id/decision", patch(decide_deposit))
        .route("/entries/:id", patch(update_entry).delete(delete_entry))
        .route("/withdrawals", post(create_withdrawal))
        .route("/adjustments", post(create_adjustment))
}

fn member_month_command(request: MemberMonthRequest) -> MemberMonthCommand {
    MemberMonthCommand {
        member_id: request.member_id.trim().to_string(),
        month_key: request.month_key,
        note: request.note,
    }
}

/// Member asks for a deposit to be credited
pub async fn request_deposit(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    ApiJson(request): ApiJson<RequestDepositRequest>,
) -> impl IntoResponse {
    info!("POST /api/ledger/deposits/request - request: {:?}", request);

    let command = RequestDepositCommand {
        amount: request.amount,
        month_key: request.month_key,
        note: request.note.unwrap_or_default(),
    };

    match state.ledger_service.request_deposit(&actor.into_inner(), command).await {
        Ok(entry) => (StatusCode::CREATED, Json(EntryCreatedResponse { id: entry.id })).into_response(),
        Err(e) => {
            warn!("Failed to request deposit: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Admin records a deposit for a member or as a donation
pub async fn admin_deposit(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    ApiJson(request): ApiJson<AdminDepositRequest>,
) -> impl IntoResponse {
    info!("POST /api/ledger/deposits/admin - request: {:?}", request);
    let actor = match actor.require_admin() {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    let member_id = request.member_id.trim();
    let target = if member_id == DONATION_TARGET_ID {
        DepositTarget::Donation
    } else {
        DepositTarget::Member(member_id.to_string())
    };
    let command = AdminDepositCommand {
        amount: request.amount,
        month_key: request.month_key,
        note: request.note.unwrap_or_default(),
        target,
    };

    match state.ledger_service.admin_deposit(&actor, command).await {
        Ok(entry) => (StatusCode::CREATED, Json(EntryCreatedResponse { id: entry.id })).into_response(),
        Err(e) => {
            warn!("Failed to record admin deposit: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn force_paid(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    ApiJson(request): ApiJson<MemberMonthRequest>,
) -> impl IntoResponse {
    info!("POST /api/ledger/deposits/force-paid - request: {:?}", request);
    let actor = match actor.require_admin() {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    match state
        .ledger_service
        .force_paid(&actor, member_month_command(request))
        .await
    {
        Ok(result) => (
            StatusCode::CREATED,
            Json(ForcePaidResponse {
                id: result.entry_id,
                amount: result.amount,
            }),
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to force paid: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn force_unpaid(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    ApiJson(request): ApiJson<MemberMonthRequest>,
) -> impl IntoResponse {
    info!("POST /api/ledger/deposits/force-unpaid - request: {:?}", request);
    let actor = match actor.require_admin() {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    match state
        .ledger_service
        .force_unpaid(&actor, member_month_command(request))
        .await
    {
        Ok(updated) => (StatusCode::OK, Json(ForceUnpaidResponse { updated })).into_response(),
        Err(e) => {
            warn!("Failed to force unpaid: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn force_zero_paid(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    ApiJson(request): ApiJson<MemberMonthRequest>,
) -> impl IntoResponse {
    info!("POST /api/ledger/deposits/force-zero-paid - request: {:?}", request);
    let actor = match actor.require_admin() {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    match state
        .ledger_service
        .force_zero_paid(&actor, member_month_command(request))
        .await
    {
        Ok(entry) => (StatusCode::CREATED, Json(EntryCreatedResponse { id: entry.id })).into_response(),
        Err(e) => {
            warn!("Failed to force zero paid: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

/// Approve or reject a pending deposit
pub async fn decide_deposit(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    Path(entry_id): Path<String>,
    ApiJson(request): ApiJson<DecisionRequest>,
) -> impl IntoResponse {
    info!("PATCH /api/ledger/deposits/{}/decision - request: {:?}", entry_id, request);
    let actor = match actor.require_admin() {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    let decision = EntryMapper::decision_to_domain(request.action);
    match state.ledger_service.decide_deposit(&actor, &entry_id, decision).await {
        Ok(result) => (
            StatusCode::OK,
            Json(DecisionResponse {
                id: result.entry_id,
                status: EntryMapper::status_to_dto(result.status),
            }),
        )
            .into_response(),
        Err(e) => {
            warn!("Failed to decide deposit {}: {}", entry_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn update_entry(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    Path(entry_id): Path<String>,
    ApiJson(request): ApiJson<UpdateEntryRequest>,
) -> impl IntoResponse {
    info!("PATCH /api/ledger/entries/{} - request: {:?}", entry_id, request);
    let actor = match actor.require_admin() {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    let command = UpdateEntryCommand {
        amount: request.amount,
        note: request.note,
        month_key: request.month_key,
        status: request.status.map(EntryMapper::status_to_domain),
    };

    match state.ledger_service.update_entry(&actor, &entry_id, command).await {
        Ok(entry) => (StatusCode::OK, Json(EntryCreatedResponse { id: entry.id })).into_response(),
        Err(e) => {
            warn!("Failed to update entry {}: {}", entry_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn delete_entry(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    Path(entry_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/ledger/entries/{}", entry_id);
    let actor = match actor.require_admin() {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    match state.ledger_service.delete_entry(&actor, &entry_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            warn!("Failed to delete entry {}: {}", entry_id, e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn create_withdrawal(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    ApiJson(request): ApiJson<CashEntryRequest>,
) -> impl IntoResponse {
    info!("POST /api/ledger/withdrawals - request: {:?}", request);
    let actor = match actor.require_admin() {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    let command = CashMovementCommand {
        amount: request.amount,
        note: request.note.unwrap_or_default(),
    };

    match state.ledger_service.create_withdrawal(&actor, command).await {
        Ok(entry) => (StatusCode::CREATED, Json(EntryCreatedResponse { id: entry.id })).into_response(),
        Err(e) => {
            warn!("Failed to create withdrawal: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn create_adjustment(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    ApiJson(request): ApiJson<CashEntryRequest>,
) -> impl IntoResponse {
    info!("POST /api/ledger/adjustments - request: {:?}", request);
    let actor = match actor.require_admin() {
        Ok(actor) => actor,
        Err(e) => return e.into_response(),
    };

    let command = CashMovementCommand {
        amount: request.amount,
        note: request.note.unwrap_or_default(),
    };

    match state.ledger_service.create_adjustment(&actor, command).await {
        Ok(entry) => (StatusCode::CREATED, Json(EntryCreatedResponse { id: entry.id })).into_response(),
        Err(e) => {
            warn!("Failed to create adjustment: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::{Actor, Member, Role};
    use crate::backend::domain::test_support::{calendar, seed_member};
    use crate::backend::storage::DbConnection;
    use crate::backend::build_state;
    use shared::{DecisionAction, EntryStatus};

    struct TestContext {
        state: AppState,
        admin: Member,
        member: Member,
    }

    async fn setup_test_state() -> TestContext {
        let db = DbConnection::init_test().await.unwrap();
        let admin = seed_member(&db, "admin", Role::Admin, 0).await;
        let member = seed_member(&db, "alice", Role::Member, 1000).await;
        TestContext {
            state: build_state(db, calendar()),
            admin,
            member,
        }
    }

    fn as_admin(ctx: &TestContext) -> AuthenticatedActor {
        AuthenticatedActor(Actor::new(ctx.admin.id.clone(), Role::Admin))
    }

    fn as_member(ctx: &TestContext) -> AuthenticatedActor {
        AuthenticatedActor(Actor::new(ctx.member.id.clone(), Role::Member))
    }

    fn member_month(ctx: &TestContext) -> MemberMonthRequest {
        MemberMonthRequest {
            member_id: ctx.member.id.clone(),
            month_key: "2025-10".to_string(),
            note: None,
        }
    }

    async fn created_id(response: axum::response::Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let created: EntryCreatedResponse = serde_json::from_slice(&body).unwrap();
        created.id
    }

    #[tokio::test]
    async fn test_request_deposit_handler() {
        let ctx = setup_test_state().await;
        let request = RequestDepositRequest {
            amount: 1000,
            month_key: "2025-10".to_string(),
            note: None,
        };

        let response = request_deposit(State(ctx.state.clone()), as_member(&ctx), ApiJson(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_request_deposit_validation_error() {
        let ctx = setup_test_state().await;
        let request = RequestDepositRequest {
            amount: 1000,
            month_key: "October".to_string(),
            note: None,
        };

        let response = request_deposit(State(ctx.state.clone()), as_member(&ctx), ApiJson(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_routes_reject_members() {
        let ctx = setup_test_state().await;
        let request = CashEntryRequest {
            amount: 100,
            note: None,
        };

        let response = create_withdrawal(State(ctx.state.clone()), as_member(&ctx), ApiJson(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::FORBIDDEN);

        let response = force_paid(State(ctx.state.clone()), as_member(&ctx), ApiJson(member_month(&ctx))).await;
        assert_eq!(response.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_deposit_to_donation_target() {
        let ctx = setup_test_state().await;
        let request = AdminDepositRequest {
            amount: 7000,
            month_key: "2025-10".to_string(),
            note: Some("sponsor".to_string()),
            member_id: DONATION_TARGET_ID.to_string(),
        };

        let response = admin_deposit(State(ctx.state.clone()), as_admin(&ctx), ApiJson(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_admin_deposit_unknown_member() {
        let ctx = setup_test_state().await;
        let request = AdminDepositRequest {
            amount: 7000,
            month_key: "2025-10".to_string(),
            note: None,
            member_id: "nobody".to_string(),
        };

        let response = admin_deposit(State(ctx.state.clone()), as_admin(&ctx), ApiJson(request)).await;
        assert_eq!(response.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_force_paid_twice_is_conflict() {
        let ctx = setup_test_state().await;

        let first = force_paid(State(ctx.state.clone()), as_admin(&ctx), ApiJson(member_month(&ctx))).await;
        assert_eq!(first.into_response().status(), StatusCode::CREATED);

        let second = force_paid(State(ctx.state.clone()), as_admin(&ctx), ApiJson(member_month(&ctx))).await;
        assert_eq!(second.into_response().status(), StatusCode::CONFLICT);

        let unpaid = force_unpaid(State(ctx.state.clone()), as_admin(&ctx), ApiJson(member_month(&ctx))).await;
        assert_eq!(unpaid.into_response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_force_zero_paid_twice_is_conflict() {
        let ctx = setup_test_state().await;

        let first = force_zero_paid(State(ctx.state.clone()), as_admin(&ctx), ApiJson(member_month(&ctx))).await;
        assert_eq!(first.into_response().status(), StatusCode::CREATED);

        let second = force_zero_paid(State(ctx.state.clone()), as_admin(&ctx), ApiJson(member_month(&ctx))).await;
        assert_eq!(second.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_decision_lifecycle() {
        let ctx = setup_test_state().await;
        let request = RequestDepositRequest {
            amount: 1000,
            month_key: "2025-10".to_string(),
            note: None,
        };
        let response = request_deposit(State(ctx.state.clone()), as_member(&ctx), ApiJson(request))
            .await
            .into_response();
        let entry_id = created_id(response).await;

        let approve = DecisionRequest {
            action: DecisionAction::Approve,
        };
        let response = decide_deposit(
            State(ctx.state.clone()),
            as_admin(&ctx),
            Path(entry_id.clone()),
            ApiJson(approve.clone()),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let decided: DecisionResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(decided.status, EntryStatus::Approved);

        let again = decide_deposit(State(ctx.state.clone()), as_admin(&ctx), Path(entry_id), ApiJson(approve)).await;
        assert_eq!(again.into_response().status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_update_and_delete_entry_handlers() {
        let ctx = setup_test_state().await;
        let request = CashEntryRequest {
            amount: -500,
            note: Some("correction".to_string()),
        };
        let response = create_adjustment(State(ctx.state.clone()), as_admin(&ctx), ApiJson(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let entry_id = created_id(response).await;

        let bad_update = UpdateEntryRequest {
            month_key: Some("2025-10".to_string()),
            ..Default::default()
        };
        let response = update_entry(State(ctx.state.clone()), as_admin(&ctx), Path(entry_id.clone()), ApiJson(bad_update)).await;
        assert_eq!(response.into_response().status(), StatusCode::BAD_REQUEST);

        let good_update = UpdateEntryRequest {
            amount: Some(-700),
            ..Default::default()
        };
        let response = update_entry(State(ctx.state.clone()), as_admin(&ctx), Path(entry_id.clone()), ApiJson(good_update)).await;
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let response = delete_entry(State(ctx.state.clone()), as_admin(&ctx), Path(entry_id.clone())).await;
        assert_eq!(response.into_response().status(), StatusCode::NO_CONTENT);

        let response = delete_entry(State(ctx.state.clone()), as_admin(&ctx), Path(entry_id)).await;
        assert_eq!(response.into_response().status(), StatusCode::NOT_FOUND);
    }
}
