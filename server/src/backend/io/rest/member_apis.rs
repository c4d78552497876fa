//! # REST API for the Member Directory

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, patch},
    Router,
};
use log::{error, info, warn};

use super::actor::AuthenticatedActor;
use super::error::ApiError;
use super::json::ApiJson;
use crate::backend::domain::commands::members::CreateMemberCommand;
use crate::backend::domain::models::Role;
use crate::backend::io::rest::mappers::member_mapper::MemberMapper;
use crate::backend::AppState;
use shared::{CreateMemberRequest, MemberListResponse, UpdateMonthlyFeeRequest};

/// Create a router for member APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_members).post(create_member))
        .route("/:id/monthly-fee", patch(update_monthly_fee))
}

pub async fn list_members(
    State(state): State<AppState>,
    _actor: AuthenticatedActor,
) -> impl IntoResponse {
    info!("GET /api/members");

    match state.member_service.list_members().await {
        Ok(members) => {
            let response = MemberListResponse {
                members: MemberMapper::to_dto_list(members),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to list members: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn create_member(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    ApiJson(request): ApiJson<CreateMemberRequest>,
) -> impl IntoResponse {
    info!("POST /api/members - request: {:?}", request);
    if let Err(e) = actor.require_admin() {
        return e.into_response();
    }

    let command = CreateMemberCommand {
        name: request.name,
        role: request
            .role
            .map(MemberMapper::role_to_domain)
            .unwrap_or(Role::Member),
        monthly_fee: request.monthly_fee.unwrap_or(0),
    };

    match state.member_service.create_member(command).await {
        Ok(member) => (StatusCode::CREATED, Json(MemberMapper::to_dto(member))).into_response(),
        Err(e) => {
            warn!("Failed to create member: {}", e);
            ApiError::from(e).into_response()
        }
    }
}

pub async fn update_monthly_fee(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
    Path(member_id): Path<String>,
    ApiJson(request): ApiJson<UpdateMonthlyFeeRequest>,
) -> impl IntoResponse {
    info!("PATCH /api/members/{}/monthly-fee - request: {:?}", member_id, request);
    if let Err(e) = actor.require_admin() {
        return e.into_response();
    }

    match state
        .member_service
        .update_monthly_fee(&member_id, request.monthly_fee)
        .await
    {
        Ok(member) => (StatusCode::OK, Json(MemberMapper::to_dto(member))).into_response(),
        Err(e) => {
            warn!("Failed to update monthly fee for {}: {}", member_id, e);
            ApiError::from(e).into_response()
        }
    }
}
