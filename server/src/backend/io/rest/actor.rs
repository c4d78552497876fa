//! Acting identity of a request.
//!
//! Authentication happens upstream; the gateway forwards the verified member
//! id and role in trusted headers.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use super::error::ApiError;
use crate::backend::domain::models::{Actor, Role};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor for the acting member; rejects with 401 when headers are missing
#[derive(Debug, Clone)]
pub struct AuthenticatedActor(pub Actor);

impl AuthenticatedActor {
    pub fn into_inner(self) -> Actor {
        self.0
    }

    /// The actor, when it holds the admin role; 403 otherwise
    pub fn require_admin(self) -> Result<Actor, ApiError> {
        match self.0.role {
            Role::Admin => Ok(self.0),
            Role::Member => Err(ApiError::forbidden()),
        }
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let member_id = header_value(&parts.headers, ACTOR_ID_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
        let role = header_value(&parts.headers, ACTOR_ROLE_HEADER)
            .and_then(|role| role.parse::<Role>().ok())
            .ok_or_else(|| ApiError::unauthorized("Invalid actor role"))?;

        Ok(Self(Actor::new(member_id, role)))
    }
}
