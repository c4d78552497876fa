//! JSON request bodies.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    Json,
};
use log::warn;
use serde::de::DeserializeOwned;

use super::error::ApiError;

/// [`Json`] extractor that rejects malformed bodies with an [`ApiError`]
/// (400 and a `{ "message": ... }` body) instead of axum's plain-text 422.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };
        let message = rejection.body_text();
        warn!("Rejected request body: {}", message);
        ApiError::new(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use shared::CashEntryRequest;

    async fn extract(
        content_type: Option<&str>,
        body: &'static str,
    ) -> Result<ApiJson<CashEntryRequest>, ApiError> {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let request = builder.body(Body::from(body)).unwrap();
        ApiJson::<CashEntryRequest>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn test_valid_body_is_extracted() {
        let ApiJson(request) = extract(Some("application/json"), r#"{"amount":1000,"note":"snacks"}"#)
            .await
            .unwrap();
        assert_eq!(request.amount, 1000);
        assert_eq!(request.note.as_deref(), Some("snacks"));
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_bad_requests() {
        for body in [r#"{"amount":10.5}"#, r#"{"note":"no amount"}"#, r#"{"amount":"#] {
            let err = extract(Some("application/json"), body).await.unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST, "body {}", body);
            assert!(!err.message().is_empty());
        }
    }

    #[tokio::test]
    async fn test_missing_content_type_is_unsupported_media_type() {
        let err = extract(None, r#"{"amount":1000}"#).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
