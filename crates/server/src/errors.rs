use axum::async_trait;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;

use models::errors::ModelError;
use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// JSON error body: `{"error": ..., "detail": ...}`.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, error: error.into(), detail }
    }

    pub fn bad_request(error: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, error, None) }

    pub fn not_found(error: impl Into<String>) -> Self { Self::new(StatusCode::NOT_FOUND, error, None) }

    pub fn unauthorized(error: impl Into<String>) -> Self { Self::new(StatusCode::UNAUTHORIZED, error, None) }

    /// 500 without leaking the cause; the cause is logged.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!(err = %cause, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error", None)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(&self)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) | ServiceError::Conflict(msg) => Self::bad_request(msg),
            ServiceError::Model(ModelError::Validation(msg)) => Self::bad_request(msg),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            other => Self::internal(other),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => Self::bad_request(msg),
            AuthError::Conflict | AuthError::Unauthorized | AuthError::Disabled => Self::bad_request(e.to_string()),
            AuthError::InvalidToken => Self::unauthorized(e.to_string()),
            other => {
                error!(code = other.code(), "auth failure");
                Self::internal(other)
            }
        }
    }
}

/// `Json<T>` whose rejections are rendered as [`JsonApiError`] (400).
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> JsonApiError {
    JsonApiError::new(StatusCode::BAD_REQUEST, "invalid request body", Some(rejection.body_text()))
}

/// `Query<T>` with [`JsonApiError`] rejections.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(v)| Self(v))
            .map_err(|e: QueryRejection| JsonApiError::new(StatusCode::BAD_REQUEST, "invalid query parameters", Some(e.body_text())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn service_errors_map_to_status() {
        let resp = JsonApiError::from(ServiceError::validation("name is required")).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, serde_json::json!({"error": "name is required"}));

        let resp = JsonApiError::from(ServiceError::not_found("master")).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = JsonApiError::from(ServiceError::Model(ModelError::Validation("bad".into()))).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn db_errors_do_not_leak() {
        let resp = JsonApiError::from(ServiceError::Db("relation \"secret\" does not exist".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "internal server error");
        assert!(body.get("detail").is_none());
    }

    #[test]
    fn auth_errors_map_to_status() {
        assert_eq!(JsonApiError::from(AuthError::Unauthorized).status, StatusCode::BAD_REQUEST);
        assert_eq!(JsonApiError::from(AuthError::Disabled).error, "account disabled");
        assert_eq!(JsonApiError::from(AuthError::InvalidToken).status, StatusCode::UNAUTHORIZED);
        assert_eq!(JsonApiError::from(AuthError::Repository("down".into())).status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
