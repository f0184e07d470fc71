use std::sync::Arc;

use axum::{extract::{Request, State}, http::header, middleware::Next, response::Response, Json};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;
use tracing::warn;

use service::auth::domain::{LoginInput, RefreshInput, TokenPair};
use service::auth::errors::AuthError;
use service::auth::repository::AuthRepository;
use service::auth::AuthService;
use service::images::MediaStore;

use crate::errors::{ApiJson, JsonApiError};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<dyn AuthRepository>>,
    pub media: MediaStore,
    /// Absolute origin for pagination links, when configured.
    pub public_url: Option<String>,
    pub quotes_tz: Tz,
}

#[utoipa::path(
    post, path = "/api/auth/", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Token pair", body = crate::openapi::TokenPairDoc),
        (status = 400, description = "Missing fields, invalid credentials or disabled account")
    )
)]
pub async fn login(State(state): State<ServerState>, ApiJson(input): ApiJson<LoginInput>) -> Result<Json<TokenPair>, JsonApiError> {
    let session = state.auth.login(input).await?;
    Ok(Json(session.tokens))
}

#[utoipa::path(
    post, path = "/api/auth/refresh/", tag = "auth",
    request_body = crate::openapi::RefreshRequest,
    responses(
        (status = 200, description = "Rotated token pair", body = crate::openapi::TokenPairDoc),
        (status = 400, description = "Missing refresh_token"),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(State(state): State<ServerState>, ApiJson(input): ApiJson<RefreshInput>) -> Result<Json<TokenPair>, JsonApiError> {
    match state.auth.refresh(input).await {
        Ok(pair) => Ok(Json(pair)),
        Err(AuthError::InvalidToken) => Err(JsonApiError::unauthorized("invalid refresh token")),
        Err(e) => Err(e.into()),
    }
}

fn bearer(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Require `Authorization: Bearer <access token>` and inject the
/// [`service::auth::domain::AuthUser`] into request extensions.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let Some(token) = bearer(&req).map(str::to_owned) else {
        warn!(path = %req.uri().path(), "missing or malformed Authorization header");
        return Err(JsonApiError::unauthorized("authentication credentials were not provided"));
    };
    let authenticated = state.auth.authenticate(&token).await;
    match authenticated {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(AuthError::InvalidToken) => {
            warn!(path = %req.uri().path(), "token validation failed");
            Err(JsonApiError::unauthorized("invalid token"))
        }
        Err(e) => Err(e.into()),
    }
}
