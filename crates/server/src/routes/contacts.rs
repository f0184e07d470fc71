use axum::{extract::State, http::StatusCode, Json};

use service::catalog::{contacts::{self, ContactInput, ContactView}, WriteMode};

use crate::errors::{ApiJson, JsonApiError};
use crate::routes::auth::ServerState;

fn created_or_ok((view, created): (ContactView, bool)) -> (StatusCode, Json<ContactView>) {
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    (status, Json(view))
}

#[utoipa::path(
    get, path = "/api/contacts/", tag = "contacts",
    responses((status = 200, description = "Contacts, empty when not configured yet", body = crate::openapi::ContactDoc))
)]
pub async fn get(State(state): State<ServerState>) -> Result<Json<ContactView>, JsonApiError> {
    Ok(Json(contacts::get(&state.db).await?))
}

#[utoipa::path(
    post, path = "/api/contacts/", tag = "contacts",
    request_body = crate::openapi::ContactDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error or contacts already exist"))
)]
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<ContactInput>,
) -> Result<(StatusCode, Json<ContactView>), JsonApiError> {
    let created = contacts::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put, path = "/api/contacts/", tag = "contacts",
    request_body = crate::openapi::ContactDoc,
    responses((status = 200, description = "Replaced"), (status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn replace(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<ContactInput>,
) -> Result<(StatusCode, Json<ContactView>), JsonApiError> {
    Ok(created_or_ok(contacts::upsert(&state.db, input, WriteMode::Replace).await?))
}

#[utoipa::path(
    patch, path = "/api/contacts/", tag = "contacts",
    request_body = crate::openapi::ContactDoc,
    responses((status = 200, description = "Updated"), (status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn patch(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<ContactInput>,
) -> Result<(StatusCode, Json<ContactView>), JsonApiError> {
    Ok(created_or_ok(contacts::upsert(&state.db, input, WriteMode::Patch).await?))
}
