use axum::{extract::{Path, State}, http::StatusCode, Json};
use serde::Serialize;
use tracing::info;

use service::catalog::{services::{self, ServiceFilter, ServiceInput, ServiceView}, WriteMode};

use crate::errors::{ApiJson, ApiQuery, JsonApiError};
use crate::routes::{auth::ServerState, ListQuery};

/// Services answer with their own envelope: `count` is the page size,
/// `full_count` the number of matching rows.
#[derive(Debug, Serialize)]
pub struct ServicePage {
    pub result: Vec<ServiceView>,
    pub count: usize,
    pub full_count: u64,
}

#[utoipa::path(
    get, path = "/api/services/", tag = "services",
    params(
        ListQuery,
        ("service_type_id" = Option<i32>, Query, description = "service type id"),
        ("price_from_min" = Option<i32>, Query, description = "price_from >="),
        ("price_from_max" = Option<i32>, Query, description = "price_from <="),
        ("price_to_min" = Option<i32>, Query, description = "price_to >="),
        ("price_to_max" = Option<i32>, Query, description = "price_to <="),
        ("duration" = Option<String>, Query, description = "substring of duration"),
        ("target" = Option<String>, Query, description = "case-insensitive target"),
        ("client_types" = Option<String>, Query, description = "comma-separated client types, any of")
    ),
    responses((status = 200, description = "Services page"), (status = 401, description = "Unauthorized"))
)]
pub async fn list(
    State(state): State<ServerState>,
    ApiQuery(q): ApiQuery<ListQuery>,
    ApiQuery(filter): ApiQuery<ServiceFilter>,
) -> Result<Json<ServicePage>, JsonApiError> {
    let page = services::list(&state.db, &filter, &q.into()).await?;
    Ok(Json(ServicePage { count: page.items.len(), full_count: page.total, result: page.items }))
}

#[utoipa::path(
    post, path = "/api/services/", tag = "services",
    request_body = crate::openapi::ServiceDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> Result<(StatusCode, Json<ServiceView>), JsonApiError> {
    let created = services::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/services/{id}/", tag = "services",
    params(("id" = i32, Path, description = "service id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<ServiceView>, JsonApiError> {
    Ok(Json(services::get(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/services/{id}/", tag = "services",
    params(("id" = i32, Path, description = "service id")),
    request_body = crate::openapi::ServiceDoc,
    responses((status = 200, description = "Replaced"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn replace(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> Result<Json<ServiceView>, JsonApiError> {
    Ok(Json(services::update(&state.db, id, input, WriteMode::Replace).await?))
}

#[utoipa::path(
    patch, path = "/api/services/{id}/", tag = "services",
    params(("id" = i32, Path, description = "service id")),
    request_body = crate::openapi::ServiceDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> Result<Json<ServiceView>, JsonApiError> {
    Ok(Json(services::update(&state.db, id, input, WriteMode::Patch).await?))
}

#[utoipa::path(
    delete, path = "/api/services/{id}/", tag = "services",
    params(("id" = i32, Path, description = "service id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if services::delete(&state.db, id).await? {
        info!(id, "deleted service");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("service not found"))
    }
}
