use axum::{extract::{Path, State}, http::{StatusCode, Uri}, Json};
use tracing::info;

use service::catalog::{service_types::{self, ServiceTypeFilter, ServiceTypeInput, ServiceTypeView}, WriteMode};

use crate::errors::{ApiJson, ApiQuery, JsonApiError};
use crate::routes::{auth::ServerState, page_body, ListQuery, PageBody};

#[utoipa::path(
    get, path = "/api/service_types/", tag = "service_types",
    params(ListQuery, ("target" = Option<String>, Query, description = "exact target"), ("client_types" = Option<String>, Query, description = "substring of client types")),
    responses((status = 200, description = "Paginated service types"), (status = 401, description = "Unauthorized"))
)]
pub async fn list(
    State(state): State<ServerState>,
    uri: Uri,
    ApiQuery(q): ApiQuery<ListQuery>,
    ApiQuery(filter): ApiQuery<ServiceTypeFilter>,
) -> Result<Json<PageBody<ServiceTypeView>>, JsonApiError> {
    let page = service_types::list(&state.db, &filter, &q.into()).await?;
    Ok(Json(page_body(&state, &uri, page)))
}

#[utoipa::path(
    post, path = "/api/service_types/", tag = "service_types",
    request_body = crate::openapi::ServiceTypeDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<ServiceTypeInput>,
) -> Result<(StatusCode, Json<ServiceTypeView>), JsonApiError> {
    let created = service_types::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/service_types/{id}/", tag = "service_types",
    params(("id" = i32, Path, description = "service type id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<ServiceTypeView>, JsonApiError> {
    Ok(Json(service_types::get(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/service_types/{id}/", tag = "service_types",
    params(("id" = i32, Path, description = "service type id")),
    request_body = crate::openapi::ServiceTypeDoc,
    responses((status = 200, description = "Replaced"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn replace(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<ServiceTypeInput>,
) -> Result<Json<ServiceTypeView>, JsonApiError> {
    Ok(Json(service_types::update(&state.db, id, input, WriteMode::Replace).await?))
}

#[utoipa::path(
    patch, path = "/api/service_types/{id}/", tag = "service_types",
    params(("id" = i32, Path, description = "service type id")),
    request_body = crate::openapi::ServiceTypeDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<ServiceTypeInput>,
) -> Result<Json<ServiceTypeView>, JsonApiError> {
    Ok(Json(service_types::update(&state.db, id, input, WriteMode::Patch).await?))
}

#[utoipa::path(
    delete, path = "/api/service_types/{id}/", tag = "service_types",
    params(("id" = i32, Path, description = "service type id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if service_types::delete(&state.db, id).await? {
        info!(id, "deleted service type");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("service type not found"))
    }
}
