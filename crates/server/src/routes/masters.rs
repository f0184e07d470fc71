use axum::{extract::{Path, State}, http::{StatusCode, Uri}, Json};
use tracing::info;

use service::catalog::{masters::{self, MasterDetail, MasterFilter, MasterInput, MasterListItem}, WriteMode};

use crate::errors::{ApiJson, ApiQuery, JsonApiError};
use crate::routes::{auth::ServerState, page_body, ListQuery, PageBody};

#[utoipa::path(
    get, path = "/api/masters/", tag = "masters",
    params(
        ListQuery,
        ("service_types_ids" = Option<String>, Query, description = "comma-separated service type ids"),
        ("experience_min" = Option<i32>, Query, description = "experience >="),
        ("experience_max" = Option<i32>, Query, description = "experience <="),
        ("target" = Option<String>, Query, description = "target of a linked service type")
    ),
    responses((status = 200, description = "Paginated masters"), (status = 401, description = "Unauthorized"))
)]
pub async fn list(
    State(state): State<ServerState>,
    uri: Uri,
    ApiQuery(q): ApiQuery<ListQuery>,
    ApiQuery(filter): ApiQuery<MasterFilter>,
) -> Result<Json<PageBody<MasterListItem>>, JsonApiError> {
    let page = masters::list(&state.db, &filter, &q.into()).await?;
    Ok(Json(page_body(&state, &uri, page)))
}

#[utoipa::path(
    post, path = "/api/masters/", tag = "masters",
    request_body = crate::openapi::MasterDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<MasterInput>,
) -> Result<(StatusCode, Json<MasterDetail>), JsonApiError> {
    let created = masters::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/masters/{id}/", tag = "masters",
    params(("id" = i32, Path, description = "master id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<MasterDetail>, JsonApiError> {
    Ok(Json(masters::get(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/masters/{id}/", tag = "masters",
    params(("id" = i32, Path, description = "master id")),
    request_body = crate::openapi::MasterDoc,
    responses((status = 200, description = "Replaced"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn replace(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<MasterInput>,
) -> Result<Json<MasterDetail>, JsonApiError> {
    Ok(Json(masters::update(&state.db, id, input, WriteMode::Replace).await?))
}

#[utoipa::path(
    patch, path = "/api/masters/{id}/", tag = "masters",
    params(("id" = i32, Path, description = "master id")),
    request_body = crate::openapi::MasterDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<MasterInput>,
) -> Result<Json<MasterDetail>, JsonApiError> {
    Ok(Json(masters::update(&state.db, id, input, WriteMode::Patch).await?))
}

#[utoipa::path(
    delete, path = "/api/masters/{id}/", tag = "masters",
    params(("id" = i32, Path, description = "master id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if masters::delete(&state.db, id).await? {
        info!(id, "deleted master");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("master not found"))
    }
}
