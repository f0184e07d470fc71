use axum::{extract::{Path, State}, http::{StatusCode, Uri}, Json};
use tracing::info;

use service::catalog::{portfolio::{self, PortfolioDetail, PortfolioFilter, PortfolioInput, PortfolioListItem}, WriteMode};

use crate::errors::{ApiJson, ApiQuery, JsonApiError};
use crate::routes::{auth::ServerState, page_body, ListQuery, PageBody};

#[utoipa::path(
    get, path = "/api/portfolio/", tag = "portfolio",
    params(
        ListQuery,
        ("service_type_id" = Option<i32>, Query, description = "service type id"),
        ("service_id" = Option<i32>, Query, description = "service id"),
        ("master_name" = Option<String>, Query, description = "master name, exact when possible, substring otherwise")
    ),
    responses((status = 200, description = "Paginated portfolio"), (status = 401, description = "Unauthorized"))
)]
pub async fn list(
    State(state): State<ServerState>,
    uri: Uri,
    ApiQuery(q): ApiQuery<ListQuery>,
    ApiQuery(filter): ApiQuery<PortfolioFilter>,
) -> Result<Json<PageBody<PortfolioListItem>>, JsonApiError> {
    let page = portfolio::list(&state.db, &filter, &q.into()).await?;
    Ok(Json(page_body(&state, &uri, page)))
}

#[utoipa::path(
    post, path = "/api/portfolio/", tag = "portfolio",
    request_body = crate::openapi::PortfolioDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<PortfolioInput>,
) -> Result<(StatusCode, Json<PortfolioDetail>), JsonApiError> {
    let created = portfolio::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/portfolio/{id}/", tag = "portfolio",
    params(("id" = i32, Path, description = "portfolio item id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<PortfolioDetail>, JsonApiError> {
    Ok(Json(portfolio::get(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/api/portfolio/{id}/", tag = "portfolio",
    params(("id" = i32, Path, description = "portfolio item id")),
    request_body = crate::openapi::PortfolioDoc,
    responses((status = 200, description = "Replaced"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn replace(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<PortfolioInput>,
) -> Result<Json<PortfolioDetail>, JsonApiError> {
    Ok(Json(portfolio::update(&state.db, id, input, WriteMode::Replace).await?))
}

#[utoipa::path(
    patch, path = "/api/portfolio/{id}/", tag = "portfolio",
    params(("id" = i32, Path, description = "portfolio item id")),
    request_body = crate::openapi::PortfolioDoc,
    responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found"))
)]
pub async fn patch(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<PortfolioInput>,
) -> Result<Json<PortfolioDetail>, JsonApiError> {
    Ok(Json(portfolio::update(&state.db, id, input, WriteMode::Patch).await?))
}

#[utoipa::path(
    delete, path = "/api/portfolio/{id}/", tag = "portfolio",
    params(("id" = i32, Path, description = "portfolio item id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if portfolio::delete(&state.db, id).await? {
        info!(id, "deleted portfolio item");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("portfolio item not found"))
    }
}
