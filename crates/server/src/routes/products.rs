//! Products can be created and deleted but never edited; PUT and PATCH fall
//! through to the router's 405.

use axum::{extract::{Path, State}, http::{StatusCode, Uri}, Json};
use tracing::info;

use models::product;
use service::catalog::products::{self, ProductFilter, ProductInput, ProductListItem};

use crate::errors::{ApiJson, ApiQuery, JsonApiError};
use crate::routes::{auth::ServerState, page_body, ListQuery, PageBody};

#[utoipa::path(
    get, path = "/api/products/", tag = "products",
    params(
        ListQuery,
        ("purpose" = Option<String>, Query, description = "exact purpose"),
        ("brand" = Option<String>, Query, description = "exact brand"),
        ("name" = Option<String>, Query, description = "exact name")
    ),
    responses((status = 200, description = "Paginated products"), (status = 401, description = "Unauthorized"))
)]
pub async fn list(
    State(state): State<ServerState>,
    uri: Uri,
    ApiQuery(q): ApiQuery<ListQuery>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Result<Json<PageBody<ProductListItem>>, JsonApiError> {
    let page = products::list(&state.db, &filter, &q.into()).await?;
    Ok(Json(page_body(&state, &uri, page)))
}

#[utoipa::path(
    post, path = "/api/products/", tag = "products",
    request_body = crate::openapi::ProductDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<product::Model>), JsonApiError> {
    let created = products::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/products/{id}/", tag = "products",
    params(("id" = i32, Path, description = "product id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<product::Model>, JsonApiError> {
    Ok(Json(products::get(&state.db, id).await?))
}

#[utoipa::path(
    delete, path = "/api/products/{id}/", tag = "products",
    params(("id" = i32, Path, description = "product id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if products::delete(&state.db, id).await? {
        info!(id, "deleted product");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("product not found"))
    }
}
