use axum::{extract::{Path, State}, http::{StatusCode, Uri}, Json};
use tracing::info;

use models::quote;
use service::quotes::{self, DailyQuoteView, QuoteInput, RandomQuote};

use crate::errors::{ApiJson, ApiQuery, JsonApiError};
use crate::routes::{auth::ServerState, page_body, ListQuery, PageBody};

/// Today's quote in the salon's timezone.
#[utoipa::path(
    get, path = "/api/random-quote/", tag = "quotes",
    responses(
        (status = 200, description = "Quote of the day", body = crate::openapi::RandomQuoteDoc),
        (status = 404, description = "No quotes at all")
    )
)]
pub async fn random_quote(State(state): State<ServerState>) -> Result<Json<RandomQuote>, JsonApiError> {
    match quotes::today_quote(&state.db, state.quotes_tz).await? {
        Some(q) => Ok(Json(q.into())),
        None => Err(JsonApiError::not_found("quote not found")),
    }
}

#[utoipa::path(
    get, path = "/api/quotes/", tag = "quotes",
    params(ListQuery),
    responses((status = 200, description = "Paginated quotes, newest first"), (status = 401, description = "Unauthorized"))
)]
pub async fn list(
    State(state): State<ServerState>,
    uri: Uri,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<PageBody<quote::Model>>, JsonApiError> {
    let page = quotes::list(&state.db, &q.into()).await?;
    Ok(Json(page_body(&state, &uri, page)))
}

#[utoipa::path(
    post, path = "/api/quotes/", tag = "quotes",
    request_body = crate::openapi::QuoteDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(
    State(state): State<ServerState>,
    ApiJson(input): ApiJson<QuoteInput>,
) -> Result<(StatusCode, Json<quote::Model>), JsonApiError> {
    let created = quotes::create(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/quotes/{id}/", tag = "quotes",
    params(("id" = i32, Path, description = "quote id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<quote::Model>, JsonApiError> {
    Ok(Json(quotes::get(&state.db, id).await?))
}

#[utoipa::path(
    delete, path = "/api/quotes/{id}/", tag = "quotes",
    params(("id" = i32, Path, description = "quote id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if quotes::delete(&state.db, id).await? {
        info!(id, "deleted quote");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("quote not found"))
    }
}

#[utoipa::path(
    get, path = "/api/quotes/daily/", tag = "quotes",
    params(ListQuery),
    responses((status = 200, description = "Daily quote history, newest date first"))
)]
pub async fn daily(
    State(state): State<ServerState>,
    uri: Uri,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<PageBody<DailyQuoteView>>, JsonApiError> {
    let page = quotes::daily_history(&state.db, &q.into()).await?;
    Ok(Json(page_body(&state, &uri, page)))
}
