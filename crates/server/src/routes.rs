pub mod auth;
pub mod contacts;
pub mod images;
pub mod masters;
pub mod portfolio;
pub mod products;
pub mod quotes;
pub mod service_types;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Uri},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::Layer;
use tower_http::{
    cors::CorsLayer,
    normalize_path::{NormalizePath, NormalizePathLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::catalog::ListParams;
use service::pagination::{Page, PageLinks, Pagination};

use crate::openapi::ApiDoc;
use auth::ServerState;

/// Upper bound for multipart image uploads.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], common::metrics::render())
}

/// `page`, `page_size`, `search` and `ordering` query parameters.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

impl From<ListQuery> for ListParams {
    fn from(q: ListQuery) -> Self {
        ListParams {
            pagination: Pagination::new(q.page, q.page_size),
            search: q.search.filter(|s| !s.trim().is_empty()),
            ordering: q.ordering,
        }
    }
}

/// Standard list envelope.
#[derive(Debug, Serialize)]
pub struct PageBody<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

pub fn page_body<T>(state: &ServerState, uri: &Uri, page: Page<T>) -> PageBody<T> {
    let base = match state.public_url.as_deref() {
        Some(origin) => format!("{}{}", origin.trim_end_matches('/'), uri.path()),
        None => uri.path().to_string(),
    };
    let links = PageLinks::build(&base, uri.query(), &page);
    PageBody { count: page.total, next: links.next, previous: links.previous, results: page.items }
}

/// Build the full application router: public routes, the bearer-protected
/// management API and media files.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let media = ServeDir::new(state.media.root());
    let media_prefix = state.media.mount_path().to_string();

    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api/auth", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/random-quote", get(quotes::random_quote));

    let api = Router::new()
        .route("/api/service_types", get(service_types::list).post(service_types::create))
        .route(
            "/api/service_types/:id",
            get(service_types::get).put(service_types::replace).patch(service_types::patch).delete(service_types::delete),
        )
        .route("/api/services", get(services::list).post(services::create))
        .route(
            "/api/services/:id",
            get(services::get).put(services::replace).patch(services::patch).delete(services::delete),
        )
        .route("/api/masters", get(masters::list).post(masters::create))
        .route(
            "/api/masters/:id",
            get(masters::get).put(masters::replace).patch(masters::patch).delete(masters::delete),
        )
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/:id", get(products::get).delete(products::delete))
        .route("/api/portfolio", get(portfolio::list).post(portfolio::create))
        .route(
            "/api/portfolio/:id",
            get(portfolio::get).put(portfolio::replace).patch(portfolio::patch).delete(portfolio::delete),
        )
        .route(
            "/api/contacts",
            get(contacts::get).post(contacts::create).put(contacts::replace).patch(contacts::patch),
        )
        .route(
            "/api/images",
            get(images::list).post(images::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/images/:id", get(images::get).delete(images::delete))
        .route("/api/quotes", get(quotes::list).post(quotes::create))
        .route("/api/quotes/daily", get(quotes::daily))
        .route("/api/quotes/:id", get(quotes::get).delete(quotes::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state));

    public
        .merge(api)
        .with_state(state)
        .nest_service(&media_prefix, media)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and friends at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

/// Swagger UI in front of the API router. Everything except the docs goes
/// through trailing-slash normalization, so `/api/services/` and
/// `/api/services` resolve to the same route.
pub fn build_app(state: ServerState, cors: CorsLayer) -> Router {
    let api: NormalizePath<Router> = NormalizePathLayer::trim_trailing_slash().layer(build_router(state, cors));
    Router::new()
        .merge(SwaggerUi::new("/api/docs").url("/api/schema/openapi.json", ApiDoc::openapi()))
        .fallback_service(api)
}
