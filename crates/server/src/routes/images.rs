use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::{StatusCode, Uri},
    Json,
};
use tracing::{debug, info};

use service::images::{self, ImageCreated, ImageDetail, ImageListItem, UploadRequest};

use crate::errors::{ApiQuery, JsonApiError};
use crate::routes::{auth::ServerState, page_body, ListQuery, PageBody};

/// Form booleans: `true/false`, `1/0`, `yes/no`, `on/off`.
fn parse_bool(field: &str, raw: &str) -> Result<bool, JsonApiError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(JsonApiError::bad_request(format!("{field} must be a boolean"))),
    }
}

async fn text(field: Field<'_>, name: &str) -> Result<String, JsonApiError> {
    field
        .text()
        .await
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, format!("cannot read {name}"), Some(e.body_text())))
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadRequest, JsonApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut compress = true;
    let mut crop = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "invalid multipart body", Some(e.body_text())))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "original_image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| JsonApiError::new(StatusCode::BAD_REQUEST, "cannot read original_image", Some(e.body_text())))?;
                file = Some((filename, bytes.to_vec()));
            }
            "compress" => compress = parse_bool("compress", &text(field, "compress").await?)?,
            "crop" => crop = parse_bool("crop", &text(field, "crop").await?)?,
            other => debug!(field = other, "ignoring multipart field"),
        }
    }

    let (filename, bytes) = file.ok_or_else(|| JsonApiError::bad_request("original_image is required"))?;
    Ok(UploadRequest { filename, bytes, compress, crop })
}

#[utoipa::path(
    post, path = "/api/images/", tag = "images",
    request_body(content = crate::openapi::ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Uploaded", body = crate::openapi::ImageCreatedDoc),
        (status = 400, description = "Missing file, bad extension or bad flag")
    )
)]
pub async fn upload(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ImageCreated>), JsonApiError> {
    let req = read_upload(multipart).await?;
    let created = images::upload(&state.db, &state.media, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/images/", tag = "images",
    params(ListQuery),
    responses((status = 200, description = "Paginated images"), (status = 401, description = "Unauthorized"))
)]
pub async fn list(
    State(state): State<ServerState>,
    uri: Uri,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<PageBody<ImageListItem>>, JsonApiError> {
    let page = images::list(&state.db, &state.media, &q.into()).await?;
    Ok(Json(page_body(&state, &uri, page)))
}

#[utoipa::path(
    get, path = "/api/images/{id}/", tag = "images",
    params(("id" = i32, Path, description = "image id")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<ImageDetail>, JsonApiError> {
    Ok(Json(images::get(&state.db, &state.media, id).await?))
}

#[utoipa::path(
    delete, path = "/api/images/{id}/", tag = "images",
    params(("id" = i32, Path, description = "image id")),
    responses((status = 204, description = "Deleted with its files"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<StatusCode, JsonApiError> {
    if images::delete(&state.db, &state.media, id).await? {
        info!(id, "deleted image");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("image not found"))
    }
}
