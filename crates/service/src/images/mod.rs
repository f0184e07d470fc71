//! Image uploads: the original is kept as sent, derived WebP copies are
//! produced on the blocking pool. A processing failure never loses the upload.

pub mod processing;
pub mod storage;

use chrono::Utc;
use common::metrics::{IMAGE_PROCESSING_FAILURES, IMAGE_UPLOADS};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Serialize;
use tracing::{error, info, instrument};

use models::image_upload;

use crate::catalog::ListParams;
use crate::errors::ServiceError;
use crate::listing::{apply_ordering, newest_first, parse_ordering};
use crate::pagination::{fetch_page, Page};

pub use storage::MediaStore;

pub const ORDERING_FIELDS: &[&str] = &["created_at"];

/// A multipart upload after extraction.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub compress: bool,
    pub crop: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageCreated {
    pub id: i32,
    pub original_url: String,
    pub image_url: String,
    pub cropped_url: String,
    pub is_compressed: bool,
    pub is_cropped: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageListItem {
    pub id: i32,
    pub image_url: String,
    pub is_compressed: bool,
    pub is_cropped: bool,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageDetail {
    pub id: i32,
    pub original_image: String,
    pub processed_image: Option<String>,
    pub cropped_image: Option<String>,
    pub is_compressed: bool,
    pub is_cropped: bool,
    pub image_url: String,
    pub cropped_url: String,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub updated_at: chrono::DateTime<chrono::FixedOffset>,
}

struct Urls {
    original: String,
    processed: Option<String>,
    cropped: Option<String>,
}

impl Urls {
    fn of(store: &MediaStore, m: &image_upload::Model) -> Self {
        Self {
            original: store.url_for(&m.original_image),
            processed: m.processed_image.as_deref().map(|p| store.url_for(p)),
            cropped: m.cropped_image.as_deref().map(|p| store.url_for(p)),
        }
    }

    /// processed, else original
    fn image(&self) -> String {
        self.processed.clone().unwrap_or_else(|| self.original.clone())
    }

    /// cropped, else `image()`
    fn cropped_or_image(&self) -> String {
        self.cropped.clone().unwrap_or_else(|| self.image())
    }
}

impl ImageDetail {
    fn new(store: &MediaStore, m: image_upload::Model) -> Self {
        let urls = Urls::of(store, &m);
        Self {
            id: m.id,
            image_url: urls.image(),
            cropped_url: urls.cropped_or_image(),
            original_image: urls.original,
            processed_image: urls.processed,
            cropped_image: urls.cropped,
            is_compressed: m.is_compressed,
            is_cropped: m.is_cropped,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Relative paths of the derived files that were written.
#[derive(Debug, Default)]
struct Written {
    processed: Option<String>,
    cropped: Option<String>,
}

impl Written {
    async fn discard(&self, store: &MediaStore) {
        for rel in [&self.processed, &self.cropped].into_iter().flatten() {
            store.remove(rel).await;
        }
    }
}

async fn derive(store: &MediaStore, original_rel: &str, bytes: Vec<u8>, compress: bool, crop: bool) -> Result<Written, ServiceError> {
    let derived = tokio::task::spawn_blocking(move || processing::process(&bytes, compress, crop))
        .await
        .map_err(|e| ServiceError::Image(format!("processing task failed: {e}")))??;

    let mut written = Written::default();
    if let Some(data) = derived.processed {
        let rel = storage::derived_path(original_rel, storage::PROCESSED_DIR, "processed");
        store.write(&rel, &data).await?;
        written.processed = Some(rel);
    }
    if let Some(data) = derived.cropped {
        let rel = storage::derived_path(original_rel, storage::CROPPED_DIR, "cropped");
        if let Err(e) = store.write(&rel, &data).await {
            written.discard(store).await;
            return Err(e);
        }
        written.cropped = Some(rel);
    }
    Ok(written)
}

#[instrument(skip(db, store, req), fields(filename = %req.filename, size = req.bytes.len()))]
pub async fn upload(db: &DatabaseConnection, store: &MediaStore, req: UploadRequest) -> Result<ImageCreated, ServiceError> {
    let ext = image_upload::validate_extension(&req.filename)?;
    if req.bytes.is_empty() {
        return Err(ServiceError::validation("original_image is empty"));
    }
    let original = store.save_original(&req.filename, &ext, &req.bytes).await?;
    IMAGE_UPLOADS.inc();

    let written = if req.compress || req.crop {
        match derive(store, &original, req.bytes, req.compress, req.crop).await {
            Ok(w) => w,
            Err(e) => {
                IMAGE_PROCESSING_FAILURES.inc();
                error!(err = %e, original = %original, "image processing failed; keeping original only");
                Written::default()
            }
        }
    } else {
        Written::default()
    };

    let now = Utc::now();
    let inserted = image_upload::ActiveModel {
        original_image: Set(original.clone()),
        is_compressed: Set(written.processed.is_some()),
        is_cropped: Set(written.cropped.is_some()),
        processed_image: Set(written.processed.clone()),
        cropped_image: Set(written.cropped.clone()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await;
    let created = match inserted {
        Ok(created) => created,
        Err(e) => {
            // no row points at the files, so drop them
            store.remove(&original).await;
            written.discard(store).await;
            error!(err = %e, original = %original, "image record not stored; files removed");
            return Err(e.into());
        }
    };
    info!(id = created.id, compressed = created.is_compressed, cropped = created.is_cropped, "image uploaded");

    let urls = Urls::of(store, &created);
    Ok(ImageCreated {
        id: created.id,
        image_url: urls.image(),
        cropped_url: urls.cropped_or_image(),
        original_url: urls.original,
        is_compressed: created.is_compressed,
        is_cropped: created.is_cropped,
    })
}

fn ordering_column(name: &str) -> Option<image_upload::Column> {
    match name {
        "created_at" => Some(image_upload::Column::CreatedAt),
        _ => None,
    }
}

pub async fn list(db: &DatabaseConnection, store: &MediaStore, params: &ListParams) -> Result<Page<ImageListItem>, ServiceError> {
    let ordering = parse_ordering(params.ordering.as_deref(), ORDERING_FIELDS);
    let select = apply_ordering(image_upload::Entity::find(), &ordering, &newest_first(), ordering_column, image_upload::Column::Id);
    let page = fetch_page(db, select, params.pagination).await?;
    Ok(page.map(|m| ImageListItem {
        id: m.id,
        image_url: Urls::of(store, &m).image(),
        is_compressed: m.is_compressed,
        is_cropped: m.is_cropped,
        created_at: m.created_at,
    }))
}

pub async fn get(db: &DatabaseConnection, store: &MediaStore, id: i32) -> Result<ImageDetail, ServiceError> {
    let m = image_upload::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("image"))?;
    Ok(ImageDetail::new(store, m))
}

/// Delete the row, then its files (best-effort).
pub async fn delete(db: &DatabaseConnection, store: &MediaStore, id: i32) -> Result<bool, ServiceError> {
    let Some(m) = image_upload::Entity::find_by_id(id).one(db).await? else {
        return Ok(false);
    };
    image_upload::Entity::delete_by_id(id).exec(db).await?;
    for rel in [Some(&m.original_image), m.processed_image.as_ref(), m.cropped_image.as_ref()].into_iter().flatten() {
        store.remove(rel).await;
    }
    info!(id, "image deleted");
    Ok(true)
}
