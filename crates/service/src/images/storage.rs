//! Media files on the local filesystem, addressed by paths relative to the
//! media root, and the public URLs they are served under.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::ServiceError;

pub const ORIGINAL_DIR: &str = "images/original";
pub const PROCESSED_DIR: &str = "images/processed";
pub const CROPPED_DIR: &str = "images/cropped";

#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
    mount: String,
    url_base: String,
}

impl MediaStore {
    /// `url` is the media URL prefix (e.g. `/media/`); with `public_url`
    /// set, generated URLs are absolute.
    pub fn new(root: impl Into<PathBuf>, url: &str, public_url: Option<&str>) -> Self {
        let mut prefix = url.trim().to_string();
        if !prefix.starts_with('/') {
            prefix.insert(0, '/');
        }
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        let url_base = match public_url.map(str::trim).filter(|s| !s.is_empty()) {
            Some(origin) => format!("{}{}", origin.trim_end_matches('/'), prefix),
            None => prefix.clone(),
        };
        let mount = match prefix.trim_end_matches('/') {
            "" => "/media".to_string(),
            m => m.to_string(),
        };
        Self { root: root.into(), mount, url_base }
    }

    pub fn from_config(media: &configs::MediaConfig, public_url: Option<&str>) -> Self {
        Self::new(&media.root, &media.url, public_url)
    }

    pub fn root(&self) -> &Path { &self.root }

    /// Path the media directory is served under, without a trailing slash.
    pub fn mount_path(&self) -> &str { &self.mount }

    pub fn url_for(&self, rel: &str) -> String {
        format!("{}{}", self.url_base, rel.trim_start_matches('/'))
    }

    pub fn path_for(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub async fn write(&self, rel: &str, bytes: &[u8]) -> Result<(), ServiceError> {
        let path = self.path_for(rel);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "media file written");
        Ok(())
    }

    /// Store an upload under `images/original/<stem>_<8 hex>.<ext>`.
    pub async fn save_original(&self, filename: &str, ext: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        let rel = format!("{ORIGINAL_DIR}/{}_{}.{ext}", safe_stem(filename), short_token());
        self.write(&rel, bytes).await?;
        Ok(rel)
    }

    /// Best-effort removal; a missing file is not an error.
    pub async fn remove(&self, rel: &str) {
        let path = self.path_for(rel);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "media file removed"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), err = %e, "cannot remove media file"),
        }
    }
}

fn short_token() -> String {
    let mut hex = uuid::Uuid::new_v4().simple().to_string();
    hex.truncate(8);
    hex
}

/// File stem reduced to `[A-Za-z0-9_-]`, falling back to `image`.
fn safe_stem(filename: &str) -> String {
    let stem = Path::new(filename).file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(100)
        .collect();
    if cleaned.trim_matches('_').is_empty() { "image".to_string() } else { cleaned }
}

/// `<dir>/<base>_<suffix>.webp` for a stored original path.
pub fn derived_path(original_rel: &str, dir: &str, suffix: &str) -> String {
    let base = Path::new(original_rel).file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    format!("{dir}/{base}_{suffix}.webp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_relative_and_absolute() {
        let local = MediaStore::new("/srv/media", "media", None);
        assert_eq!(local.url_for("images/original/a.png"), "/media/images/original/a.png");
        assert_eq!(local.mount_path(), "/media");
        let public = MediaStore::new("/srv/media", "/media/", Some("https://salon.example.com/"));
        assert_eq!(public.url_for("images/cropped/a_cropped.webp"), "https://salon.example.com/media/images/cropped/a_cropped.webp");
    }

    #[test]
    fn stems_are_sanitized() {
        assert_eq!(safe_stem("My Photo (1).JPG"), "My_Photo__1_");
        assert_eq!(safe_stem("фото.png"), "image");
        assert_eq!(derived_path("images/original/cat_1a2b3c4d.png", PROCESSED_DIR, "processed"), "images/processed/cat_1a2b3c4d_processed.webp");
    }

    #[tokio::test]
    async fn save_and_remove_original() {
        let root = std::env::temp_dir().join(format!("salon-store-{}", uuid::Uuid::new_v4()));
        let store = MediaStore::new(&root, "/media/", None);
        let rel = store.save_original("cat.PNG", "png", b"bytes").await.unwrap();
        assert!(rel.starts_with("images/original/cat_"));
        assert!(rel.ends_with(".png"));
        assert_eq!(rel.len(), "images/original/cat_".len() + 8 + ".png".len());
        assert_eq!(tokio::fs::read(store.path_for(&rel)).await.unwrap(), b"bytes");

        store.remove(&rel).await;
        assert!(!store.path_for(&rel).exists());
        // second removal is silent
        store.remove(&rel).await;
        let _ = std::fs::remove_dir_all(root);
    }
}
