//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::info;

/// Sub-directories of the media root used by the image pipeline.
pub const MEDIA_SUBDIRS: [&str; 3] = ["images/original", "images/processed", "images/cropped"];

/// Ensure the media root and its image sub-directories exist.
pub async fn ensure_env(media_root: &str) -> anyhow::Result<()> {
    for sub in MEDIA_SUBDIRS {
        let dir = Path::new(media_root).join(sub);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    }
    info!(%media_root, "media directories ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_all_media_subdirs() {
        let root = std::env::temp_dir().join(format!("salon-media-{}", uuid::Uuid::new_v4()));
        let root_str = root.to_string_lossy().to_string();
        ensure_env(&root_str).await.unwrap();
        for sub in MEDIA_SUBDIRS {
            assert!(root.join(sub).is_dir(), "{sub} missing");
        }
        // idempotent
        ensure_env(&root_str).await.unwrap();
        let _ = std::fs::remove_dir_all(root);
    }
}
