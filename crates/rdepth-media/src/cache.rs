//! On-disk mask cache.
//!
//! Generated masks are stored next to their source image, keeping the image
//! base name and adding a `-fseg` suffix:
//!
//! `samples/CAM_FRONT/n015-...-0400__CAM_FRONT__1533151603512404.jpg`
//! → `samples/CAM_FRONT/n015-...-0400__CAM_FRONT__1533151603512404-fseg.png`
//!
//! Cache hits are detected from the file name alone.

use std::path::{Path, PathBuf};

use image::GrayImage;
use tracing::debug;

use crate::error::{MaskError, MaskResult};

/// Suffix appended to the image stem for generated masks.
pub const MASK_SUFFIX: &str = "-fseg";

/// File extension of generated masks.
pub const MASK_EXTENSION: &str = "png";

/// Cache location of the mask for `image_path`.
pub fn mask_cache_path(image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = format!("{}{}.{}", stem, MASK_SUFFIX, MASK_EXTENSION);
    match image_path.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Check whether a cached mask exists for `image_path`.
pub async fn has_cached_mask(image_path: &Path) -> bool {
    tokio::fs::try_exists(mask_cache_path(image_path))
        .await
        .unwrap_or(false)
}

/// Load a cached mask as a single-channel image.
pub async fn load_cached_mask(path: &Path) -> MaskResult<GrayImage> {
    let owned = path.to_path_buf();
    let loaded = tokio::task::spawn_blocking(move || image::open(&owned).map(|img| img.to_luma8()))
        .await
        .map_err(|e| MaskError::internal(format!("Mask load task failed: {}", e)))?;

    let mask = loaded.map_err(|e| MaskError::cache(path, e))?;
    debug!(path = %path.display(), "Loaded cached mask");
    Ok(mask)
}

/// Write a mask to the cache, creating the directory if needed.
pub async fn store_mask(path: &Path, mask: GrayImage) -> MaskResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let owned = path.to_path_buf();
    let saved = tokio::task::spawn_blocking(move || mask.save(&owned))
        .await
        .map_err(|e| MaskError::internal(format!("Mask store task failed: {}", e)))?;

    saved.map_err(|e| MaskError::cache(path, e))?;
    debug!(path = %path.display(), "Stored mask");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_mask_cache_path_keeps_base_name() {
        let path = mask_cache_path(Path::new("/data/samples/CAM_FRONT/frame_0001.jpg"));
        assert_eq!(
            path,
            PathBuf::from("/data/samples/CAM_FRONT/frame_0001-fseg.png")
        );
    }

    #[test]
    fn test_mask_cache_path_relative() {
        assert_eq!(mask_cache_path(Path::new("img.png")), PathBuf::from("img-fseg.png"));
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("nested").join("frame.jpg");
        let cache_path = mask_cache_path(&image_path);
        assert!(!has_cached_mask(&image_path).await);

        let mut mask = GrayImage::new(4, 3);
        mask.put_pixel(1, 2, Luma([255]));
        store_mask(&cache_path, mask.clone()).await.unwrap();

        assert!(has_cached_mask(&image_path).await);
        let loaded = load_cached_mask(&cache_path).await.unwrap();
        assert_eq!(loaded, mask);
    }

    #[tokio::test]
    async fn test_load_corrupt_mask_is_cache_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad-fseg.png");
        tokio::fs::write(&path, b"not a png").await.unwrap();
        let err = load_cached_mask(&path).await.unwrap_err();
        assert!(matches!(err, MaskError::Cache { .. }));
    }
}
