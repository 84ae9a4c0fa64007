//! Image ingestion: metadata extraction and thumbnail generation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::GenericImageView;

use cc_core::ports::ImageProcessorPort;
use cc_core::{ImageMeta, ItemId};

/// Width thumbnails are scaled down to; smaller originals pass through.
const THUMBNAIL_WIDTH: u32 = 300;

pub struct InfraImageProcessor {
    thumbnail_dir: PathBuf,
}

impl InfraImageProcessor {
    pub fn new(thumbnail_dir: impl Into<PathBuf>) -> Self {
        Self {
            thumbnail_dir: thumbnail_dir.into(),
        }
    }
}

#[async_trait]
impl ImageProcessorPort for InfraImageProcessor {
    async fn process(&self, id: &ItemId, source_path: &Path) -> Result<ImageMeta> {
        let decoded = image::open(source_path)
            .with_context(|| format!("decode image {}", source_path.display()))?;
        let (width, height) = decoded.dimensions();
        let file_size = tokio::fs::metadata(source_path)
            .await
            .with_context(|| format!("stat image {}", source_path.display()))?
            .len() as i64;

        tokio::fs::create_dir_all(&self.thumbnail_dir)
            .await
            .context("create thumbnail directory")?;

        let ext = source_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let thumbnail_path = self.thumbnail_dir.join(format!("{}_thumb.{}", id, ext));

        let thumbnail = if width > THUMBNAIL_WIDTH {
            let scaled_height =
                ((height as f64) * (THUMBNAIL_WIDTH as f64) / (width as f64)).round() as u32;
            decoded.resize(THUMBNAIL_WIDTH, scaled_height.max(1), FilterType::Triangle)
        } else {
            decoded
        };
        thumbnail
            .save(&thumbnail_path)
            .with_context(|| format!("write thumbnail {}", thumbnail_path.display()))?;

        Ok(ImageMeta {
            data_id: id.clone(),
            width: i32::try_from(width).context("image width exceeds i32 range")?,
            height: i32::try_from(height).context("image height exceeds i32 range")?,
            file_size,
            file_path: source_path.display().to_string(),
            thumbnail_path: Some(thumbnail_path.display().to_string()),
        })
    }
}
