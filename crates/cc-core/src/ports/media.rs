//! Media collaborator ports.

use async_trait::async_trait;
use std::path::Path;

use crate::ids::ItemId;
use crate::item::ImageMeta;

/// Image file processing: thumbnail generation and metadata extraction.
#[async_trait]
pub trait ImageProcessorPort: Send + Sync {
    async fn process(&self, id: &ItemId, source_path: &Path) -> anyhow::Result<ImageMeta>;
}

/// Black-box image classifier. Returns label strings for an image path; the
/// coordinator treats every returned label identically.
#[async_trait]
pub trait TagClassifierPort: Send + Sync {
    async fn labels_for_image(&self, path: &Path) -> anyhow::Result<Vec<String>>;
}
