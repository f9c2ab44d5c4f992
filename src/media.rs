use crate::config::MediaConfig;
use crate::error::{RecipeError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// An image received inline as a `data:image/<ext>;base64,<payload>` URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// File extension taken from the MIME subtype (e.g. "png")
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Returns `Ok(None)` when `value` is not a data URI, so callers can keep
    /// it as an already stored reference.
    pub fn from_data_uri(value: &str) -> Result<Option<Self>> {
        if !value.starts_with("data:image") {
            return Ok(None);
        }

        let (format, payload) = value
            .split_once(";base64,")
            .ok_or_else(|| RecipeError::InvalidImage("expected ';base64,' separator".into()))?;

        let extension = format
            .rsplit('/')
            .next()
            .filter(|ext| !ext.is_empty() && !ext.starts_with("data:"))
            .ok_or_else(|| RecipeError::InvalidImage(format!("no subtype in '{}'", format)))?
            .to_string();

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| RecipeError::InvalidImage(e.to_string()))?;
        if bytes.is_empty() {
            return Err(RecipeError::InvalidImage("empty image payload".into()));
        }

        Ok(Some(ImageUpload { extension, bytes }))
    }
}

/// File storage for uploaded recipe images
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Persist the upload under `directory` and return its stored reference
    async fn save(&self, directory: &str, upload: ImageUpload) -> Result<String>;
}

/// Keeps uploaded images in memory, keyed by their reference
#[derive(Debug, Clone, Default)]
pub struct MemoryImageStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryImageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, reference: &str) -> Option<Vec<u8>> {
        self.files.lock().await.get(reference).cloned()
    }

    pub async fn file_count(&self) -> usize {
        self.files.lock().await.len()
    }
}

#[async_trait]
impl ImageStorage for MemoryImageStorage {
    async fn save(&self, directory: &str, upload: ImageUpload) -> Result<String> {
        let mut files = self.files.lock().await;
        let reference = format!("{}{}.{}", directory, files.len() + 1, upload.extension);
        debug!("Storing {} byte image as {}", upload.bytes.len(), reference);
        files.insert(reference.clone(), upload.bytes);
        Ok(reference)
    }
}

/// Image field value that has been decoded but not yet written anywhere
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingImage {
    Upload(ImageUpload),
    Reference(String),
}

impl PendingImage {
    pub fn parse(value: &str) -> Result<Self> {
        Ok(match ImageUpload::from_data_uri(value)? {
            Some(upload) => PendingImage::Upload(upload),
            None => PendingImage::Reference(value.to_string()),
        })
    }

    /// Save an upload under `config.upload_to`; references are returned as is
    pub async fn store(self, images: &dyn ImageStorage, config: &MediaConfig) -> Result<String> {
        match self {
            PendingImage::Upload(upload) => images.save(&config.upload_to, upload).await,
            PendingImage::Reference(reference) => Ok(reference),
        }
    }
}

/// Store `value` if it is an inline upload; otherwise keep it as a reference
pub async fn store_image(
    images: &dyn ImageStorage,
    config: &MediaConfig,
    value: &str,
) -> Result<String> {
    PendingImage::parse(value)?.store(images, config).await
}

/// Public URL for a stored image reference; empty references stay empty
pub fn media_url(config: &MediaConfig, reference: &str) -> String {
    if reference.is_empty() {
        String::new()
    } else {
        format!("{}{}", config.url, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_URI: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_decode_png_data_uri() {
        let upload = ImageUpload::from_data_uri(PNG_URI).unwrap().unwrap();
        assert_eq!(upload.extension, "png");
        assert_eq!(&upload.bytes[1..4], b"PNG");
    }

    #[test]
    fn test_plain_reference_is_not_an_upload() {
        let result = ImageUpload::from_data_uri("recipes/images/cake.jpg").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_missing_separator_is_rejected() {
        let result = ImageUpload::from_data_uri("data:image/png,abcd");
        assert!(matches!(result, Err(RecipeError::InvalidImage(_))));
    }

    #[test]
    fn test_bad_base64_is_rejected() {
        let result = ImageUpload::from_data_uri("data:image/png;base64,@@@");
        assert!(matches!(result, Err(RecipeError::InvalidImage(_))));
    }

    #[test]
    fn test_media_url() {
        let config = MediaConfig::default();
        assert_eq!(
            media_url(&config, "recipes/images/1.png"),
            "/media/recipes/images/1.png"
        );
        assert_eq!(media_url(&config, ""), "");
    }

    #[tokio::test]
    async fn test_store_image_saves_uploads_only() {
        let images = MemoryImageStorage::new();
        let config = MediaConfig::default();

        let reference = store_image(&images, &config, PNG_URI).await.unwrap();
        assert_eq!(reference, "recipes/images/1.png");
        assert!(images.get(&reference).await.is_some());

        let kept = store_image(&images, &config, "recipes/images/old.jpg")
            .await
            .unwrap();
        assert_eq!(kept, "recipes/images/old.jpg");
        assert_eq!(images.file_count().await, 1);
    }
}
