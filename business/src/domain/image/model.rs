use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::errors::ImageError;
use crate::domain::shared::value_objects::{ImageId, ProductId, UserId};

/// Tag identifying this service as the origin of completion events.
pub const SERVICE_NAME: &str = "product";

static DATA_URL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:[A-Za-z0-9.+/-]+;base64,").expect("data URL prefix pattern is valid")
});

/// One image of an upload batch, ready to be pushed to the asset store.
#[derive(Debug, Clone)]
pub struct UploadTask {
    pub product_id: ProductId,
    pub image_id: ImageId,
    pub user_id: UserId,
    pub data: Vec<u8>,
    pub file_name: String,
    pub folder: Option<String>,
    /// Number of images in the batch this task belongs to.
    pub total_images: u16,
}

pub struct NewUploadTaskProps {
    pub product_id: ProductId,
    pub image_id: ImageId,
    pub user_id: UserId,
    pub base64_data: String,
    pub file_name: String,
    pub folder: Option<String>,
    pub total_images: u16,
}

impl UploadTask {
    pub fn new(props: NewUploadTaskProps) -> Result<Self, ImageError> {
        if props.user_id.is_blank() {
            return Err(ImageError::InvalidPayload("user_id is empty".to_string()));
        }

        if props.file_name.trim().is_empty() {
            return Err(ImageError::InvalidPayload("file_name is empty".to_string()));
        }

        if props.total_images == 0 {
            return Err(ImageError::InvalidPayload(
                "total_images must be at least 1".to_string(),
            ));
        }

        let data = decode_image_data(&props.base64_data)?;

        Ok(Self {
            product_id: props.product_id,
            image_id: props.image_id,
            user_id: props.user_id,
            data,
            file_name: props.file_name.trim().to_string(),
            folder: props
                .folder
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty()),
            total_images: props.total_images,
        })
    }
}

/// Decodes a base64 image body, accepting an optional `data:` URL prefix and
/// line-wrapped input.
fn decode_image_data(raw: &str) -> Result<Vec<u8>, ImageError> {
    let stripped = DATA_URL_PREFIX.replace(raw.trim_start(), "");
    let clean: String = stripped.chars().filter(|c| !c.is_whitespace()).collect();

    let data = STANDARD
        .decode(clean.as_bytes())
        .map_err(|e| ImageError::InvalidPayload(format!("base64_data is not valid base64: {}", e)))?;

    if data.is_empty() {
        return Err(ImageError::InvalidPayload("base64_data is empty".to_string()));
    }

    Ok(data)
}

/// Removal of a previously uploaded asset and its CDN cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteTask {
    pub file_id: String,
    pub url: String,
}

impl DeleteTask {
    pub fn new(file_id: impl Into<String>, url: impl Into<String>) -> Result<Self, ImageError> {
        let file_id = file_id.into().trim().to_string();
        let url = url.into().trim().to_string();

        if file_id.is_empty() {
            return Err(ImageError::InvalidPayload("file_id is empty".to_string()));
        }

        url::Url::parse(&url)
            .map_err(|e| ImageError::InvalidPayload(format!("url is not valid: {}", e)))?;

        Ok(Self { file_id, url })
    }
}

/// What the asset store hands back for a stored image.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub file_id: String,
    pub name: String,
    pub url: String,
}

/// Asset location written onto an image record.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAssetUpdate {
    pub file_id: String,
    pub url: String,
}

impl From<&UploadResult> for ImageAssetUpdate {
    fn from(result: &UploadResult) -> Self {
        Self {
            file_id: result.file_id.clone(),
            url: result.url.clone(),
        }
    }
}

/// What a conditional record update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordUpdate {
    /// This call wrote the asset location.
    Stored,
    /// Another attempt had already written it; nothing changed.
    AlreadyStored,
}

/// Persisted image row.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    pub id: ImageId,
    pub product_id: ProductId,
    pub file_id: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImageRecord {
    /// True once an earlier attempt has written the asset location.
    pub fn is_stored(&self) -> bool {
        self.file_id.as_deref().is_some_and(|id| !id.is_empty())
            && self.url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Emitted once all images of a product batch are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionEvent {
    pub service: String,
    pub user_id: UserId,
    pub product_id: ProductId,
}

impl CompletionEvent {
    pub fn new(user_id: UserId, product_id: ProductId) -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
            user_id,
            product_id,
        }
    }
}
