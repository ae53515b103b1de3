use serde::{Deserialize, Serialize};

use business::domain::image::model::{CompletionEvent, DeleteTask, NewUploadTaskProps, UploadTask};
use business::domain::shared::value_objects::{ImageId, ProductId, UserId};

use crate::error::HandlerError;

/// Payload schema version understood by this worker.
pub const SCHEMA_VERSION: u16 = 1;

fn default_version() -> u16 {
    SCHEMA_VERSION
}

fn check_version(version: u16) -> Result<(), HandlerError> {
    if version != SCHEMA_VERSION {
        return Err(HandlerError::Malformed(format!(
            "unsupported message version {}",
            version
        )));
    }
    Ok(())
}

/// Request to store one product image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadImageMessage {
    #[serde(default = "default_version")]
    pub version: u16,
    pub product_id: String,
    pub image_id: String,
    pub user_id: String,
    pub base64_data: String,
    pub file_name: String,
    #[serde(default)]
    pub folder: Option<String>,
    pub total_images: u16,
}

impl UploadImageMessage {
    pub fn decode(payload: &[u8]) -> Result<UploadTask, HandlerError> {
        let message: Self = serde_json::from_slice(payload)
            .map_err(|e| HandlerError::Malformed(format!("invalid upload message: {}", e)))?;
        message.into_task()
    }

    pub fn into_task(self) -> Result<UploadTask, HandlerError> {
        check_version(self.version)?;

        let product_id = self
            .product_id
            .parse::<ProductId>()
            .map_err(HandlerError::Malformed)?;
        let image_id = self
            .image_id
            .parse::<ImageId>()
            .map_err(HandlerError::Malformed)?;

        UploadTask::new(NewUploadTaskProps {
            product_id,
            image_id,
            user_id: UserId::new(self.user_id),
            base64_data: self.base64_data,
            file_name: self.file_name,
            folder: self.folder,
            total_images: self.total_images,
        })
        .map_err(|e| HandlerError::Malformed(e.to_string()))
    }
}

/// Request to remove a stored asset and purge its CDN cache entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteImageMessage {
    #[serde(default = "default_version")]
    pub version: u16,
    pub file_id: String,
    pub url: String,
}

impl DeleteImageMessage {
    pub fn decode(payload: &[u8]) -> Result<DeleteTask, HandlerError> {
        let message: Self = serde_json::from_slice(payload)
            .map_err(|e| HandlerError::Malformed(format!("invalid delete message: {}", e)))?;
        check_version(message.version)?;

        DeleteTask::new(message.file_id, message.url)
            .map_err(|e| HandlerError::Malformed(e.to_string()))
    }
}

/// Announcement that every image of a product batch is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagesUploadedMessage {
    pub service: String,
    pub user_id: String,
    pub product_id: String,
}

impl From<&CompletionEvent> for ImagesUploadedMessage {
    fn from(event: &CompletionEvent) -> Self {
        Self {
            service: event.service.clone(),
            user_id: event.user_id.to_string(),
            product_id: event.product_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    const PRODUCT: &str = "5f1c8f5e-2b0a-4a55-9a36-0c2c1b8f9a10";
    const IMAGE: &str = "9b2e4b8c-7f43-4d0b-8a5e-3e3b0b2f6c21";

    fn upload_payload(overrides: serde_json::Value) -> Vec<u8> {
        let mut payload = json!({
            "product_id": PRODUCT,
            "image_id": IMAGE,
            "user_id": "user-7",
            "base64_data": "aGVsbG8=",
            "file_name": "front.jpg",
            "folder": "products",
            "total_images": 3
        });
        if let (Some(target), Some(extra)) = (payload.as_object_mut(), overrides.as_object()) {
            for (key, value) in extra {
                target.insert(key.clone(), value.clone());
            }
        }
        serde_json::to_vec(&payload).unwrap()
    }

    #[test]
    fn should_decode_upload_message_into_task() {
        let task = UploadImageMessage::decode(&upload_payload(json!({}))).unwrap();

        assert_eq!(task.product_id, PRODUCT.parse::<ProductId>().unwrap());
        assert_eq!(task.image_id, IMAGE.parse::<ImageId>().unwrap());
        assert_eq!(task.user_id.as_str(), "user-7");
        assert_eq!(task.data, b"hello".to_vec());
        assert_eq!(task.folder.as_deref(), Some("products"));
        assert_eq!(task.total_images, 3);
    }

    #[test]
    fn should_accept_upload_message_without_version_or_folder() {
        let payload = json!({
            "product_id": PRODUCT,
            "image_id": IMAGE,
            "user_id": "user-7",
            "base64_data": "aGVsbG8=",
            "file_name": "front.jpg",
            "total_images": 1
        });

        let task = UploadImageMessage::decode(payload.to_string().as_bytes()).unwrap();

        assert_eq!(task.folder, None);
    }

    #[test]
    fn should_reject_unknown_schema_version() {
        let result = UploadImageMessage::decode(&upload_payload(json!({ "version": 2 })));
        assert!(matches!(result, Err(HandlerError::Malformed(_))));
    }

    #[test]
    fn should_reject_invalid_json() {
        let result = UploadImageMessage::decode(b"{not json");
        assert!(matches!(result, Err(HandlerError::Malformed(_))));
    }

    #[test]
    fn should_reject_negative_total_images() {
        let result = UploadImageMessage::decode(&upload_payload(json!({ "total_images": -1 })));
        assert!(matches!(result, Err(HandlerError::Malformed(_))));
    }

    #[test]
    fn should_reject_zero_total_images() {
        let result = UploadImageMessage::decode(&upload_payload(json!({ "total_images": 0 })));
        assert!(matches!(result, Err(HandlerError::Malformed(_))));
    }

    #[test]
    fn should_reject_product_id_that_is_not_a_uuid() {
        let result =
            UploadImageMessage::decode(&upload_payload(json!({ "product_id": "product-1" })));
        assert!(matches!(result, Err(HandlerError::Malformed(_))));
    }

    #[test]
    fn should_reject_undecodable_image_data() {
        let result =
            UploadImageMessage::decode(&upload_payload(json!({ "base64_data": "%%%" })));
        assert!(matches!(result, Err(HandlerError::Malformed(_))));
    }

    #[test]
    fn should_decode_delete_message() {
        let payload = json!({
            "file_id": "file_1",
            "url": "https://ik.imagekit.io/demo/products/front.jpg"
        });

        let task = DeleteImageMessage::decode(payload.to_string().as_bytes()).unwrap();

        assert_eq!(task.file_id, "file_1");
        assert_eq!(task.url, "https://ik.imagekit.io/demo/products/front.jpg");
    }

    #[test]
    fn should_reject_delete_message_with_invalid_url() {
        let payload = json!({ "file_id": "file_1", "url": "not a url" });

        let result = DeleteImageMessage::decode(payload.to_string().as_bytes());

        assert!(matches!(result, Err(HandlerError::Malformed(_))));
    }

    #[test]
    fn should_serialize_completion_event_with_service_name() {
        let product_id = ProductId::new(Uuid::parse_str(PRODUCT).unwrap());
        let event = CompletionEvent::new(UserId::new("user-7"), product_id);

        let value = serde_json::to_value(ImagesUploadedMessage::from(&event)).unwrap();

        assert_eq!(
            value,
            json!({ "service": "product", "user_id": "user-7", "product_id": PRODUCT })
        );
    }
}
