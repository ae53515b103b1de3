use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use business::domain::image::model::ImageRecord;
use business::domain::shared::value_objects::{ImageId, ProductId};

#[derive(Debug, FromRow)]
pub struct ImageEntity {
    pub id: Uuid,
    pub product_id: Uuid,
    pub file_id: Option<String>,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImageEntity {
    pub fn into_domain(self) -> ImageRecord {
        ImageRecord {
            id: ImageId::new(self.id),
            product_id: ProductId::new(self.product_id),
            file_id: self.file_id,
            url: self.url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
