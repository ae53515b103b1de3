//! Scripted asset store and in-memory image records shared by the image
//! use-case tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::errors::RepositoryError;
use crate::domain::image::errors::ImageError;
use crate::domain::image::model::{ImageAssetUpdate, ImageRecord, RecordUpdate, UploadResult};
use crate::domain::image::repository::ImageRepository;
use crate::domain::image::services::AssetStoreService;
use crate::domain::shared::value_objects::{ImageId, ProductId};

#[derive(Debug, Clone, PartialEq)]
pub enum AssetCall {
    Upload {
        file_name: String,
        folder: Option<String>,
        size: usize,
    },
    Delete(String),
    Purge(String),
}

/// Replays queued results in order; an empty queue answers with success.
#[derive(Default)]
pub struct FakeAssetStore {
    uploads: Mutex<VecDeque<Result<UploadResult, ImageError>>>,
    deletes: Mutex<VecDeque<Result<(), ImageError>>>,
    purges: Mutex<VecDeque<Result<(), ImageError>>>,
    delay: Option<Duration>,
    calls: Mutex<Vec<AssetCall>>,
}

impl FakeAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload(self, result: Result<UploadResult, ImageError>) -> Self {
        self.uploads.lock().unwrap().push_back(result);
        self
    }

    pub fn with_delete(self, result: Result<(), ImageError>) -> Self {
        self.deletes.lock().unwrap().push_back(result);
        self
    }

    pub fn with_purge(self, result: Result<(), ImageError>) -> Self {
        self.purges.lock().unwrap().push_back(result);
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<AssetCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

pub fn stored(file_id: &str) -> UploadResult {
    UploadResult {
        file_id: file_id.to_string(),
        name: format!("{}.jpg", file_id),
        url: format!("https://ik.imagekit.io/demo/{}.jpg", file_id),
    }
}

#[async_trait]
impl AssetStoreService for FakeAssetStore {
    async fn upload(
        &self,
        data: &[u8],
        file_name: &str,
        folder: Option<&str>,
    ) -> Result<UploadResult, ImageError> {
        self.calls.lock().unwrap().push(AssetCall::Upload {
            file_name: file_name.to_string(),
            folder: folder.map(str::to_string),
            size: data.len(),
        });
        self.wait().await;
        let next = self.uploads.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(stored("file_default")))
    }

    async fn delete(&self, file_id: &str) -> Result<(), ImageError> {
        self.calls
            .lock()
            .unwrap()
            .push(AssetCall::Delete(file_id.to_string()));
        self.wait().await;
        let next = self.deletes.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }

    async fn purge_cache(&self, url: &str) -> Result<(), ImageError> {
        self.calls
            .lock()
            .unwrap()
            .push(AssetCall::Purge(url.to_string()));
        self.wait().await;
        let next = self.purges.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }
}

/// Image records kept in memory, with the same write-once update rule as the
/// Postgres adapter.
#[derive(Default)]
pub struct InMemoryImageRepository {
    records: Mutex<HashMap<ImageId, ImageRecord>>,
}

impl InMemoryImageRepository {
    pub fn with_pending(id: ImageId, product_id: ProductId) -> Self {
        let now = Utc::now();
        let repository = Self::default();
        repository.records.lock().unwrap().insert(
            id,
            ImageRecord {
                id,
                product_id,
                file_id: None,
                url: None,
                created_at: now,
                updated_at: now,
            },
        );
        repository
    }

    pub fn record(&self, id: ImageId) -> Option<ImageRecord> {
        self.records.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl ImageRepository for InMemoryImageRepository {
    async fn find_by_id(&self, id: ImageId) -> Result<ImageRecord, RepositoryError> {
        self.record(id).ok_or(RepositoryError::NotFound)
    }

    async fn update(
        &self,
        id: ImageId,
        update: &ImageAssetUpdate,
    ) -> Result<RecordUpdate, RepositoryError> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if record.is_stored() {
            return Ok(RecordUpdate::AlreadyStored);
        }
        record.file_id = Some(update.file_id.clone());
        record.url = Some(update.url.clone());
        record.updated_at = Utc::now();
        Ok(RecordUpdate::Stored)
    }
}
