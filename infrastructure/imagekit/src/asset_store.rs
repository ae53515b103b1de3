use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use business::domain::image::errors::ImageError;
use business::domain::image::model::UploadResult;
use business::domain::image::services::AssetStoreService;

use crate::client::ImageKitClient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_id: String,
    name: String,
    url: String,
}

/// ImageKit implementation of the asset store port.
///
/// Uploads disable unique file names, so re-uploading the same file name into
/// the same folder replaces the asset instead of creating a sibling.
pub struct ImageKitAssetStore {
    client: ImageKitClient,
}

impl ImageKitAssetStore {
    pub fn new(client: ImageKitClient) -> Self {
        Self { client }
    }

    async fn describe_failure(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        format!("status {}: {}", status, body)
    }
}

#[async_trait]
impl AssetStoreService for ImageKitAssetStore {
    async fn upload(
        &self,
        data: &[u8],
        file_name: &str,
        folder: Option<&str>,
    ) -> Result<UploadResult, ImageError> {
        let part = Part::bytes(data.to_vec()).file_name(file_name.to_string());
        let mut form = Form::new()
            .part("file", part)
            .text("fileName", file_name.to_string())
            .text("useUniqueFileName", "false");
        if let Some(folder) = folder {
            form = form.text("folder", folder.to_string());
        }

        let response = self
            .client
            .client
            .post(self.client.upload_url())
            .header("Authorization", self.client.auth_header())
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageError::UploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageError::UploadFailed(
                Self::describe_failure(response).await,
            ));
        }

        let data: UploadResponse = response
            .json()
            .await
            .map_err(|e| ImageError::UploadFailed(format!("unexpected response: {}", e)))?;

        Ok(UploadResult {
            file_id: data.file_id,
            name: data.name,
            url: data.url,
        })
    }

    async fn delete(&self, file_id: &str) -> Result<(), ImageError> {
        let url = self
            .client
            .file_url(file_id)
            .ok_or_else(|| ImageError::DeleteFailed("invalid ImageKit API base URL".to_string()))?;

        let response = self
            .client
            .client
            .delete(url)
            .header("Authorization", self.client.auth_header())
            .send()
            .await
            .map_err(|e| ImageError::DeleteFailed(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // Already deleted, typically by an earlier delivery of the same task.
            StatusCode::NOT_FOUND => {
                tracing::debug!(file_id, "ImageKit file already absent");
                Ok(())
            }
            _ => Err(ImageError::DeleteFailed(
                Self::describe_failure(response).await,
            )),
        }
    }

    async fn purge_cache(&self, url: &str) -> Result<(), ImageError> {
        let response = self
            .client
            .client
            .post(self.client.purge_url())
            .header("Authorization", self.client.auth_header())
            .json(&json!({ "url": url }))
            .send()
            .await
            .map_err(|e| ImageError::PurgeFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ImageError::PurgeFailed(
                Self::describe_failure(response).await,
            ));
        }

        Ok(())
    }
}
