use std::sync::Arc;

use business::domain::image::progress::ProgressTracker;
use chrono::Utc;
use poem_openapi::{Object, OpenApi, payload::Json};
use serde::{Deserialize, Serialize};

use crate::api::tags::ApiTags;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct HealthCheckResponse {
    /// Service status
    pub status: String,
    /// Current server timestamp
    pub timestamp: String,
    /// Service version
    pub version: String,
    /// Product batches with images still outstanding
    pub in_flight_batches: u64,
}

/// Health API for monitoring and infrastructure checks
pub struct Api {
    progress: Arc<dyn ProgressTracker>,
}

impl Api {
    pub fn new(progress: Arc<dyn ProgressTracker>) -> Self {
        Self { progress }
    }
}

#[OpenApi]
impl Api {
    /// Health check endpoint
    ///
    /// Returns the current status of the worker.
    ///
    /// ## Response
    /// - `status`: "healthy" if the worker is running
    /// - `timestamp`: Current server timestamp in ISO 8601 format
    /// - `version`: Service version from Cargo.toml
    /// - `in_flight_batches`: Products whose image batch has not completed yet
    #[oai(path = "/health", method = "get", tag = "ApiTags::Health")]
    async fn health_check(&self) -> Json<HealthCheckResponse> {
        Json(HealthCheckResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            in_flight_batches: self.progress.in_flight() as u64,
        })
    }
}
