use imagekit::client::{DEFAULT_API_URL, DEFAULT_UPLOAD_URL, ImageKitClient};

use super::env;

/// Configuration for ImageKit API access.
#[derive(Debug, Clone)]
pub struct ImageKitConfig {
    pub private_key: String,
    pub upload_url: String,
    pub api_url: String,
}

impl ImageKitConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            private_key: env::required("IMAGEKIT_PRIVATE_KEY")?,
            upload_url: env::optional("IMAGEKIT_UPLOAD_URL")
                .unwrap_or_else(|| DEFAULT_UPLOAD_URL.to_string()),
            api_url: env::optional("IMAGEKIT_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        })
    }

    pub fn client(&self) -> ImageKitClient {
        ImageKitClient::with_base_urls(
            self.private_key.clone(),
            self.upload_url.as_str(),
            self.api_url.as_str(),
        )
    }
}
