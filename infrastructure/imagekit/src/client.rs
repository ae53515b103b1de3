use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Url};
use std::time::Duration;

pub const DEFAULT_UPLOAD_URL: &str = "https://upload.imagekit.io";
pub const DEFAULT_API_URL: &str = "https://api.imagekit.io";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared ImageKit HTTP client configuration.
pub struct ImageKitClient {
    pub client: Client,
    pub private_key: String,
    pub upload_base_url: String,
    pub api_base_url: String,
    pub timeout: Duration,
}

impl ImageKitClient {
    pub fn new(private_key: String) -> Self {
        Self::with_base_urls(private_key, DEFAULT_UPLOAD_URL, DEFAULT_API_URL)
    }

    pub fn with_base_urls(
        private_key: String,
        upload_base_url: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: build_http_client(DEFAULT_TIMEOUT),
            private_key,
            upload_base_url: upload_base_url.into().trim_end_matches('/').to_string(),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replaces the request timeout; keep it in line with the asset call
    /// deadline so neither cuts the other short.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_http_client(timeout);
        self.timeout = timeout;
        self
    }

    /// Builds the authorization header value. ImageKit expects the private
    /// key as the Basic user name with an empty password.
    pub fn auth_header(&self) -> String {
        format!("Basic {}", STANDARD.encode(format!("{}:", self.private_key)))
    }

    pub fn upload_url(&self) -> String {
        format!("{}/api/v1/files/upload", self.upload_base_url)
    }

    pub fn purge_url(&self) -> String {
        format!("{}/v1/files/purge", self.api_base_url)
    }

    /// Media endpoint for one file; the id is percent-encoded as a single
    /// path segment.
    pub fn file_url(&self, file_id: &str) -> Option<Url> {
        let mut url = Url::parse(&self.api_base_url).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["v1", "files", file_id]);
        Some(url)
    }
}

fn build_http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_encode_private_key_as_basic_user() {
        let client = ImageKitClient::new("private_key".to_string());
        assert_eq!(client.auth_header(), "Basic cHJpdmF0ZV9rZXk6");
    }

    #[test]
    fn should_build_endpoints_without_double_slashes() {
        let client = ImageKitClient::with_base_urls(
            "key".to_string(),
            "http://upload.local/",
            "http://api.local/",
        );
        assert_eq!(client.upload_url(), "http://upload.local/api/v1/files/upload");
        assert_eq!(client.purge_url(), "http://api.local/v1/files/purge");
    }

    #[test]
    fn should_escape_file_id_in_media_url() {
        let client = ImageKitClient::with_base_urls("key".to_string(), DEFAULT_UPLOAD_URL, DEFAULT_API_URL);
        let url = client.file_url("abc/../def").unwrap();
        assert_eq!(url.as_str(), "https://api.imagekit.io/v1/files/abc%2F..%2Fdef");
    }

    #[test]
    fn should_use_configured_request_timeout() {
        let client = ImageKitClient::new("key".to_string()).with_timeout(Duration::from_secs(90));
        assert_eq!(client.timeout, Duration::from_secs(90));
    }

    #[test]
    fn should_default_request_timeout_to_thirty_seconds() {
        assert_eq!(ImageKitClient::new("key".to_string()).timeout, DEFAULT_TIMEOUT);
    }
}
