use super::env;

/// Server configuration for the health listener
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl ServerConfig {
    /// Load server configuration from environment variables
    ///
    /// Environment variables:
    /// - SERVICE_IP: IP address to bind (default: "127.0.0.1")
    /// - SERVICE_PORT: Port to bind (default: 8081)
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            ip: env::optional("SERVICE_IP").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: env::parsed_or("SERVICE_PORT", 8081)?,
        })
    }

    /// Get the bind address as "ip:port"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}
