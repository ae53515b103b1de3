use super::{
    database_config::DatabaseSettings, imagekit_config::ImageKitConfig,
    rabbitmq_config::RabbitMQConfig, server_config::ServerConfig, worker_config::WorkerConfig,
};

pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseSettings,
    pub imagekit: ImageKitConfig,
    pub rabbitmq: RabbitMQConfig,
    pub worker: WorkerConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            database: DatabaseSettings::from_env()?,
            imagekit: ImageKitConfig::from_env()?,
            rabbitmq: RabbitMQConfig::from_env()?,
            worker: WorkerConfig::from_env()?,
        })
    }
}
