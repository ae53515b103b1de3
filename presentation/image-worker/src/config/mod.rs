pub mod app_config;
pub mod database_config;
pub mod env;
pub mod imagekit_config;
pub mod rabbitmq_config;
pub mod server_config;
pub mod worker_config;
