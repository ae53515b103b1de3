use dotenvy::dotenv;

mod api;
mod config;
mod setup;

use config::{app_config::AppConfig, database_config};
use setup::{dependency_injection::DependencyContainer, worker::Worker};

/// Image Worker Entry Point
///
/// Consumes product image upload and delete tasks from RabbitMQ, stores
/// assets in ImageKit and announces finished product batches.
///
/// - config/: Application configuration (server, database, ImageKit, RabbitMQ, worker)
/// - setup/: Dependency injection, health server and consumer runtime
/// - api/: Health endpoint
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing with RUST_LOG env filter
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // 2. Load environment variables
    dotenv().ok();

    // 3. Load configuration
    let config = AppConfig::from_env()?;

    // 4. Initialize database
    let pool = database_config::init_database(&config.database).await?;

    // 5. Wire dependencies
    let container = DependencyContainer::new(&config, pool).await?;

    // 6. Run consumers and health server until shutdown
    Worker::run(config, container).await?;

    Ok(())
}
