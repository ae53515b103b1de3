use persistence::db::{DatabaseConfig, create_postgres_pool, run_migrations};
use sqlx::PgPool;

use super::env;

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub migrations_path: String,
}

impl DatabaseSettings {
    /// Environment variables:
    /// - DATABASE_URL: PostgreSQL connection string (required)
    /// - DATABASE_MAX_CONNECTIONS: pool size (default: 5)
    /// - RUN_MIGRATIONS: apply migrations at start (default: false)
    /// - MIGRATIONS_PATH: migrations directory (default: "migrations")
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            url: env::required("DATABASE_URL")?,
            max_connections: env::parsed_or("DATABASE_MAX_CONNECTIONS", 5)?,
            run_migrations: env::parsed_or("RUN_MIGRATIONS", false)?,
            migrations_path: env::optional("MIGRATIONS_PATH")
                .unwrap_or_else(|| "migrations".to_string()),
        })
    }
}

/// Initialize the database connection pool, applying migrations when enabled
///
/// # Errors
/// Returns error if the connection or a migration fails
pub async fn init_database(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    let config =
        DatabaseConfig::new(settings.url.clone()).with_max_connections(settings.max_connections);
    let pool = create_postgres_pool(&config).await?;

    if settings.run_migrations {
        run_migrations(&pool, &settings.migrations_path).await?;
        tracing::info!(path = %settings.migrations_path, "Database migrations applied");
    }

    Ok(pool)
}
