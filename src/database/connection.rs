use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::debug;

use crate::config::DatabaseConfig;

/// One independent connection pool; every dispatcher worker owns its own
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .test_before_acquire(true)
            .connect(&config.url)
            .await?;

        debug!(
            max_connections = config.max_connections,
            "💾 DATABASE: Connection pool established"
        );

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
