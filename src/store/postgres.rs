use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use super::{RecordStore, StoreConnector};
use crate::config::DatabaseConfig;
use crate::constants::table;
use crate::database::DatabaseConnection;
use crate::error::Result;
use crate::models::{MarketRecord, TranslationCandidate};
use crate::scopes::{EligibilityCriteria, RecordScope};

/// Record store backed by one Postgres connection pool
pub struct PgRecordStore {
    connection: DatabaseConnection,
}

impl PgRecordStore {
    pub fn new(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    async fn update_column(&self, column: &str, id: &str, value: &str) -> Result<bool> {
        let sql = format!(
            "UPDATE {} SET {column} = $1 WHERE {} = $2",
            table::MARKET_EVENTS,
            table::ID
        );
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(id)
            .execute(self.connection.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn count_eligible(&self, criteria: &EligibilityCriteria) -> Result<usize> {
        let count = RecordScope::counting()
            .eligible(criteria)
            .count(self.connection.pool())
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn fetch_eligible_page(
        &self,
        criteria: &EligibilityCriteria,
        after_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TranslationCandidate>> {
        let page = RecordScope::candidates()
            .eligible(criteria)
            .after_id(after_id)
            .order_by_id()
            .limit(limit as i64)
            .all(self.connection.pool())
            .await?;
        debug!(rows = page.len(), "💾 DATABASE: Fetched eligible page");
        Ok(page)
    }

    async fn update_translation(&self, id: &str, translated: &str) -> Result<bool> {
        self.update_column(table::TITLE_TRANSLATED, id, translated).await
    }

    async fn fetch_unclassified_page(
        &self,
        after_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MarketRecord>> {
        let page = RecordScope::records()
            .unclassified()
            .after_id(after_id)
            .order_by_id()
            .limit(limit as i64)
            .all(self.connection.pool())
            .await?;
        Ok(page)
    }

    async fn update_category(&self, id: &str, category: &str) -> Result<bool> {
        self.update_column(table::CATEGORY, id, category).await
    }
}

/// Opens a dedicated pool per call so that no two workers share a connection
#[derive(Debug, Clone)]
pub struct PgStoreConnector {
    config: DatabaseConfig,
}

impl PgStoreConnector {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl StoreConnector for PgStoreConnector {
    async fn connect(&self) -> Result<Arc<dyn RecordStore>> {
        let connection = DatabaseConnection::connect(&self.config).await?;
        Ok(Arc::new(PgRecordStore::new(connection)))
    }
}
