//! # Record Store
//!
//! The engine talks to the catalog through [`RecordStore`]. Every dispatcher
//! worker obtains its own store handle from a [`StoreConnector`] and keeps it
//! for the lifetime of the worker.
//!
//! ```rust
//! use enricher_core::models::MarketRecord;
//! use enricher_core::scopes::{DateWindow, EligibilityCriteria};
//! use enricher_core::store::{fetch_all_eligible, InMemoryRecordStore};
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryRecordStore::with_records(vec![MarketRecord {
//!     id: "0x01".to_string(),
//!     title: "Will BTC hit $100k?".to_string(),
//!     category: Some("Crypto".to_string()),
//!     tags: vec![],
//!     end_date: None,
//!     title_translated: None,
//! }]);
//! let criteria = EligibilityCriteria {
//!     overwrite: false,
//!     window: DateWindow::unbounded(),
//!     excluded_categories: vec![],
//!     included_categories: None,
//!     exclude_null_category: false,
//! };
//! let eligible = fetch_all_eligible(&store, &criteria, 1000, None).await.unwrap();
//! assert_eq!(eligible.len(), 1);
//! # });
//! ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{MarketRecord, TranslationCandidate};
use crate::scopes::EligibilityCriteria;

pub use memory::{InMemoryConnector, InMemoryRecordStore};
pub use postgres::{PgRecordStore, PgStoreConnector};

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Number of records matching the eligibility predicate
    async fn count_eligible(&self, criteria: &EligibilityCriteria) -> Result<usize>;

    /// One page of eligible `(id, title)` pairs in store order, strictly after `after_id`
    async fn fetch_eligible_page(
        &self,
        criteria: &EligibilityCriteria,
        after_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TranslationCandidate>>;

    /// Single-field update of the translated title; `false` when no row matched
    async fn update_translation(&self, id: &str, translated: &str) -> Result<bool>;

    /// One page of records whose category is NULL or Uncategorized
    async fn fetch_unclassified_page(
        &self,
        after_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MarketRecord>>;

    /// Single-field update of the category; `false` when no row matched
    async fn update_category(&self, id: &str, category: &str) -> Result<bool>;
}

/// Opens a fresh, unshared store handle
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn RecordStore>>;
}

/// Drain every eligible candidate, page by page, in store order
pub async fn fetch_all_eligible(
    store: &dyn RecordStore,
    criteria: &EligibilityCriteria,
    page_size: usize,
    limit: Option<usize>,
) -> Result<Vec<TranslationCandidate>> {
    let mut candidates: Vec<TranslationCandidate> = Vec::new();
    let page_size = page_size.max(1);

    loop {
        let remaining = match limit {
            Some(limit) if candidates.len() >= limit => break,
            Some(limit) => (limit - candidates.len()).min(page_size),
            None => page_size,
        };
        let after_id = candidates.last().map(|c| c.id.clone());
        let page = store
            .fetch_eligible_page(criteria, after_id.as_deref(), remaining)
            .await?;
        let exhausted = page.len() < remaining;
        candidates.extend(page);
        if exhausted {
            break;
        }
    }

    Ok(candidates)
}
