//! In-process record store.
//!
//! Evaluates the same [`EligibilityCriteria`] in memory that the Postgres
//! store pushes into SQL, and supports per-record write failure injection.
//! Used for dry runs and by the integration tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{RecordStore, StoreConnector};
use crate::error::{EnricherError, Result};
use crate::models::{MarketRecord, TranslationCandidate};
use crate::scopes::EligibilityCriteria;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteFailure {
    Always,
    Times(u32),
}

#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<BTreeMap<String, MarketRecord>>,
    failures: Mutex<HashMap<String, WriteFailure>>,
    write_attempts: Mutex<HashMap<String, u32>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I: IntoIterator<Item = MarketRecord>>(records: I) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&self, record: MarketRecord) {
        self.records.lock().insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<MarketRecord> {
        self.records.lock().get(id).cloned()
    }

    /// All records in store order
    pub fn snapshot(&self) -> Vec<MarketRecord> {
        self.records.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Every write to `id` fails
    pub fn fail_writes_permanently(&self, id: &str) {
        self.failures
            .lock()
            .insert(id.to_string(), WriteFailure::Always);
    }

    /// The next `times` writes to `id` fail, later ones succeed
    pub fn fail_writes_transiently(&self, id: &str, times: u32) {
        self.failures
            .lock()
            .insert(id.to_string(), WriteFailure::Times(times));
    }

    /// Number of update calls that reached this record
    pub fn write_attempts(&self, id: &str) -> u32 {
        self.write_attempts.lock().get(id).copied().unwrap_or(0)
    }

    fn check_write(&self, id: &str) -> Result<()> {
        *self.write_attempts.lock().entry(id.to_string()).or_insert(0) += 1;

        let mut failures = self.failures.lock();
        match failures.get_mut(id) {
            Some(WriteFailure::Always) => Err(EnricherError::persistence(id, "injected permanent failure")),
            Some(WriteFailure::Times(remaining)) if *remaining > 0 => {
                *remaining -= 1;
                Err(EnricherError::persistence(id, "injected transient failure"))
            }
            _ => Ok(()),
        }
    }

    fn update_with<F>(&self, id: &str, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut MarketRecord),
    {
        self.check_write(id)?;
        let mut records = self.records.lock();
        match records.get_mut(id) {
            Some(record) => {
                apply(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn after(id: &str, cursor: Option<&str>) -> bool {
    cursor.map_or(true, |cursor| id > cursor)
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn count_eligible(&self, criteria: &EligibilityCriteria) -> Result<usize> {
        Ok(self
            .records
            .lock()
            .values()
            .filter(|record| criteria.matches(record))
            .count())
    }

    async fn fetch_eligible_page(
        &self,
        criteria: &EligibilityCriteria,
        after_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TranslationCandidate>> {
        Ok(self
            .records
            .lock()
            .values()
            .filter(|record| after(&record.id, after_id) && criteria.matches(record))
            .take(limit)
            .map(MarketRecord::candidate)
            .collect())
    }

    async fn update_translation(&self, id: &str, translated: &str) -> Result<bool> {
        self.update_with(id, |record| {
            record.title_translated = Some(translated.to_string());
        })
    }

    async fn fetch_unclassified_page(
        &self,
        after_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<MarketRecord>> {
        Ok(self
            .records
            .lock()
            .values()
            .filter(|record| after(&record.id, after_id) && record.needs_classification())
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update_category(&self, id: &str, category: &str) -> Result<bool> {
        self.update_with(id, |record| {
            record.category = Some(category.to_string());
        })
    }
}

/// Hands every worker the same in-memory store and counts connections
#[derive(Debug, Clone)]
pub struct InMemoryConnector {
    store: Arc<InMemoryRecordStore>,
    connections: Arc<AtomicUsize>,
}

impl InMemoryConnector {
    pub fn new(store: Arc<InMemoryRecordStore>) -> Self {
        Self {
            store,
            connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn store(&self) -> &Arc<InMemoryRecordStore> {
        &self.store
    }

    pub fn connections_opened(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreConnector for InMemoryConnector {
    async fn connect(&self) -> Result<Arc<dyn RecordStore>> {
        self.connections.fetch_add(1, Ordering::SeqCst);
        let store: Arc<dyn RecordStore> = self.store.clone();
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Category;
    use crate::scopes::DateWindow;

    fn record(id: &str, category: Option<&str>, translated: Option<&str>) -> MarketRecord {
        MarketRecord {
            id: id.to_string(),
            title: format!("Market {id}"),
            category: category.map(str::to_string),
            tags: vec![],
            end_date: None,
            title_translated: translated.map(str::to_string),
        }
    }

    fn untranslated() -> EligibilityCriteria {
        EligibilityCriteria {
            overwrite: false,
            window: DateWindow::unbounded(),
            excluded_categories: vec![Category::Sports],
            included_categories: None,
            exclude_null_category: false,
        }
    }

    #[tokio::test]
    async fn test_eligible_pages_follow_store_order() {
        let store = InMemoryRecordStore::with_records(vec![
            record("c", Some("Crypto"), None),
            record("a", Some("Politics"), None),
            record("b", Some("Sports"), None),
            record("d", None, Some("done")),
            record("e", None, None),
        ]);
        let criteria = untranslated();

        assert_eq!(store.count_eligible(&criteria).await.unwrap(), 3);

        let first = store.fetch_eligible_page(&criteria, None, 2).await.unwrap();
        let ids: Vec<_> = first.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        let second = store
            .fetch_eligible_page(&criteria, Some("c"), 2)
            .await
            .unwrap();
        let ids: Vec<_> = second.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["e"]);
    }

    #[tokio::test]
    async fn test_transient_failures_then_success() {
        let store = InMemoryRecordStore::with_records(vec![record("a", None, None)]);
        store.fail_writes_transiently("a", 2);

        assert!(store.update_translation("a", "가").await.is_err());
        assert!(store.update_translation("a", "가").await.is_err());
        assert!(store.update_translation("a", "가").await.unwrap());
        assert_eq!(store.write_attempts("a"), 3);
        assert_eq!(store.get("a").unwrap().title_translated.as_deref(), Some("가"));
    }

    #[tokio::test]
    async fn test_update_of_unknown_id_matches_nothing() {
        let store = InMemoryRecordStore::new();
        assert!(!store.update_category("missing", "Crypto").await.unwrap());
    }

    #[tokio::test]
    async fn test_unclassified_page() {
        let store = InMemoryRecordStore::with_records(vec![
            record("a", Some("Uncategorized"), None),
            record("b", Some("Crypto"), None),
            record("c", None, None),
        ]);
        let page = store.fetch_unclassified_page(None, 10).await.unwrap();
        let ids: Vec<_> = page.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_include_list_counts_only_named_labels() {
        let store = InMemoryRecordStore::with_records(vec![
            record("a", Some("Crypto"), None),
            record("b", Some("Weather"), None),
            record("c", None, None),
            record("d", Some("Uncategorized"), None),
        ]);
        let criteria = EligibilityCriteria {
            excluded_categories: vec![],
            included_categories: Some(vec![Category::Crypto, Category::Science]),
            ..untranslated()
        };

        assert_eq!(store.count_eligible(&criteria).await.unwrap(), 1);
        let page = store.fetch_eligible_page(&criteria, None, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "a");
    }
}
