//! Fixture builders for records, stores and engines.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use enricher_core::config::{RunConfig, RunPreset};
use enricher_core::models::MarketRecord;
use enricher_core::orchestration::{BatchPipeline, PersistenceWriter, TranslationEngine};
use enricher_core::resilience::RetryPolicy;
use enricher_core::scopes::{DateWindow, EligibilityCriteria};
use enricher_core::store::{InMemoryConnector, InMemoryRecordStore};
use enricher_core::translation::{PromptTemplate, TerminologyCorrector, TextGenerator, TranslationClient};

pub struct MarketRecordBuilder {
    record: MarketRecord,
}

impl MarketRecordBuilder {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            record: MarketRecord {
                id: id.to_string(),
                title: title.to_string(),
                category: Some("Crypto".to_string()),
                tags: vec![],
                end_date: Some(Utc::now() + Duration::days(7)),
                title_translated: None,
            },
        }
    }

    pub fn category(mut self, category: Option<&str>) -> Self {
        self.record.category = category.map(str::to_string);
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.record.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn end_date(mut self, end_date: Option<DateTime<Utc>>) -> Self {
        self.record.end_date = end_date;
        self
    }

    pub fn translated(mut self, text: &str) -> Self {
        self.record.title_translated = Some(text.to_string());
        self
    }

    pub fn build(self) -> MarketRecord {
        self.record
    }
}

pub fn market(id: &str, title: &str) -> MarketRecordBuilder {
    MarketRecordBuilder::new(id, title)
}

/// `count` untranslated Crypto records ending next week, ids `m-0000`..
pub fn seeded_records(count: usize) -> Vec<MarketRecord> {
    (0..count)
        .map(|i| market(&format!("m-{i:04}"), &format!("Will token #{i} reach a new high?")).build())
        .collect()
}

pub fn seeded_store(records: Vec<MarketRecord>) -> Arc<InMemoryRecordStore> {
    Arc::new(InMemoryRecordStore::with_records(records))
}

/// Untranslated records, any end date, nothing excluded
pub fn untranslated_criteria() -> EligibilityCriteria {
    EligibilityCriteria {
        overwrite: false,
        window: DateWindow::unbounded(),
        excluded_categories: vec![],
        included_categories: None,
        exclude_null_category: false,
    }
}

pub fn run_config(workers: usize, batch_size: usize, criteria: EligibilityCriteria) -> RunConfig {
    RunConfig {
        preset: RunPreset::Custom,
        workers,
        batch_size,
        max_batches: None,
        criteria,
    }
}

pub fn fast_pipeline(generator: Arc<dyn TextGenerator>) -> Arc<BatchPipeline> {
    let client = TranslationClient::new(
        generator,
        PromptTemplate::builtin(),
        RetryPolicy::exponential(3, std::time::Duration::from_millis(1)),
    );
    let corrector = Arc::new(TerminologyCorrector::new().expect("built-in patterns compile"));
    let writer = PersistenceWriter::new(RetryPolicy::linear(3, std::time::Duration::from_millis(1)));
    Arc::new(BatchPipeline::new(client, corrector, writer))
}

pub struct EngineFixture {
    pub engine: TranslationEngine,
    pub connector: Arc<InMemoryConnector>,
    pub store: Arc<InMemoryRecordStore>,
}

pub fn engine_fixture(
    store: Arc<InMemoryRecordStore>,
    generator: Arc<dyn TextGenerator>,
    run: RunConfig,
) -> EngineFixture {
    let connector = Arc::new(InMemoryConnector::new(store.clone()));
    let engine = TranslationEngine::new(run, connector.clone(), fast_pipeline(generator));
    EngineFixture {
        engine,
        connector,
        store,
    }
}
