//! Per-batch pipeline: translate, align, correct, persist.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use super::batch::Batch;
use super::persistence::PersistenceWriter;
use crate::logging::log_batch_operation;
use crate::store::RecordStore;
use crate::translation::{align, TerminologyCorrector, TranslationClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchStatus {
    Completed,
    Failed { reason: String },
}

/// What one batch contributed to the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub number: usize,
    pub size: usize,
    pub translated: usize,
    pub records_failed: usize,
    pub alignment_shortfall: usize,
    pub status: BatchStatus,
}

impl BatchReport {
    pub fn failed<R: Into<String>>(batch: &Batch, reason: R) -> Self {
        Self {
            number: batch.number,
            size: batch.len(),
            translated: 0,
            records_failed: 0,
            alignment_shortfall: 0,
            status: BatchStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, BatchStatus::Completed)
    }
}

pub struct BatchPipeline {
    client: TranslationClient,
    corrector: Arc<TerminologyCorrector>,
    writer: PersistenceWriter,
}

impl BatchPipeline {
    pub fn new(
        client: TranslationClient,
        corrector: Arc<TerminologyCorrector>,
        writer: PersistenceWriter,
    ) -> Self {
        Self {
            client,
            corrector,
            writer,
        }
    }

    /// Runs one batch end to end against the worker's own store
    pub async fn process(&self, store: &dyn RecordStore, batch: &Batch) -> BatchReport {
        let titles = batch.titles();
        log_batch_operation("translate", batch.number, batch.len(), "started", None);

        let response = match self.client.translate(&titles).await {
            Ok(response) => response,
            Err(e) => {
                let reason = e.to_string();
                log_batch_operation("translate", batch.number, batch.len(), "failed", Some(&reason));
                return BatchReport::failed(batch, reason);
            }
        };

        let aligned = align(&titles, &response);
        if !aligned.report.is_complete() {
            warn!(
                batch_number = batch.number,
                expected = aligned.report.expected,
                parsed = aligned.report.parsed,
                missing = ?aligned.report.missing_positions,
                stray_lines = aligned.report.stray_lines,
                "📦 BATCH: Response short of the batch, keeping source titles for missing positions"
            );
        }

        let corrected: Vec<String> = titles
            .iter()
            .zip(aligned.texts.iter())
            .map(|(source, translated)| self.corrector.correct(source, translated))
            .collect();

        let pairs: Vec<(&str, &str)> = batch
            .items
            .iter()
            .zip(corrected.iter())
            .map(|(item, text)| (item.id.as_str(), text.as_str()))
            .collect();
        let written = self.writer.write_translations(store, &pairs).await;

        debug!(
            batch_number = batch.number,
            updated = written.updated,
            failed = written.failed,
            "📦 BATCH: Persisted"
        );
        log_batch_operation("translate", batch.number, batch.len(), "completed", None);

        BatchReport {
            number: batch.number,
            size: batch.len(),
            translated: written.updated,
            records_failed: written.failed,
            alignment_shortfall: aligned.report.shortfall(),
            status: BatchStatus::Completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MarketRecord, TranslationCandidate};
    use crate::resilience::RetryPolicy;
    use crate::store::InMemoryRecordStore;
    use crate::translation::{PromptTemplate, ServiceError, TextGenerator};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Echoes every numbered title back with a marker
    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, _system: &str, user: &str) -> Result<String, ServiceError> {
            let list = user.rsplit_once("번역할 제목들:").map_or(user, |(_, list)| list);
            Ok(list
                .lines()
                .filter_map(|line| line.split_once(". "))
                .map(|(n, title)| format!("{n}. 번역 {title}"))
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }

    fn pipeline() -> BatchPipeline {
        let fast = RetryPolicy::linear(2, Duration::from_millis(1));
        BatchPipeline::new(
            TranslationClient::new(Arc::new(Echo), PromptTemplate::builtin(), fast),
            Arc::new(TerminologyCorrector::new().unwrap()),
            PersistenceWriter::new(fast),
        )
    }

    fn batch(ids: &[&str]) -> Batch {
        Batch {
            number: 1,
            items: ids
                .iter()
                .map(|id| TranslationCandidate {
                    id: id.to_string(),
                    title: format!("Title {id}"),
                })
                .collect(),
        }
    }

    fn store(ids: &[&str]) -> InMemoryRecordStore {
        InMemoryRecordStore::with_records(ids.iter().map(|id| MarketRecord {
            id: id.to_string(),
            title: format!("Title {id}"),
            category: None,
            tags: vec![],
            end_date: None,
            title_translated: None,
        }))
    }

    fn assert_send<F: std::future::Future + Send>(future: F) -> F {
        future
    }

    #[tokio::test]
    async fn test_process_future_can_be_spawned() {
        let pipeline = Arc::new(pipeline());
        let store: Arc<dyn RecordStore> = Arc::new(store(&["a", "b"]));
        let batch = batch(&["a", "b"]);

        let report = tokio::spawn(async move {
            assert_send(pipeline.process(store.as_ref(), &batch)).await
        })
        .await
        .unwrap();

        assert!(report.is_completed());
        assert_eq!(report.translated, 2);
    }

    #[tokio::test]
    async fn test_process_writes_each_record() {
        let store = store(&["a", "b", "c"]);
        store.fail_writes_permanently("b");

        let report = pipeline().process(&store, &batch(&["a", "b", "c"])).await;

        assert_eq!(report.translated, 2);
        assert_eq!(report.records_failed, 1);
        assert_eq!(report.alignment_shortfall, 0);
        assert_eq!(store.get("a").unwrap().title_translated.as_deref(), Some("번역 Title a"));
        assert!(store.get("b").unwrap().title_translated.is_none());
    }
}
