//! # Parallel Dispatcher
//!
//! Fixed-size pool of worker tasks draining one shared queue of precomputed
//! batches. Each worker opens its own store handle through the
//! [`StoreConnector`] before taking any work and keeps it until the queue is
//! empty. Reports come back in completion order.
//!
//! A batch that errors or panics is counted as failed; its siblings keep
//! running. Batches left in the queue because no worker could connect are
//! counted as failed too.

use crossbeam::channel::{self, Receiver};
use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::batch::Batch;
use super::pipeline::{BatchPipeline, BatchReport};
use super::stats::RunStats;
use crate::logging::log_error;
use crate::store::StoreConnector;

pub struct ParallelDispatcher {
    workers: usize,
    connector: Arc<dyn StoreConnector>,
}

impl ParallelDispatcher {
    pub fn new(workers: usize, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            workers: workers.max(1),
            connector,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub async fn dispatch(
        &self,
        batches: Vec<Batch>,
        pipeline: Arc<BatchPipeline>,
        stats: Arc<RunStats>,
    ) -> Vec<BatchReport> {
        if batches.is_empty() {
            return Vec::new();
        }

        let total = batches.len();
        let pool_size = self.workers.min(total);
        let (queue_tx, queue_rx) = channel::unbounded::<Batch>();
        for batch in batches {
            queue_tx.send(batch).ok();
        }
        drop(queue_tx);

        info!(
            batches = total,
            workers = pool_size,
            "🏊 POOL: Dispatching batches"
        );

        let (report_tx, mut report_rx) = mpsc::unbounded_channel::<BatchReport>();
        let handles: Vec<_> = (0..pool_size)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    self.connector.clone(),
                    queue_rx.clone(),
                    pipeline.clone(),
                    stats.clone(),
                    report_tx.clone(),
                ))
            })
            .collect();
        drop(report_tx);

        let mut reports = Vec::with_capacity(total);
        while let Some(report) = report_rx.recv().await {
            reports.push(report);
        }

        for (worker_id, joined) in join_all(handles).await.into_iter().enumerate() {
            if let Err(e) = joined {
                error!(worker_id = worker_id, error = %e, "🏊 POOL: Worker task aborted");
            }
        }

        // Nothing left to pull these once every worker is gone
        let stranded: Vec<Batch> = queue_rx.try_iter().collect();
        if !stranded.is_empty() {
            warn!(
                stranded = stranded.len(),
                "🏊 POOL: No worker could take the remaining batches"
            );
        }
        for batch in stranded {
            stats.record_batch_failed();
            reports.push(BatchReport::failed(&batch, "no worker could open a store connection"));
        }

        reports
    }
}

async fn run_worker(
    worker_id: usize,
    connector: Arc<dyn StoreConnector>,
    queue: Receiver<Batch>,
    pipeline: Arc<BatchPipeline>,
    stats: Arc<RunStats>,
    reports: mpsc::UnboundedSender<BatchReport>,
) {
    let store = match connector.connect().await {
        Ok(store) => store,
        Err(e) => {
            log_error(
                "dispatcher",
                "connect",
                &e.to_string(),
                Some(&format!("worker {worker_id}")),
            );
            return;
        }
    };
    debug!(worker_id = worker_id, "🏊 POOL: Worker connected");

    let mut processed = 0usize;
    while let Ok(batch) = queue.try_recv() {
        let outcome = AssertUnwindSafe(pipeline.process(store.as_ref(), &batch))
            .catch_unwind()
            .await;

        let report = match outcome {
            Ok(report) => report,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "Unknown panic".to_string());
                error!(
                    worker_id = worker_id,
                    batch_number = batch.number,
                    panic_msg = %message,
                    "📦 BATCH: Processing panicked"
                );
                BatchReport::failed(&batch, format!("batch processing panicked: {message}"))
            }
        };

        if report.is_completed() {
            stats.record_batch_completed(
                report.translated,
                report.alignment_shortfall,
                report.records_failed,
            );
        } else {
            stats.record_batch_failed();
        }
        processed += 1;

        if reports.send(report).is_err() {
            break;
        }
    }

    debug!(worker_id = worker_id, processed = processed, "🏊 POOL: Worker finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EnricherError, Result};
    use crate::models::{MarketRecord, TranslationCandidate};
    use crate::orchestration::batch::BatchPartitioner;
    use crate::orchestration::persistence::PersistenceWriter;
    use crate::resilience::RetryPolicy;
    use crate::store::{InMemoryConnector, InMemoryRecordStore, RecordStore};
    use crate::translation::{PromptTemplate, ServiceError, TerminologyCorrector, TextGenerator, TranslationClient};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Answers every numbered title with itself
    struct Parrot;

    #[async_trait]
    impl TextGenerator for Parrot {
        async fn generate(&self, _system: &str, user: &str) -> std::result::Result<String, ServiceError> {
            let list = user.rsplit_once("번역할 제목들:").map_or(user, |(_, list)| list);
            Ok(list.trim().to_string())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl StoreConnector for Unreachable {
        async fn connect(&self) -> Result<Arc<dyn RecordStore>> {
            Err(EnricherError::orchestration("database unreachable"))
        }
    }

    fn pipeline() -> Arc<BatchPipeline> {
        let fast = RetryPolicy::linear(2, Duration::from_millis(1));
        Arc::new(BatchPipeline::new(
            TranslationClient::new(Arc::new(Parrot), PromptTemplate::builtin(), fast),
            Arc::new(TerminologyCorrector::new().unwrap()),
            PersistenceWriter::new(fast),
        ))
    }

    fn batches(count: usize, size: usize) -> (Arc<InMemoryRecordStore>, Vec<Batch>) {
        let records: Vec<MarketRecord> = (0..count)
            .map(|i| MarketRecord {
                id: format!("r-{i:03}"),
                title: format!("Title {i}"),
                category: None,
                tags: vec![],
                end_date: None,
                title_translated: None,
            })
            .collect();
        let candidates: Vec<TranslationCandidate> = records.iter().map(MarketRecord::candidate).collect();
        let store = Arc::new(InMemoryRecordStore::with_records(records));
        (store, BatchPartitioner::new(size).partition(candidates, None))
    }

    #[tokio::test]
    async fn test_every_queued_batch_is_reported() {
        let (store, batches) = batches(23, 5);
        let connector = Arc::new(InMemoryConnector::new(store.clone()));
        let stats = Arc::new(RunStats::new());

        let reports = ParallelDispatcher::new(3, connector.clone())
            .dispatch(batches, pipeline(), stats.clone())
            .await;

        let mut numbers: Vec<usize> = reports.iter().map(|r| r.number).collect();
        numbers.sort_unstable();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert!(reports.iter().all(BatchReport::is_completed));
        assert_eq!(stats.snapshot().translated, 23);
        assert_eq!(connector.connections_opened(), 3);
    }

    #[tokio::test]
    async fn test_batches_without_a_connected_worker_count_as_failed() {
        let (_store, batches) = batches(12, 5);
        let stats = Arc::new(RunStats::new());

        let reports = ParallelDispatcher::new(2, Arc::new(Unreachable))
            .dispatch(batches, pipeline(), stats.clone())
            .await;

        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| !r.is_completed()));
        assert_eq!(stats.snapshot().batches_failed, 3);
        assert_eq!(stats.snapshot().translated, 0);
    }
}
