use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::batch::BatchPartitioner;
use super::dispatcher::ParallelDispatcher;
use super::persistence::PersistenceWriter;
use super::pipeline::{BatchPipeline, BatchReport};
use super::stats::RunStats;
use crate::config::{EnricherConfig, RunConfig, RunPreset};
use crate::constants::FETCH_PAGE_SIZE;
use crate::error::Result;
use crate::resilience::RetryPolicy;
use crate::store::{fetch_all_eligible, StoreConnector};
use crate::translation::{PromptTemplate, TerminologyCorrector, TextGenerator, TranslationClient};

/// Operator-facing result of one translation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub preset: RunPreset,
    pub eligible: usize,
    pub batches_planned: usize,
    pub batches_completed: usize,
    pub batches_failed: usize,
    pub translated: usize,
    pub records_failed: usize,
    pub alignment_shortfalls: usize,
    pub elapsed: Duration,
    pub throughput_per_minute: f64,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Translation run ({})", self.preset)?;
        writeln!(f, "  eligible records:     {}", self.eligible)?;
        writeln!(
            f,
            "  batches:              {} planned, {} completed, {} failed",
            self.batches_planned, self.batches_completed, self.batches_failed
        )?;
        writeln!(f, "  translated records:   {}", self.translated)?;
        writeln!(f, "  failed record writes: {}", self.records_failed)?;
        writeln!(f, "  untranslated fallbacks: {}", self.alignment_shortfalls)?;
        write!(
            f,
            "  elapsed:              {:.1}s ({:.0} records/min)",
            self.elapsed.as_secs_f64(),
            self.throughput_per_minute
        )
    }
}

/// One engine for every preset: count, fetch, partition, dispatch
pub struct TranslationEngine {
    run: RunConfig,
    connector: Arc<dyn StoreConnector>,
    pipeline: Arc<BatchPipeline>,
}

impl TranslationEngine {
    pub fn new(run: RunConfig, connector: Arc<dyn StoreConnector>, pipeline: Arc<BatchPipeline>) -> Self {
        Self {
            run,
            connector,
            pipeline,
        }
    }

    /// Validates the configuration and wires the batch pipeline.
    ///
    /// Fails before anything touches the store or the service.
    pub fn from_config(
        config: &EnricherConfig,
        config_dir: &Path,
        run: RunConfig,
        connector: Arc<dyn StoreConnector>,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self> {
        config.validate()?;

        let template = PromptTemplate::from_config(&config.translation, config_dir)?;
        let client = TranslationClient::new(generator, template, RetryPolicy::from(&config.retry.batch));
        let corrector = Arc::new(TerminologyCorrector::new()?);
        let writer = PersistenceWriter::new(RetryPolicy::from(&config.retry.record));
        let pipeline = Arc::new(BatchPipeline::new(client, corrector, writer));

        Ok(Self::new(run, connector, pipeline))
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let stats = Arc::new(RunStats::new());
        let criteria = &self.run.criteria;

        let planning_store = self.connector.connect().await?;
        let eligible = planning_store.count_eligible(criteria).await?;
        let batches_planned = self.run.planned_batches(eligible);

        info!(
            preset = %self.run.preset,
            eligible = eligible,
            batches = batches_planned,
            batch_size = self.run.batch_size,
            workers = self.run.workers,
            overwrite = criteria.overwrite,
            excluded = ?criteria.excluded_labels(),
            included = ?criteria.included_labels(),
            "🚀 ENGINE: Run planned"
        );

        let candidates = fetch_all_eligible(
            planning_store.as_ref(),
            criteria,
            FETCH_PAGE_SIZE,
            self.run.record_limit(),
        )
        .await?;
        drop(planning_store);

        let batches = BatchPartitioner::new(self.run.batch_size).partition(candidates, self.run.max_batches);
        if batches.len() != batches_planned {
            warn!(
                planned = batches_planned,
                fetched = batches.len(),
                "🚀 ENGINE: Eligible set changed between count and fetch"
            );
        }

        let dispatcher = ParallelDispatcher::new(self.run.workers, self.connector.clone());
        let reports = dispatcher
            .dispatch(batches, self.pipeline.clone(), stats.clone())
            .await;
        log_failed_batches(&reports);

        let snapshot = stats.snapshot();
        let summary = RunSummary {
            preset: self.run.preset,
            eligible,
            batches_planned,
            batches_completed: snapshot.batches_completed,
            batches_failed: snapshot.batches_failed,
            translated: snapshot.translated,
            records_failed: snapshot.records_failed,
            alignment_shortfalls: snapshot.alignment_shortfalls,
            elapsed: stats.elapsed(),
            throughput_per_minute: stats.throughput_per_minute(),
        };

        info!(
            translated = summary.translated,
            batches_completed = summary.batches_completed,
            batches_failed = summary.batches_failed,
            alignment_shortfalls = summary.alignment_shortfalls,
            elapsed_seconds = summary.elapsed.as_secs_f64(),
            "🚀 ENGINE: Run finished"
        );
        Ok(summary)
    }
}

fn log_failed_batches(reports: &[BatchReport]) {
    let failed: Vec<usize> = reports
        .iter()
        .filter(|report| !report.is_completed())
        .map(|report| report.number)
        .collect();
    if !failed.is_empty() {
        warn!(
            count = failed.len(),
            batch_numbers = ?failed,
            "🚀 ENGINE: Some batches failed; their records stay eligible for the next run"
        );
    }
}
