//! # Orchestration Module
//!
//! Drives a translation run:
//!
//! ```text
//! count + fetch eligible ─► BatchPartitioner ─► ParallelDispatcher
//!                                                  │ (W workers, own store each)
//!                                                  ▼
//!                     TranslationClient ─► align ─► TerminologyCorrector ─► PersistenceWriter
//!                                                  │
//!                                                  ▼
//!                                              RunStats ─► RunSummary
//! ```

pub mod batch;
pub mod dispatcher;
pub mod engine;
pub mod persistence;
pub mod pipeline;
pub mod stats;

pub use batch::{Batch, BatchPartitioner};
pub use dispatcher::ParallelDispatcher;
pub use engine::{RunSummary, TranslationEngine};
pub use persistence::{PersistenceWriter, RecordField, WriteSummary};
pub use pipeline::{BatchPipeline, BatchReport, BatchStatus};
pub use stats::{RunStats, StatsSnapshot};
