#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Enricher Core
//!
//! Category inference and batched, concurrent title translation for a
//! prediction-market catalog held in Postgres.
//!
//! ## Overview
//!
//! Two passes over the catalog, both safe to rerun:
//!
//! 1. **Category backfill**: records with a missing or Uncategorized category
//!    get a label from deterministic keyword rules.
//! 2. **Translation**: eligible titles are split into ordered batches of up to
//!    100, sent to a text-generation service by a pool of workers, aligned back
//!    to their records by position, normalized against a glossary and written
//!    one record at a time.
//!
//! Eligibility is recomputed from the stored fields on every run, so records
//! that failed anywhere along the way are simply picked up next time.
//!
//! ## Module Organization
//!
//! - [`classification`] - Category classifier and backfill pass
//! - [`scopes`] - Eligibility criteria and the SQL scopes that express them
//! - [`store`] - Record store trait with Postgres and in-memory implementations
//! - [`translation`] - Prompt, service client, response aligner, terminology corrector
//! - [`orchestration`] - Partitioner, dispatcher, persistence writer, stats, engine
//! - [`resilience`] - Retry policy shared by batch and record level
//! - [`config`] - YAML configuration with environment overrides and run presets
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use enricher_core::config::ConfigManager;
//! use enricher_core::orchestration::TranslationEngine;
//! use enricher_core::store::PgStoreConnector;
//! use enricher_core::translation::OpenAiChatClient;
//! use std::sync::Arc;
//!
//! # async fn example() -> enricher_core::Result<()> {
//! let manager = ConfigManager::load()?;
//! let config = manager.config();
//! let run = config.run.resolve(chrono::Utc::now());
//!
//! let engine = TranslationEngine::from_config(
//!     config,
//!     manager.config_directory(),
//!     run,
//!     Arc::new(PgStoreConnector::new(config.database.clone())),
//!     Arc::new(OpenAiChatClient::new(&config.text_generation)?),
//! )?;
//! println!("{}", engine.run().await?);
//! # Ok(())
//! # }
//! ```

pub mod classification;
pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod resilience;
pub mod scopes;
pub mod store;
pub mod test_utils;
pub mod translation;

pub use classification::{CategoryBackfill, CategoryClassifier, ReclassificationSummary};
pub use config::{ConfigManager, EnricherConfig, RunConfig, RunPreset};
pub use constants::Category;
pub use error::{EnricherError, Result};
pub use models::{MarketRecord, TranslationCandidate};
pub use orchestration::{RunSummary, TranslationEngine};
pub use scopes::EligibilityCriteria;
