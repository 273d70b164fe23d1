//! # Classification Module
//!
//! Deterministic category inference and the backfill pass that applies it to
//! records whose category is missing or Uncategorized.

pub mod backfill;
pub mod classifier;

pub use backfill::{CategoryBackfill, ReclassificationSummary};
pub use classifier::{CategoryClassifier, RuleSet};
