//! # Data Models
//!
//! Row types read from the market catalog table. This crate never inserts or
//! deletes rows; it only updates `category` and the translated title.

pub mod market_record;

pub use market_record::{MarketRecord, TranslationCandidate};
