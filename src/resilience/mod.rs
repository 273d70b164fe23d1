//! # Resilience Module
//!
//! Bounded retry with backoff. Two policies are in play during a run: one
//! around every call to the text-generation service (exponential, per batch)
//! and one around every single-record update (linear, per record).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use enricher_core::resilience::RetryPolicy;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let policy = RetryPolicy::exponential(3, Duration::from_secs(1));
//! let result = policy
//!     .run("fetch_translation", |attempt| async move {
//!         if attempt < 2 { Err("busy") } else { Ok(attempt) }
//!     })
//!     .await;
//! assert_eq!(result.ok(), Some(2));
//! # }
//! ```

pub mod retry;

pub use retry::{RetryError, RetryPolicy};
