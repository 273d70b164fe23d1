//! # Query Scopes Module
//!
//! Chainable, composable queries over the market catalog table.
//!
//! Eligibility is recomputed from the current field values on every run, so
//! the same [`EligibilityCriteria`] is expressed twice: as a store-side SQL
//! predicate ([`RecordScope::eligible`]) and as an in-process check
//! ([`EligibilityCriteria::matches`]) used by non-SQL stores and tests. Both
//! must agree on every record.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use enricher_core::models::TranslationCandidate;
//! use enricher_core::scopes::{EligibilityCriteria, RecordScope};
//! # async fn example(pool: &sqlx::PgPool, criteria: &EligibilityCriteria) -> Result<(), sqlx::Error> {
//! let first_page: Vec<TranslationCandidate> = RecordScope::candidates()
//!     .eligible(criteria)
//!     .order_by_id()
//!     .limit(1000)
//!     .all(pool)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod eligibility;
pub mod record;

pub use eligibility::{DateWindow, EligibilityCriteria};
pub use record::RecordScope;
