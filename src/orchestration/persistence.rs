use tracing::warn;

use crate::error::Result;
use crate::logging::{log_record_operation, short_id};
use crate::resilience::RetryPolicy;
use crate::store::RecordStore;

/// The only two fields this crate ever writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    TitleTranslated,
    Category,
}

impl RecordField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::TitleTranslated => "title_translated",
            RecordField::Category => "category",
        }
    }
}

/// Outcome of writing one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub updated: usize,
    pub failed: usize,
}

/// Single-record, single-field updates, each with its own retry budget
#[derive(Debug, Clone, Copy)]
pub struct PersistenceWriter {
    retry: RetryPolicy,
}

impl PersistenceWriter {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    async fn update(store: &dyn RecordStore, field: RecordField, id: &str, value: &str) -> Result<bool> {
        match field {
            RecordField::TitleTranslated => store.update_translation(id, value).await,
            RecordField::Category => store.update_category(id, value).await,
        }
    }

    /// `true` only when the store confirms the row was updated
    pub async fn write(&self, store: &dyn RecordStore, field: RecordField, id: &str, value: &str) -> bool {
        let operation = format!("update_{}", field.as_str());
        let mut attempts = 0;
        let result = self
            .retry
            .run(&operation, |attempt| {
                attempts = attempt + 1;
                Self::update(store, field, id, value)
            })
            .await;

        match result {
            Ok(true) => {
                log_record_operation(&operation, id, "updated", attempts, None);
                true
            }
            Ok(false) => {
                warn!(record_id = %short_id(id), field = field.as_str(), "💾 PERSIST: No row matched");
                false
            }
            Err(e) => {
                warn!(
                    record_id = %short_id(id),
                    field = field.as_str(),
                    attempts = e.attempts,
                    error = %e.last_error,
                    "💾 PERSIST: Update failed, record stays eligible"
                );
                false
            }
        }
    }

    /// Writes every `(id, text)` pair; one record's failure never stops its siblings
    pub async fn write_translations(&self, store: &dyn RecordStore, pairs: &[(&str, &str)]) -> WriteSummary {
        let mut summary = WriteSummary::default();
        for &(id, text) in pairs {
            if self.write(store, RecordField::TitleTranslated, id, text).await {
                summary.updated += 1;
            } else {
                summary.failed += 1;
            }
        }
        summary
    }
}
