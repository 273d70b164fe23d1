use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use super::classifier::CategoryClassifier;
use crate::constants::{Category, FETCH_PAGE_SIZE};
use crate::error::Result;
use crate::orchestration::{PersistenceWriter, RecordField};
use crate::store::RecordStore;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReclassificationSummary {
    pub scanned: usize,
    pub updated: usize,
    pub failed: usize,
    /// Records still NULL or Uncategorized after the pass
    pub remaining_uncategorized: usize,
    /// Written labels, Uncategorized included for formerly NULL records
    pub by_category: BTreeMap<Category, usize>,
}

impl fmt::Display for ReclassificationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Category backfill")?;
        writeln!(
            f,
            "  scanned {}, updated {}, failed {}, still uncategorized {}",
            self.scanned, self.updated, self.failed, self.remaining_uncategorized
        )?;
        for (category, count) in &self.by_category {
            writeln!(f, "  {:<14} {}", category.as_str(), count)?;
        }
        Ok(())
    }
}

/// Fills in NULL and Uncategorized categories from title and tags.
///
/// NULL records are always written, even when the result is Uncategorized.
/// Uncategorized records are only written when a real label is found.
pub struct CategoryBackfill {
    classifier: CategoryClassifier,
    writer: PersistenceWriter,
    page_size: usize,
}

impl CategoryBackfill {
    pub fn new(classifier: CategoryClassifier, writer: PersistenceWriter) -> Self {
        Self {
            classifier,
            writer,
            page_size: FETCH_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn run(&self, store: &dyn RecordStore) -> Result<ReclassificationSummary> {
        let mut summary = ReclassificationSummary::default();
        let mut cursor: Option<String> = None;

        loop {
            let page = store
                .fetch_unclassified_page(cursor.as_deref(), self.page_size)
                .await?;
            let exhausted = page.len() < self.page_size;
            cursor = page.last().map(|record| record.id.clone());

            for record in &page {
                summary.scanned += 1;
                let label = self.classifier.infer(&record.title, &record.tags);

                if record.category.is_some() && label.is_uncategorized() {
                    summary.remaining_uncategorized += 1;
                    continue;
                }

                if self
                    .writer
                    .write(store, RecordField::Category, &record.id, label.as_str())
                    .await
                {
                    summary.updated += 1;
                    *summary.by_category.entry(label).or_insert(0) += 1;
                    if label.is_uncategorized() {
                        summary.remaining_uncategorized += 1;
                    }
                } else {
                    summary.failed += 1;
                    summary.remaining_uncategorized += 1;
                }
            }

            debug!(
                scanned = summary.scanned,
                updated = summary.updated,
                "🏷️ CLASSIFY: Page processed"
            );
            if exhausted || cursor.is_none() {
                break;
            }
        }

        info!(
            scanned = summary.scanned,
            updated = summary.updated,
            failed = summary.failed,
            remaining_uncategorized = summary.remaining_uncategorized,
            "🏷️ CLASSIFY: Category backfill finished"
        );
        Ok(summary)
    }
}
