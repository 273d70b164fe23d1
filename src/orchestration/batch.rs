use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_BATCH_SIZE;
use crate::models::TranslationCandidate;

/// Ordered group of records submitted in one service call.
///
/// Position `i` (0-based) of `items` pairs with numbered line `i + 1` of the
/// response; the order is never changed after partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// 1-based, in fetch order
    pub number: usize,
    pub items: Vec<TranslationCandidate>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn titles(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.title.as_str()).collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPartitioner {
    batch_size: usize,
}

impl Default for BatchPartitioner {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl BatchPartitioner {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Split `candidates` in store order; only the last batch may be short
    pub fn partition(
        &self,
        candidates: Vec<TranslationCandidate>,
        max_batches: Option<usize>,
    ) -> Vec<Batch> {
        let mut batches = Vec::with_capacity(candidates.len().div_ceil(self.batch_size));
        let mut items = candidates.into_iter().peekable();

        while items.peek().is_some() {
            if max_batches.is_some_and(|cap| batches.len() >= cap) {
                break;
            }
            let chunk: Vec<TranslationCandidate> = items.by_ref().take(self.batch_size).collect();
            batches.push(Batch {
                number: batches.len() + 1,
                items: chunk,
            });
        }
        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize) -> Vec<TranslationCandidate> {
        (0..n)
            .map(|i| TranslationCandidate {
                id: format!("id-{i:04}"),
                title: format!("Title {i}"),
            })
            .collect()
    }

    #[test]
    fn test_partition_preserves_order() {
        let batches = BatchPartitioner::new(100).partition(candidates(250), None);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 100);
        assert_eq!(batches[2].len(), 50);
        assert_eq!(batches[1].number, 2);
        assert_eq!(batches[1].items[0].id, "id-0100");
        assert_eq!(batches[2].ids().last().copied(), Some("id-0249"));
    }

    #[test]
    fn test_partition_respects_cap() {
        let batches = BatchPartitioner::new(10).partition(candidates(55), Some(2));
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].titles()[9], "Title 19");
    }

    #[test]
    fn test_empty_input() {
        assert!(BatchPartitioner::default().partition(vec![], None).is_empty());
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        assert_eq!(BatchPartitioner::new(0).batch_size(), 1);
    }
}
