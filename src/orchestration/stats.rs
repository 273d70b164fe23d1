//! Run-wide counters shared by every dispatcher worker.
//!
//! One mutex guards the whole snapshot and is held only for the increment
//! itself, never across an await point.

use parking_lot::Mutex;
use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Records actually updated in the store
    pub translated: usize,
    pub batches_completed: usize,
    pub batches_failed: usize,
    /// Positions filled with the source title
    pub alignment_shortfalls: usize,
    /// Records whose update exhausted its retries
    pub records_failed: usize,
}

#[derive(Debug)]
pub struct RunStats {
    counters: Mutex<StatsSnapshot>,
    started_at: Instant,
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(StatsSnapshot::default()),
            started_at: Instant::now(),
        }
    }

    pub fn record_batch_completed(&self, translated: usize, shortfall: usize, records_failed: usize) {
        let mut counters = self.counters.lock();
        counters.translated += translated;
        counters.batches_completed += 1;
        counters.alignment_shortfalls += shortfall;
        counters.records_failed += records_failed;
    }

    pub fn record_batch_failed(&self) {
        self.counters.lock().batches_failed += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        *self.counters.lock()
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Translated records per minute since the stats were created
    pub fn throughput_per_minute(&self) -> f64 {
        let minutes = self.elapsed().as_secs_f64() / 60.0;
        if minutes <= f64::EPSILON {
            return 0.0;
        }
        self.snapshot().translated as f64 / minutes
    }
}
