//! # Run Presets
//!
//! The engine has a single code path; the historical pipeline variants
//! (future-ending markets only, a rolling overwrite window, a category-scoped
//! backfill) are expressed as presets that only differ in run configuration.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ConfigurationError;
use crate::constants::{Category, DEFAULT_BATCH_SIZE, DEFAULT_WORKERS};
use crate::scopes::{DateWindow, EligibilityCriteria};

/// Korea Standard Time offset (UTC+9)
const KST_OFFSET_HOURS: i64 = 9;

/// Labels the category backfill preset translates
const TRANSLATABLE_CATEGORIES: &[Category] = &[
    Category::Crypto,
    Category::Politics,
    Category::Finance,
    Category::PopCulture,
    Category::Science,
];

/// Length of the rolling translation window
const ROLLING_WINDOW_DAYS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPreset {
    /// Untranslated markets that have not ended yet
    #[default]
    PendingOpen,
    /// Re-translate everything ending between today (KST) and +60 days; Sports and NULL categories excluded
    RollingWindow,
    /// Untranslated records of the translatable categories across the whole table.
    /// NULL, Sports, Uncategorized and unknown labels are all skipped.
    CategoryBackfill,
    /// Everything comes from explicit run settings
    Custom,
}

impl RunPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPreset::PendingOpen => "pending_open",
            RunPreset::RollingWindow => "rolling_window",
            RunPreset::CategoryBackfill => "category_backfill",
            RunPreset::Custom => "custom",
        }
    }

    /// Baseline configuration before explicit settings are applied
    pub fn baseline(&self, now: DateTime<Utc>) -> (EligibilityCriteria, usize) {
        match self {
            RunPreset::PendingOpen => (
                EligibilityCriteria {
                    overwrite: false,
                    window: DateWindow::ending_after(now),
                    excluded_categories: Vec::new(),
                    included_categories: None,
                    exclude_null_category: false,
                },
                DEFAULT_WORKERS,
            ),
            RunPreset::RollingWindow => {
                let start = start_of_kst_day(now);
                (
                    EligibilityCriteria {
                        overwrite: true,
                        window: DateWindow::between(start, start + Duration::days(ROLLING_WINDOW_DAYS)),
                        excluded_categories: vec![Category::Sports],
                        included_categories: None,
                        exclude_null_category: true,
                    },
                    1,
                )
            }
            RunPreset::CategoryBackfill => (
                EligibilityCriteria {
                    overwrite: false,
                    window: DateWindow::unbounded(),
                    excluded_categories: Vec::new(),
                    included_categories: Some(TRANSLATABLE_CATEGORIES.to_vec()),
                    exclude_null_category: false,
                },
                8,
            ),
            RunPreset::Custom => (
                EligibilityCriteria {
                    overwrite: false,
                    window: DateWindow::unbounded(),
                    excluded_categories: Vec::new(),
                    included_categories: None,
                    exclude_null_category: false,
                },
                DEFAULT_WORKERS,
            ),
        }
    }
}

impl fmt::Display for RunPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunPreset {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pending_open" => Ok(RunPreset::PendingOpen),
            "rolling_window" => Ok(RunPreset::RollingWindow),
            "category_backfill" => Ok(RunPreset::CategoryBackfill),
            "custom" => Ok(RunPreset::Custom),
            _ => Err(ConfigurationError::UnknownPreset(s.to_string())),
        }
    }
}

/// Midnight of the current KST calendar day, expressed in UTC
pub fn start_of_kst_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let offset = Duration::hours(KST_OFFSET_HOURS);
    let kst_midnight = (now + offset).date_naive().and_time(NaiveTime::MIN);
    kst_midnight.and_utc() - offset
}

/// Run parameters as written in configuration; unset fields fall back to the preset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunSettings {
    #[serde(default)]
    pub preset: RunPreset,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub overwrite: Option<bool>,
    #[serde(default)]
    pub window_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub window_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub excluded_categories: Option<Vec<Category>>,
    /// Restrict the run to these labels
    #[serde(default)]
    pub included_categories: Option<Vec<Category>>,
    /// Caps the number of dispatched batches (dry runs)
    #[serde(default)]
    pub max_batches: Option<usize>,
    /// Run the category backfill before translating
    #[serde(default = "default_backfill_categories")]
    pub backfill_categories: bool,
}

fn default_backfill_categories() -> bool {
    true
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            preset: RunPreset::default(),
            workers: None,
            batch_size: DEFAULT_BATCH_SIZE,
            overwrite: None,
            window_start: None,
            window_end: None,
            excluded_categories: None,
            included_categories: None,
            max_batches: None,
            backfill_categories: true,
        }
    }
}

impl RunSettings {
    /// Resolve the preset at `now` and apply explicit overrides
    pub fn resolve(&self, now: DateTime<Utc>) -> RunConfig {
        let (mut criteria, default_workers) = self.preset.baseline(now);

        if let Some(overwrite) = self.overwrite {
            criteria.overwrite = overwrite;
        }
        if self.window_start.is_some() || self.window_end.is_some() {
            criteria.window = DateWindow {
                start: self.window_start,
                start_inclusive: true,
                end: self.window_end,
            };
        }
        if let Some(excluded) = &self.excluded_categories {
            criteria.excluded_categories = excluded.clone();
        }
        if let Some(included) = &self.included_categories {
            criteria.included_categories = Some(included.clone());
        }

        RunConfig {
            preset: self.preset,
            workers: self.workers.unwrap_or(default_workers).max(1),
            batch_size: self.batch_size,
            max_batches: self.max_batches,
            criteria,
        }
    }
}

/// Fully resolved parameters for one engine run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub preset: RunPreset,
    pub workers: usize,
    pub batch_size: usize,
    pub max_batches: Option<usize>,
    pub criteria: EligibilityCriteria,
}

impl RunConfig {
    /// Number of batches the run will dispatch for `eligible` records
    pub fn planned_batches(&self, eligible: usize) -> usize {
        let batch_size = self.batch_size.max(1);
        let needed = eligible.div_ceil(batch_size);
        match self.max_batches {
            Some(cap) => needed.min(cap),
            None => needed,
        }
    }

    /// Upper bound on records fetched for dispatch
    pub fn record_limit(&self) -> Option<usize> {
        self.max_batches.map(|cap| cap * self.batch_size)
    }
}
