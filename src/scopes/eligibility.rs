//! # Eligibility Criteria
//!
//! A record is eligible for translation iff
//! `(overwrite OR title_translated IS NULL) AND end_date in window AND category NOT IN excluded`.
//! A NULL category is never in the excluded set; it is only dropped when the
//! criteria name an include-list or ask for a non-NULL category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::Category;
use crate::models::MarketRecord;

/// `end_date` window; start bound configurable, end bound always exclusive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Option<DateTime<Utc>>,
    pub start_inclusive: bool,
    pub end: Option<DateTime<Utc>>,
}

impl DateWindow {
    /// Full-table mode
    pub fn unbounded() -> Self {
        Self {
            start: None,
            start_inclusive: true,
            end: None,
        }
    }

    /// `end_date > at`
    pub fn ending_after(at: DateTime<Utc>) -> Self {
        Self {
            start: Some(at),
            start_inclusive: false,
            end: None,
        }
    }

    /// `start <= end_date < end`
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            start_inclusive: true,
            end: Some(end),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// A record without an end date only falls inside an unbounded window
    pub fn contains(&self, end_date: Option<DateTime<Utc>>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(end_date) = end_date else {
            return false;
        };
        let after_start = match self.start {
            Some(start) if self.start_inclusive => end_date >= start,
            Some(start) => end_date > start,
            None => true,
        };
        let before_end = self.end.map_or(true, |end| end_date < end);
        after_start && before_end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityCriteria {
    /// Re-translate records that already carry a translation
    pub overwrite: bool,
    pub window: DateWindow,
    pub excluded_categories: Vec<Category>,
    /// Only these labels are eligible; NULL and unknown labels are not
    #[serde(default)]
    pub included_categories: Option<Vec<Category>>,
    #[serde(default)]
    pub exclude_null_category: bool,
}

impl EligibilityCriteria {
    pub fn matches(&self, record: &MarketRecord) -> bool {
        let needs_translation = self.overwrite || record.title_translated.is_none();
        needs_translation
            && self.window.contains(record.end_date)
            && self.allows_category(record.category.as_deref())
    }

    pub fn allows_category(&self, category: Option<&str>) -> bool {
        let Some(label) = category else {
            return !self.exclude_null_category && self.included_categories.is_none();
        };
        let included = self
            .included_categories
            .as_ref()
            .map_or(true, |included| included.iter().any(|c| c.as_str() == label));
        included && !self.excluded_categories.iter().any(|c| c.as_str() == label)
    }

    /// Whether the store-side predicate must drop NULL categories
    pub fn drops_null_category(&self) -> bool {
        self.exclude_null_category || self.included_categories.is_some()
    }

    /// Excluded labels as stored in the category column
    pub fn excluded_labels(&self) -> Vec<String> {
        self.excluded_categories
            .iter()
            .map(|c| c.as_str().to_string())
            .collect()
    }

    pub fn included_labels(&self) -> Option<Vec<String>> {
        self.included_categories
            .as_ref()
            .map(|included| included.iter().map(|c| c.as_str().to_string()).collect())
    }
}
