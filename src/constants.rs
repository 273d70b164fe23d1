//! # System Constants
//!
//! Category labels, default run sizes and the table layout the enrichment
//! engine reads from and writes to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of records submitted to the text-generation service per call
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Upper bound on batch size accepted by configuration validation
pub const MAX_BATCH_SIZE: usize = 100;

/// Default number of parallel workers
pub const DEFAULT_WORKERS: usize = 4;

/// Worker count above which the service is likely to rate-limit us
pub const RECOMMENDED_MAX_WORKERS: usize = 8;

/// Page size used when streaming the eligible set out of the store
pub const FETCH_PAGE_SIZE: usize = 1000;

/// Record store layout
pub mod table {
    pub const MARKET_EVENTS: &str = "poly_events";
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const CATEGORY: &str = "category";
    pub const TAGS: &str = "tags";
    pub const END_DATE: &str = "end_date";
    pub const TITLE_TRANSLATED: &str = "title_ko";
}

/// Fixed category label set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Sports,
    Crypto,
    Politics,
    Finance,
    #[serde(rename = "Pop Culture")]
    PopCulture,
    Science,
    Uncategorized,
}

impl Category {
    /// Every real label, in classifier precedence order
    pub const LABELED: [Category; 6] = [
        Category::Sports,
        Category::Crypto,
        Category::Politics,
        Category::Finance,
        Category::PopCulture,
        Category::Science,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sports => "Sports",
            Category::Crypto => "Crypto",
            Category::Politics => "Politics",
            Category::Finance => "Finance",
            Category::PopCulture => "Pop Culture",
            Category::Science => "Science",
            Category::Uncategorized => "Uncategorized",
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        matches!(self, Category::Uncategorized)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown category label: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Sports" => Ok(Category::Sports),
            "Crypto" => Ok(Category::Crypto),
            "Politics" => Ok(Category::Politics),
            "Finance" => Ok(Category::Finance),
            "Pop Culture" | "PopCulture" => Ok(Category::PopCulture),
            "Science" => Ok(Category::Science),
            "Uncategorized" => Ok(Category::Uncategorized),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_through_labels() {
        for category in Category::LABELED {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
        assert_eq!("Uncategorized".parse::<Category>(), Ok(Category::Uncategorized));
    }

    #[test]
    fn test_pop_culture_uses_spaced_label() {
        assert_eq!(Category::PopCulture.to_string(), "Pop Culture");
        let json = serde_json::to_string(&Category::PopCulture).unwrap();
        assert_eq!(json, "\"Pop Culture\"");
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        assert!("Weather".parse::<Category>().is_err());
    }
}
