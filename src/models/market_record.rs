use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::constants::Category;

/// One catalog entry
/// Maps to the `poly_events` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MarketRecord {
    pub id: String,
    pub title: String,
    pub category: Option<String>,
    /// Stored as a JSON array; queries coalesce NULL to `[]`
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub end_date: Option<DateTime<Utc>>,
    #[sqlx(rename = "title_ko")]
    #[serde(rename = "title_ko")]
    pub title_translated: Option<String>,
}

impl MarketRecord {
    /// Parsed category label; unknown free-text labels are kept as `None`
    pub fn category_label(&self) -> Option<Category> {
        self.category.as_deref().and_then(|c| c.parse().ok())
    }

    /// Null or the Uncategorized sentinel
    pub fn needs_classification(&self) -> bool {
        match self.category.as_deref() {
            None => true,
            Some(label) => label == Category::Uncategorized.as_str(),
        }
    }

    pub fn candidate(&self) -> TranslationCandidate {
        TranslationCandidate {
            id: self.id.clone(),
            title: self.title.clone(),
        }
    }
}

/// The (id, title) projection the translation pipeline works on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TranslationCandidate {
    pub id: String,
    pub title: String,
}
