//! # Market Record Scopes
//!
//! Query builder for the market catalog table. Every filter is a range or
//! equality predicate evaluated by the store, so the table is never pulled
//! into memory to decide eligibility.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::eligibility::EligibilityCriteria;
use crate::constants::{table, Category};

const CANDIDATE_COLUMNS: &str = "id, title";
const RECORD_COLUMNS: &str =
    "id, title, category, COALESCE(tags, '[]'::jsonb) AS tags, end_date, title_ko";

fn labels(categories: &[Category]) -> Vec<String> {
    categories.iter().map(|c| c.as_str().to_string()).collect()
}

/// Query builder for market record scopes
pub struct RecordScope {
    query: QueryBuilder<'static, Postgres>,
    has_conditions: bool,
}

impl RecordScope {
    fn select(columns: &str) -> Self {
        let query = QueryBuilder::new(format!(
            "SELECT {columns} FROM {}",
            table::MARKET_EVENTS
        ));
        Self {
            query,
            has_conditions: false,
        }
    }

    /// `(id, title)` rows for the translation pipeline
    pub fn candidates() -> Self {
        Self::select(CANDIDATE_COLUMNS)
    }

    /// Full rows
    pub fn records() -> Self {
        Self::select(RECORD_COLUMNS)
    }

    /// `COUNT(*)` over the same predicates
    pub fn counting() -> Self {
        Self::select("COUNT(*)")
    }

    fn add_condition(&mut self, condition: &str) {
        if self.has_conditions {
            self.query.push(" AND ");
        } else {
            self.query.push(" WHERE ");
            self.has_conditions = true;
        }
        self.query.push(condition);
    }

    /// Apply the whole eligibility predicate
    pub fn eligible(mut self, criteria: &EligibilityCriteria) -> Self {
        if !criteria.overwrite {
            self = self.untranslated();
        }
        if let Some(start) = criteria.window.start {
            self = if criteria.window.start_inclusive {
                self.ending_on_or_after(start)
            } else {
                self.ending_after(start)
            };
        }
        if let Some(end) = criteria.window.end {
            self = self.ending_before(end);
        }
        let keep_null = !criteria.drops_null_category();
        if criteria.exclude_null_category && criteria.included_categories.is_none() {
            self = self.categorized();
        }
        if let Some(included) = &criteria.included_categories {
            self = self.in_categories(included);
        }
        if !criteria.excluded_categories.is_empty() {
            self = self.excluding_categories(&criteria.excluded_categories, keep_null);
        }
        self
    }

    /// Scope: untranslated - no translated title yet
    pub fn untranslated(mut self) -> Self {
        self.add_condition(&format!("{} IS NULL", table::TITLE_TRANSLATED));
        self
    }

    pub fn ending_after(mut self, at: DateTime<Utc>) -> Self {
        self.add_condition(&format!("{} > ", table::END_DATE));
        self.query.push_bind(at);
        self
    }

    pub fn ending_on_or_after(mut self, at: DateTime<Utc>) -> Self {
        self.add_condition(&format!("{} >= ", table::END_DATE));
        self.query.push_bind(at);
        self
    }

    pub fn ending_before(mut self, at: DateTime<Utc>) -> Self {
        self.add_condition(&format!("{} < ", table::END_DATE));
        self.query.push_bind(at);
        self
    }

    /// With `keep_null`, NULL categories survive; `NOT IN` alone would drop them
    pub fn excluding_categories(mut self, categories: &[Category], keep_null: bool) -> Self {
        if keep_null {
            self.add_condition(&format!(
                "({col} IS NULL OR NOT ({col} = ANY(",
                col = table::CATEGORY
            ));
            self.query.push_bind(labels(categories));
            self.query.push(")))");
        } else {
            self.add_condition(&format!("NOT ({} = ANY(", table::CATEGORY));
            self.query.push_bind(labels(categories));
            self.query.push("))");
        }
        self
    }

    /// Scope: category is one of `categories`; NULL never matches
    pub fn in_categories(mut self, categories: &[Category]) -> Self {
        self.add_condition(&format!("{} = ANY(", table::CATEGORY));
        self.query.push_bind(labels(categories));
        self.query.push(")");
        self
    }

    pub fn categorized(mut self) -> Self {
        self.add_condition(&format!("{} IS NOT NULL", table::CATEGORY));
        self
    }

    /// Scope: unclassified - category is NULL or the Uncategorized sentinel
    pub fn unclassified(mut self) -> Self {
        self.add_condition(&format!(
            "({col} IS NULL OR {col} = ",
            col = table::CATEGORY
        ));
        self.query.push_bind(Category::Uncategorized.as_str().to_string());
        self.query.push(")");
        self
    }

    /// Keyset pagination cursor
    pub fn after_id(mut self, id: Option<&str>) -> Self {
        if let Some(id) = id {
            self.add_condition(&format!("{} > ", table::ID));
            self.query.push_bind(id.to_string());
        }
        self
    }

    /// Store order is primary-key order
    pub fn order_by_id(mut self) -> Self {
        self.query.push(format!(" ORDER BY {} ASC", table::ID));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.query.push(" LIMIT ");
        self.query.push_bind(limit);
        self
    }

    /// Generated SQL with bind placeholders
    pub fn sql(&self) -> &str {
        self.query.sql()
    }

    pub async fn all<T>(mut self, pool: &PgPool) -> Result<Vec<T>, sqlx::Error>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.query.build_query_as::<T>().fetch_all(pool).await
    }

    pub async fn count(mut self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        self.query.build_query_scalar::<i64>().fetch_one(pool).await
    }
}
