//! Repository implementations for database access
//!
//! Each repository borrows the pool and follows these patterns:
//! - Related rows for a page of locations come from one `= ANY($1)` query
//! - Duplicate submissions are caught by unique constraints (SQLSTATE 23505)
//! - Rows with a site-defined shape are returned as `to_jsonb(...)` values

pub mod claims;
pub mod images;
pub mod locations;
pub mod reviews;
pub mod stats;

pub use claims::{ClaimRepo, FeedbackRepo};
pub use images::{ImageRepo, ImageRow};
pub use locations::{AdminFilter, HoursRow, LocationRecord, LocationRepo, SearchHit};
pub use reviews::{NewReview, ReviewRepo};
pub use stats::{CityRow, SiteStats, SitemapLocation, StatsRepo};

use ventdir_core::VISIBLE_BUSINESS_STATUSES;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {resource} '{id}' already exists")]
    Conflict { resource: &'static str, id: String },
}

impl DbError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Sqlx`.
    pub fn on_insert(err: sqlx::Error, resource: &'static str, id: impl Into<String>) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::Conflict {
                    resource,
                    id: id.into(),
                };
            }
        }
        Self::Sqlx(err)
    }
}

/// `business_status` values bound as a text array.
pub(crate) fn visible_statuses() -> Vec<String> {
    VISIBLE_BUSINESS_STATUSES
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

/// `%term%` for ILIKE, with LIKE metacharacters escaped.
pub(crate) fn ilike_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.trim().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}
