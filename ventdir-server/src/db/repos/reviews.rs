//! Visitor review repository

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;
use crate::models::ReviewStats;

/// Review ready to insert; always stored as `pending`
#[derive(Debug, Clone)]
pub struct NewReview {
    pub location_id: Uuid,
    pub review_user_id: Option<Uuid>,
    pub recommended: Option<bool>,
    pub comment: Option<String>,
    pub ip_address: String,
    pub user_agent: String,
}

/// Review repository
pub struct ReviewRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews for a location from an IP since `since`.
    pub async fn count_from_ip_since(
        &self,
        location_id: Uuid,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM location_reviews
            WHERE location_id = $1 AND ip_address = $2 AND created_at >= $3
            "#,
        )
        .bind(location_id)
        .bind(ip_address)
        .bind(since)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Insert-or-return the reviewer row for an email (idempotent).
    pub async fn upsert_user(&self, email: &str) -> Result<Uuid, DbError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO location_review_users (email) VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id
            "#,
        )
        .bind(email)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    pub async fn insert(&self, review: &NewReview) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO location_reviews
                (location_id, review_user_id, recommended, comment, ip_address, user_agent, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            "#,
        )
        .bind(review.location_id)
        .bind(review.review_user_id)
        .bind(review.recommended)
        .bind(review.comment.as_deref())
        .bind(&review.ip_address)
        .bind(&review.user_agent)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// First row of `location_review_stats(loc_id)`, or zeros.
    pub async fn stats(&self, location_id: Uuid) -> Result<ReviewStats, DbError> {
        let row: Option<(Value,)> = sqlx::query_as(
            "SELECT to_jsonb(s) FROM location_review_stats(loc_id => $1) AS s LIMIT 1",
        )
        .bind(location_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row
            .and_then(|(v,)| match serde_json::from_value(v) {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::warn!(%location_id, error = %e, "unexpected review stats shape");
                    None
                }
            })
            .unwrap_or_default())
    }
}
