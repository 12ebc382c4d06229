//! Ownership claims and problem reports

use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;
use crate::models::{ValidClaim, ValidFeedback};

/// Claim repository
pub struct ClaimRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ClaimRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a claim. One claim per location; a second returns `Conflict`.
    pub async fn create(&self, location_id: Uuid, claim: &ValidClaim) -> Result<(), DbError> {
        sqlx::query("INSERT INTO location_claims (location_id, name, email) VALUES ($1, $2, $3)")
            .bind(location_id)
            .bind(&claim.name)
            .bind(&claim.email)
            .execute(self.pool)
            .await
            .map_err(|e| DbError::on_insert(e, "claim", location_id.to_string()))?;

        Ok(())
    }
}

/// Feedback repository
pub struct FeedbackRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> FeedbackRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, feedback: &ValidFeedback) -> Result<(), DbError> {
        sqlx::query(
            "INSERT INTO location_feedbacks (location_id, feedback, email) VALUES ($1, $2, $3)",
        )
        .bind(feedback.location_id)
        .bind(&feedback.feedback)
        .bind(feedback.email.as_deref())
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn second_claim_conflicts() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");
        let (location_id,): (Uuid,) = sqlx::query_as("SELECT id FROM locations LIMIT 1")
            .fetch_one(&pool)
            .await
            .expect("needs at least one location");

        let claim = ValidClaim {
            name: "Test Owner".into(),
            email: "owner@example.com".into(),
        };
        let repo = ClaimRepo::new(&pool);
        let _ = repo.create(location_id, &claim).await;
        let err = repo.create(location_id, &claim).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));
    }
}
