//! Visitor review endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::db::{NewReview, ReviewRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ClientIp, ClientUserAgent, ValidUuid};
use crate::http::server::AppState;
use crate::models::review::MAX_REVIEWS_PER_IP_PER_DAY;
use crate::models::{ReviewStats, ReviewSubmission};

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
}

/// POST /api/locations/{id}/reviews
///
/// Reviews are stored as `pending` until moderated.
async fn submit_review(
    ValidUuid(location_id): ValidUuid,
    ClientIp(ip_address): ClientIp,
    ClientUserAgent(user_agent): ClientUserAgent,
    State(state): State<Arc<AppState>>,
    Json(submission): Json<ReviewSubmission>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let review = submission.validate()?;
    let repo = ReviewRepo::new(&state.pool);

    let since = Utc::now() - Duration::hours(24);
    let recent = repo
        .count_from_ip_since(location_id, &ip_address, since)
        .await?;
    if recent >= MAX_REVIEWS_PER_IP_PER_DAY {
        tracing::info!(%location_id, ip = %ip_address, "review rate limit hit");
        return Err(ApiError::RateLimited);
    }

    let review_user_id = match review.email.as_deref() {
        Some(email) => Some(repo.upsert_user(email).await?),
        None => None,
    };

    repo.insert(&NewReview {
        location_id,
        review_user_id,
        recommended: review.recommended,
        comment: review.comment,
        ip_address,
        user_agent,
    })
    .await?;

    tracing::info!(%location_id, "review submitted");
    Ok(Json(SubmitResponse { success: true }))
}

/// GET /api/locations/{id}/reviews
async fn review_stats(
    ValidUuid(location_id): ValidUuid,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReviewStats>, ApiError> {
    let stats = ReviewRepo::new(&state.pool).stats(location_id).await?;
    Ok(Json(stats))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/locations/{id}/reviews",
        get(review_stats).post(submit_review),
    )
}
