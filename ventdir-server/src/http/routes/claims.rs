//! Listing ownership claims

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::post, Json, Router};

use super::reviews::SubmitResponse;
use crate::db::{ClaimRepo, LocationRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidUuid;
use crate::http::server::AppState;
use crate::models::ClaimRequest;

/// POST /api/locations/{id}/claims
///
/// One claim per listing; a second attempt is a 409. A recorded claim
/// marks the listing `claimed_status = 'pending'`.
async fn create_claim(
    ValidUuid(location_id): ValidUuid,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClaimRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let claim = req.validate()?;

    ClaimRepo::new(&state.pool).create(location_id, &claim).await?;
    LocationRepo::new(&state.pool)
        .mark_claim_pending(location_id)
        .await?;

    tracing::info!(%location_id, "listing claim recorded");
    Ok((StatusCode::CREATED, Json(SubmitResponse { success: true })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/locations/{id}/claims", post(create_claim))
}
