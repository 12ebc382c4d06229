//! Home page data: featured listings, popular places, counters

use std::sync::Arc;

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::Value;

use crate::db::{ImageRepo, LocationRepo, SiteStats, StatsRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::search::{attach_by_location, attach_images, row_ids};

const FEATURED_LIMIT: i32 = 6;
const POPULAR_LIMIT: i32 = 10;

#[derive(Debug, Serialize)]
pub struct FeaturedResponse {
    pub results: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct PopularResponse {
    pub states: Vec<Value>,
    pub cities: Vec<Value>,
}

/// GET /api/featured - featured listings with hours and images embedded
async fn featured(State(state): State<Arc<AppState>>) -> Result<Json<FeaturedResponse>, ApiError> {
    let repo = LocationRepo::new(&state.pool);
    let rows = repo.featured(FEATURED_LIMIT).await?;
    if rows.is_empty() {
        return Ok(Json(FeaturedResponse { results: rows }));
    }

    let ids = row_ids(&rows);
    let image_repo = ImageRepo::new(&state.pool);
    let (hours, images) = tokio::try_join!(repo.hours_for(&ids), image_repo.for_locations(&ids))?;

    let rows = attach_by_location(rows, "location_hours", hours, |h| h.location_id);
    Ok(Json(FeaturedResponse {
        results: attach_images(rows, images),
    }))
}

/// GET /api/popular
async fn popular(State(state): State<Arc<AppState>>) -> Result<Json<PopularResponse>, ApiError> {
    let repo = StatsRepo::new(&state.pool);
    let (states, cities) = tokio::try_join!(
        repo.popular_states(POPULAR_LIMIT),
        repo.popular_cities(POPULAR_LIMIT),
    )?;
    Ok(Json(PopularResponse { states, cities }))
}

/// GET /api/stats
async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<SiteStats>, ApiError> {
    let stats = StatsRepo::new(&state.pool).site_stats().await?;
    Ok(Json(stats))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/featured", get(featured))
        .route("/api/popular", get(popular))
        .route("/api/stats", get(stats))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::http::routes::testing::{get, send};
    use crate::http::test_support::app;

    #[tokio::test]
    async fn database_errors_are_generic_500s() {
        for uri in ["/api/featured", "/api/popular", "/api/stats"] {
            let (status, _, body) = send(app(), get(uri)).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert_eq!(body["message"], "an internal error occurred");
        }
    }
}
