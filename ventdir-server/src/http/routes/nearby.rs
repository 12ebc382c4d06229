//! Radius search endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use ventdir_core::{is_zip_code, Coordinates, RadiusQuery};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::ValidationError;
use crate::search;

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub zip: Option<String>,
    pub radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CoordsParams {
    pub lat: f64,
    pub lng: f64,
    pub radius: Option<f64>,
    /// Comma-separated location ids to leave out
    pub exclude: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub results: Vec<Value>,
}

/// GET /api/nearby?zip=&radius=
async fn nearby_by_zip(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<NearbyResponse>, ApiError> {
    let zip = params
        .zip
        .as_deref()
        .map(str::trim)
        .filter(|z| is_zip_code(z))
        .ok_or(ValidationError::InvalidFormat {
            field: "zip",
            reason: "Invalid zip code",
        })?;

    let results =
        search::nearby_by_zip(&state.pool, state.geocoder.as_ref(), zip, params.radius).await?;
    Ok(Json(NearbyResponse { results }))
}

/// GET /api/nearby/coords?lat=&lng=&radius=&exclude=
async fn nearby_by_coords(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CoordsParams>,
) -> Result<Json<NearbyResponse>, ApiError> {
    let center = Coordinates::new(params.lat, params.lng);
    if !center.is_valid() {
        return Err(ValidationError::InvalidFormat {
            field: "lat/lng",
            reason: "coordinates out of range",
        }
        .into());
    }

    let exclude = parse_exclude(params.exclude.as_deref())?;
    let query = RadiusQuery::around(center)
        .with_radius(params.radius)
        .excluding(exclude);

    let results = search::nearby_by_coords(&state.pool, &query).await?;
    Ok(Json(NearbyResponse { results }))
}

fn parse_exclude(raw: Option<&str>) -> Result<Vec<Uuid>, ValidationError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Uuid::parse_str(s).map_err(|_| ValidationError::InvalidFormat {
                field: "exclude",
                reason: "invalid UUID format",
            })
        })
        .collect()
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/nearby", get(nearby_by_zip))
        .route("/api/nearby/coords", get(nearby_by_coords))
}
