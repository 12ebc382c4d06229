//! Single listing page data

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use ventdir_core::hours::{local_time_display, weekly_schedule};
use ventdir_core::images::{hero_image_url, placeholder_gradient};
use ventdir_core::location::group_amenities;
use ventdir_core::{
    business_hours_status, state_timezone, timezone_abbreviation, Amenity, BusinessStatus,
    DayHours, ImageVariant, LocationImage, OpenStatus, WeeklySchedule,
};

use crate::db::{HoursRow, ImageRepo, ImageRow, LocationRecord, LocationRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub location: Value,
    /// Amenity names by category
    pub amenities: BTreeMap<String, Vec<String>>,
    pub hours: Vec<HoursRow>,
    pub images: Vec<ImageRow>,
    pub open_status: OpenStatus,
    pub weekly_schedule: WeeklySchedule,
    /// Abbreviation in effect now (`EST`, `PDT`)
    pub timezone: String,
    pub local_time: String,
    pub hero_image_url: Option<String>,
    /// CSS gradient shown when there is no hero image
    pub placeholder_gradient: String,
}

impl ListingResponse {
    pub fn build(
        record: LocationRecord,
        amenities: &[Amenity],
        hours: Vec<HoursRow>,
        images: Vec<ImageRow>,
        account_hash: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ApiError> {
        let tz = state_timezone(&record.state);
        let day_hours: Vec<DayHours> = hours.iter().map(DayHours::from).collect();
        let status = record
            .business_status
            .as_deref()
            .and_then(|s| s.parse::<BusinessStatus>().ok())
            .unwrap_or_default();

        let typed_images: Vec<LocationImage> =
            images.iter().filter_map(ImageRow::to_location_image).collect();
        let hero = match account_hash {
            Some(hash) => hero_image_url(&typed_images, ImageVariant::Hero, hash).map_err(|e| {
                ApiError::Internal {
                    message: e.to_string(),
                }
            })?,
            None => None,
        };

        Ok(Self {
            open_status: business_hours_status(status, &day_hours, tz, now),
            weekly_schedule: weekly_schedule(&day_hours, tz, now),
            timezone: timezone_abbreviation(&record.state, now),
            local_time: local_time_display(&record.state, now),
            amenities: group_amenities(amenities),
            hero_image_url: hero,
            placeholder_gradient: placeholder_gradient(&record.id.to_string()),
            location: record.row,
            hours,
            images,
        })
    }
}

/// GET /api/listings/{state}/{city}/{slug}
async fn get_listing(
    State(state): State<Arc<AppState>>,
    Path((state_slug, city_slug, slug)): Path<(String, String, String)>,
) -> Result<Json<ListingResponse>, ApiError> {
    let repo = LocationRepo::new(&state.pool);
    let record = repo.find_visible(&state_slug, &city_slug, &slug).await?;

    let ids = [record.id];
    let images = ImageRepo::new(&state.pool);
    let (amenities, hours, images) = tokio::try_join!(
        repo.amenities_for(record.id),
        repo.hours_for(&ids),
        images.for_locations(&ids),
    )?;

    let response = ListingResponse::build(
        record,
        &amenities,
        hours,
        images,
        state.account_hash(),
        Utc::now(),
    )?;
    Ok(Json(response))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/listings/{state}/{city}/{slug}", get(get_listing))
}
