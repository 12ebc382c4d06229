//! Zip and coordinate radius search
//!
//! Radius filtering happens in `locations_within_radius`; this module
//! geocodes the zip, calls the function and decorates the rows.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;
use ventdir_core::RadiusQuery;

use crate::db::{DbError, ImageRepo, ImageRow, LocationRepo};
use crate::geocode::Geocoder;

/// Results returned by the header search box for a zip
pub const API_RESULT_LIMIT: usize = 10;

/// Fields removed from zip results served to the search box
const API_STRIPPED_FIELDS: [&str; 3] = ["latitude", "longitude", "distance_miles"];

#[derive(Debug, thiserror::Error)]
pub enum NearbyError {
    #[error("could not find coordinates for zip code")]
    NoCoordinates,

    #[error(transparent)]
    Database(#[from] DbError),
}

/// Geocode `zip` and return listings within `radius_miles`, images attached.
pub async fn nearby_by_zip(
    pool: &PgPool,
    geocoder: &dyn Geocoder,
    zip: &str,
    radius_miles: Option<f64>,
) -> Result<Vec<Value>, NearbyError> {
    let coords = geocoder
        .coordinates_for_zip(zip)
        .await
        .ok_or(NearbyError::NoCoordinates)?;

    let query = RadiusQuery::around(coords).with_radius(radius_miles);
    Ok(nearby_by_coords(pool, &query).await?)
}

/// Radius search from explicit coordinates, images attached.
///
/// An image lookup failure is logged and the rows are returned without images.
pub async fn nearby_by_coords(pool: &PgPool, query: &RadiusQuery) -> Result<Vec<Value>, DbError> {
    let rows = LocationRepo::new(pool).within_radius(query).await?;
    if rows.is_empty() {
        return Ok(rows);
    }

    let ids = row_ids(&rows);
    match ImageRepo::new(pool).for_locations(&ids).await {
        Ok(images) => Ok(attach_images(rows, images)),
        Err(e) => {
            tracing::error!(error = %e, "error fetching location images");
            Ok(rows)
        }
    }
}

/// Zip search for the search box: first ten rows, coordinates and distance
/// removed. Every failure, including a slow geocoder, yields an empty list.
pub async fn zip_search_for_api(
    pool: &PgPool,
    geocoder: &dyn Geocoder,
    zip: &str,
    radius_miles: f64,
    timeout: Duration,
) -> Vec<Value> {
    let coords = match tokio::time::timeout(timeout, geocoder.coordinates_for_zip(zip)).await {
        Ok(Some(coords)) => coords,
        Ok(None) => return Vec::new(),
        Err(_) => {
            tracing::warn!(zip, ?timeout, "zip geocoding timed out");
            return Vec::new();
        }
    };

    let query = RadiusQuery::around(coords).with_radius(Some(radius_miles));
    match LocationRepo::new(pool).within_radius(&query).await {
        Ok(rows) => rows
            .into_iter()
            .take(API_RESULT_LIMIT)
            .map(strip_for_api)
            .collect(),
        Err(e) => {
            tracing::error!(zip, error = %e, "error fetching locations");
            Vec::new()
        }
    }
}

/// `id` of each row that has a parseable one.
pub fn row_ids(rows: &[Value]) -> Vec<Uuid> {
    rows.iter()
        .filter_map(|row| row.get("id")?.as_str()?.parse().ok())
        .collect()
}

/// Add a `location_images` array to each row object.
pub fn attach_images(rows: Vec<Value>, images: Vec<ImageRow>) -> Vec<Value> {
    attach_by_location(rows, "location_images", images, |image| image.location_id)
}

/// Add `field` to each row object: the related items whose location is the row's `id`.
/// Rows without a match get an empty array.
pub fn attach_by_location<T, F>(rows: Vec<Value>, field: &str, related: Vec<T>, location_of: F) -> Vec<Value>
where
    T: Serialize,
    F: Fn(&T) -> Uuid,
{
    let mut by_location: HashMap<Uuid, Vec<Value>> = HashMap::new();
    for item in related {
        let location_id = location_of(&item);
        match serde_json::to_value(item) {
            Ok(v) => by_location.entry(location_id).or_default().push(v),
            Err(e) => tracing::warn!(field, error = %e, "skipping unserializable related row"),
        }
    }

    rows.into_iter()
        .map(|mut row| {
            let items = row
                .get("id")
                .and_then(Value::as_str)
                .and_then(|id| id.parse::<Uuid>().ok())
                .and_then(|id| by_location.get(&id).cloned())
                .unwrap_or_default();
            if let Value::Object(map) = &mut row {
                map.insert(field.to_string(), Value::Array(items));
            }
            row
        })
        .collect()
}

/// Drop coordinates and distance from a result row.
pub fn strip_for_api(row: Value) -> Value {
    match row {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| !API_STRIPPED_FIELDS.contains(&k.as_str()))
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn image(location_id: Uuid, id: &str) -> ImageRow {
        ImageRow {
            location_id,
            cf_image_id: id.into(),
            image_type: "photo".into(),
            is_primary: true,
        }
    }

    #[test]
    fn images_grouped_per_location() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            json!({"id": a.to_string(), "name": "A"}),
            json!({"id": b.to_string(), "name": "B"}),
        ];
        let out = attach_images(rows, vec![image(a, "img-a1"), image(a, "img-a2")]);
        assert_eq!(out[0]["location_images"].as_array().unwrap().len(), 2);
        assert_eq!(out[0]["location_images"][0]["cf_image_id"], "img-a1");
        assert_eq!(out[1]["location_images"], json!([]));
    }

    #[test]
    fn strips_coordinates_only() {
        let row = json!({
            "id": "x", "name": "Vent Pros",
            "latitude": 39.7, "longitude": -86.1, "distance_miles": 2.4
        });
        let stripped = strip_for_api(row);
        assert_eq!(stripped, json!({"id": "x", "name": "Vent Pros"}));
    }

    #[test]
    fn row_ids_skip_bad_values() {
        let id = Uuid::new_v4();
        let rows = vec![json!({"id": id.to_string()}), json!({"id": 7}), json!({})];
        assert_eq!(row_ids(&rows), vec![id]);
    }
}
