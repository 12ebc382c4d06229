//! Coordinates, great-circle distance and search-input classification

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Radius used when a search does not specify one.
pub const DEFAULT_RADIUS_MILES: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components finite and inside the valid lat/lng ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    pub fn distance_miles(&self, other: &Coordinates) -> f64 {
        haversine_miles(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Haversine distance between two points, in miles.
pub fn haversine_miles(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_MILES * c
}

/// Five ASCII digits, nothing else.
pub fn is_zip_code(input: &str) -> bool {
    input.len() == 5 && input.bytes().all(|b| b.is_ascii_digit())
}

/// Arguments of the `locations_within_radius` stored function.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadiusQuery {
    pub search_lat: f64,
    pub search_lng: f64,
    pub radius_miles: f64,
    pub exclude_ids: Vec<Uuid>,
}

impl RadiusQuery {
    pub fn around(center: Coordinates) -> Self {
        Self {
            search_lat: center.latitude,
            search_lng: center.longitude,
            radius_miles: DEFAULT_RADIUS_MILES,
            exclude_ids: Vec::new(),
        }
    }

    /// Non-positive or non-finite radii fall back to the default.
    pub fn with_radius(mut self, radius_miles: Option<f64>) -> Self {
        if let Some(r) = radius_miles.filter(|r| r.is_finite() && *r > 0.0) {
            self.radius_miles = r;
        }
        self
    }

    pub fn excluding(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.exclude_ids.extend(ids);
        self
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new(self.search_lat, self.search_lng)
    }
}

/// Parsed form of the free-text search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchInput {
    Zip(String),
    /// City or city/state text. Matched against city names by the caller.
    Place(String),
}

impl SearchInput {
    /// `None` for empty input.
    pub fn classify(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else if is_zip_code(trimmed) {
            Some(Self::Zip(trimmed.to_string()))
        } else {
            Some(Self::Place(trimmed.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert_eq!(haversine_miles(39.77, -86.16, 39.77, -86.16), 0.0);
    }

    #[test]
    fn indianapolis_to_chicago() {
        let indy = Coordinates::new(39.7684, -86.1581);
        let chicago = Coordinates::new(41.8781, -87.6298);
        let d = indy.distance_miles(&chicago);
        assert!((d - 165.0).abs() < 3.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = haversine_miles(40.7128, -74.0060, 34.0522, -118.2437);
        let b = haversine_miles(34.0522, -118.2437, 40.7128, -74.0060);
        assert!((a - b).abs() < 1e-9);
        assert!((a - 2445.0).abs() < 15.0, "got {a}");
    }

    #[test]
    fn zip_detection() {
        assert!(is_zip_code("46204"));
        assert!(!is_zip_code("4620"));
        assert!(!is_zip_code("46204-1234"));
        assert!(!is_zip_code("4620a"));
    }

    #[test]
    fn classify_search_input() {
        assert_eq!(SearchInput::classify("  46204 "), Some(SearchInput::Zip("46204".into())));
        assert_eq!(
            SearchInput::classify("Carmel, IN"),
            Some(SearchInput::Place("Carmel, IN".into()))
        );
        assert_eq!(SearchInput::classify("   "), None);
    }

    #[test]
    fn radius_query_carries_inputs() {
        let id = Uuid::new_v4();
        let q = RadiusQuery::around(Coordinates::new(39.7684, -86.1581))
            .with_radius(Some(10.0))
            .excluding([id]);
        assert_eq!(q.search_lat, 39.7684);
        assert_eq!(q.search_lng, -86.1581);
        assert_eq!(q.radius_miles, 10.0);
        assert_eq!(q.exclude_ids, vec![id]);
    }

    #[test]
    fn radius_defaults_to_25() {
        let c = Coordinates::new(1.0, 2.0);
        assert_eq!(RadiusQuery::around(c).radius_miles, DEFAULT_RADIUS_MILES);
        assert_eq!(RadiusQuery::around(c).with_radius(Some(-3.0)).radius_miles, 25.0);
        assert_eq!(RadiusQuery::around(c).with_radius(None).radius_miles, 25.0);
    }

    #[test]
    fn coordinate_validation() {
        assert!(Coordinates::new(39.7, -86.1).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }
}
