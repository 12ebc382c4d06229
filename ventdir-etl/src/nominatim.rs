//! Reverse geocoding through OpenStreetMap Nominatim

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use ventdir_core::states::state_name;

use crate::address::ParsedAddress;

pub const REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Nominatim allows one request per second.
pub const REQUEST_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

fn non_empty(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Service-area address from a reverse lookup body.
///
/// The state comes from `state_code` or `ISO3166-2-lvl4` (`US-IN`), else the
/// spelled-out `state`; the city from the first of city, town, village, county.
pub fn address_from_nominatim(body: &Value) -> Option<ParsedAddress> {
    let address = body.get("address")?;

    let abbreviation = non_empty(address.get("state_code")).or_else(|| {
        non_empty(address.get("ISO3166-2-lvl4")).and_then(|iso| iso.split('-').nth(1))
    });
    let state = match abbreviation {
        Some(abbr) => state_name(&abbr.to_ascii_uppercase()),
        None => non_empty(address.get("state"))?.to_string(),
    };

    let city = ["city", "town", "village", "county"]
        .iter()
        .find_map(|key| non_empty(address.get(*key)))?;
    let postal_code = non_empty(address.get("postcode")).unwrap_or("");

    Some(ParsedAddress::city_only(city, &state, postal_code))
}

pub struct NominatimClient {
    http: Client,
}

impl NominatimClient {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: Client::builder().user_agent(user_agent).build()?,
        })
    }

    /// Failures are logged and yield `None`.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Option<ParsedAddress> {
        let request = self.http.get(REVERSE_URL).query(&[
            ("lat", latitude.to_string()),
            ("lon", longitude.to_string()),
            ("format", "json".to_string()),
            ("addressdetails", "1".to_string()),
        ]);

        let body: Value = match request.send().await {
            Ok(response) if response.status().is_success() => match response.json().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e, "malformed reverse geocoding response");
                    return None;
                }
            },
            Ok(response) => {
                debug!(status = %response.status(), "reverse geocoding refused");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "reverse geocoding failed");
                return None;
            }
        };
        address_from_nominatim(&body)
    }
}
