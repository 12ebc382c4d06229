//! Zip code to coordinates lookup
//!
//! Geocoding failures are never errors for callers: a miss, a non-2xx
//! response or a malformed body all come back as `None` and are logged.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use ventdir_core::config::GeocoderSection;
use ventdir_core::Coordinates;

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn coordinates_for_zip(&self, zip: &str) -> Option<Coordinates>;
}

/// Client for `api.zippopotam.us`
#[derive(Debug, Clone)]
pub struct ZippopotamGeocoder {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ZipResponse {
    places: Vec<ZipPlace>,
}

#[derive(Debug, Deserialize)]
struct ZipPlace {
    latitude: String,
    longitude: String,
}

impl ZippopotamGeocoder {
    pub fn new(settings: &GeocoderSection, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn lookup(&self, zip: &str) -> Result<Option<Coordinates>, reqwest::Error> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, zip))
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(zip, status = %response.status(), "zip lookup failed");
            return Ok(None);
        }

        let body: ZipResponse = response.json().await?;
        Ok(first_place(&body))
    }
}

fn first_place(body: &ZipResponse) -> Option<Coordinates> {
    let place = body.places.first()?;
    let coords = Coordinates::new(
        place.latitude.trim().parse().ok()?,
        place.longitude.trim().parse().ok()?,
    );
    coords.is_valid().then_some(coords)
}

#[async_trait]
impl Geocoder for ZippopotamGeocoder {
    async fn coordinates_for_zip(&self, zip: &str) -> Option<Coordinates> {
        match self.lookup(zip).await {
            Ok(coords) => {
                if coords.is_none() {
                    tracing::debug!(zip, "no coordinates for zip");
                }
                coords
            }
            Err(e) => {
                tracing::error!(zip, error = %e, "error getting coordinates from zip");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<Coordinates> {
        let body: ZipResponse = serde_json::from_str(json).ok()?;
        first_place(&body)
    }

    #[test]
    fn reads_first_place() {
        let coords = parse(
            r#"{"post code":"46204","country":"United States","places":[
                {"place name":"Indianapolis","longitude":"-86.1573","latitude":"39.7713","state":"Indiana"},
                {"place name":"Elsewhere","longitude":"0","latitude":"0"}]}"#,
        )
        .unwrap();
        assert_eq!(coords, Coordinates::new(39.7713, -86.1573));
    }

    #[test]
    fn empty_or_malformed_places_are_none() {
        assert_eq!(parse(r#"{"places":[]}"#), None);
        assert_eq!(parse(r#"{"places":[{"latitude":"north","longitude":"1"}]}"#), None);
        assert_eq!(parse(r#"{}"#), None);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let settings = GeocoderSection {
            base_url: "https://api.zippopotam.us/us/".into(),
            timeout_secs: 5,
        };
        let geocoder = ZippopotamGeocoder::new(&settings, "test-agent").unwrap();
        assert_eq!(geocoder.base_url, "https://api.zippopotam.us/us");
    }
}
