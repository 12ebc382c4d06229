//! SerpAPI Google Maps client

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;
use ventdir_core::SiteConfig;

pub const SEARCH_URL: &str = "https://serpapi.com/search.json";

/// Results per Google Maps page
pub const PAGE_SIZE: u32 = 20;

/// Metro-area zoom
pub const ZOOM_LEVEL: &str = "11";

const NO_RESULTS: &str = "Google hasn't returned any results for this query";

#[derive(Debug, thiserror::Error)]
pub enum SerpApiError {
    #[error("SerpAPI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SerpAPI request failed: HTTP {0}")]
    Status(u16),

    #[error("SerpAPI error: {0}")]
    Api(String),

    #[error("invalid photos link: {0}")]
    InvalidLink(#[from] url::ParseError),
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One Google Maps result. `raw` keeps the full object for `serp_payload`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalResult {
    #[serde(default)]
    pub title: String,
    pub place_id: Option<String>,
    pub provider_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub business_type: Option<String>,
    pub types: Option<Vec<String>>,
    pub open_state: Option<String>,
    pub rating: Option<f64>,
    pub reviews: Option<u64>,
    pub book_online: Option<String>,
    pub gps_coordinates: Option<GpsCoordinates>,
    pub operating_hours: Option<Map<String, Value>>,
    pub extensions: Option<Value>,
    pub service_options: Option<Value>,
    pub photos_link: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

impl LocalResult {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let mut result: Self = serde_json::from_value(value.clone())?;
        result.raw = value;
        Ok(result)
    }
}

/// One search page; results stay raw until [`LocalResult::from_value`].
#[derive(Debug, Default, Deserialize)]
pub struct MapsPage {
    #[serde(default)]
    pub local_results: Vec<Value>,
    #[serde(default)]
    pub serpapi_pagination: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl MapsPage {
    pub fn has_next(&self) -> bool {
        self.serpapi_pagination
            .as_ref()
            .and_then(|p| p.get("next"))
            .is_some()
    }

    /// A "no results" error is an empty page; any other error fails.
    fn into_checked(mut self, page: u32) -> Result<Self, SerpApiError> {
        match self.error.take() {
            None => Ok(self),
            Some(err) if err.contains(NO_RESULTS) => {
                warn!(page, "SerpAPI returned no results for this page");
                Ok(Self::default())
            }
            Some(err) => Err(SerpApiError::Api(err)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    pub image: Option<String>,
    pub thumbnail: Option<String>,
}

impl Photo {
    /// Full-size image, falling back to the thumbnail.
    pub fn best_url(&self) -> Option<&str> {
        self.image.as_deref().or(self.thumbnail.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct PhotosResponse {
    #[serde(default)]
    photos: Vec<Photo>,
    #[serde(default)]
    error: Option<String>,
}

/// Query parameters for one Google Maps search page (1-based).
pub fn search_params(query: &str, location: &str, page: u32, api_key: &str) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("engine", "google_maps".to_string()),
        ("type", "search".to_string()),
        ("q", query.to_string()),
        ("location", location.to_string()),
        ("z", ZOOM_LEVEL.to_string()),
        ("gl", "us".to_string()),
        ("hl", "en".to_string()),
        ("api_key", api_key.to_string()),
    ];
    let start = page.saturating_sub(1) * PAGE_SIZE;
    if start > 0 {
        params.push(("start", start.to_string()));
    }
    params
}

/// `photos_link` from a search result with our key set on it.
pub fn photos_url(link: &str, api_key: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(link)?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "api_key")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("api_key", api_key);
    Ok(url)
}

pub struct SerpApiClient {
    http: Client,
    api_key: String,
}

impl SerpApiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SerpApiError> {
        Ok(Self {
            http: Client::builder().build()?,
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &SiteConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.serpapi_key()?)?)
    }

    pub async fn maps_page(&self, query: &str, location: &str, page: u32) -> Result<MapsPage, SerpApiError> {
        debug!(page, "fetching SerpAPI page");
        let response = self
            .http
            .get(SEARCH_URL)
            .query(&search_params(query, location, page, &self.api_key))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SerpApiError::Status(response.status().as_u16()));
        }
        let body: MapsPage = response.json().await?;
        body.into_checked(page)
    }

    pub async fn photos(&self, photos_link: &str) -> Result<Vec<Photo>, SerpApiError> {
        let url = photos_url(photos_link, &self.api_key)?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SerpApiError::Status(response.status().as_u16()));
        }
        let body: PhotosResponse = response.json().await?;
        match body.error {
            Some(err) => Err(SerpApiError::Api(err)),
            None => Ok(body.photos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_page_has_no_start() {
        let params = search_params("dryer vent cleaning", "Indiana, United States", 1, "k");
        assert!(params.iter().all(|(k, _)| *k != "start"));
        assert!(params.contains(&("z", "11".to_string())));
        assert!(params.contains(&("engine", "google_maps".to_string())));
    }

    #[test]
    fn later_pages_offset_by_twenty() {
        let params = search_params("q", "l", 3, "k");
        assert!(params.contains(&("start", "40".to_string())));
    }

    #[test]
    fn no_results_error_is_an_empty_page() {
        let page: MapsPage = serde_json::from_value(json!({
            "error": "Google hasn't returned any results for this query."
        }))
        .unwrap();
        let page = page.into_checked(2).unwrap();
        assert!(page.local_results.is_empty());
        assert!(!page.has_next());

        let failing: MapsPage = serde_json::from_value(json!({"error": "Invalid API key."})).unwrap();
        assert!(matches!(failing.into_checked(1), Err(SerpApiError::Api(_))));
    }

    #[test]
    fn photos_link_gets_api_key() {
        let url = photos_url(
            "https://serpapi.com/search.json?engine=google_maps_photos&data_id=0x1&api_key=old",
            "new",
        )
        .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("engine".into(), "google_maps_photos".into())));
        assert!(pairs.contains(&("api_key".into(), "new".into())));
        assert_eq!(pairs.iter().filter(|(k, _)| k == "api_key").count(), 1);
    }

    #[test]
    fn local_result_keeps_raw_payload() {
        let raw = json!({
            "title": "Vent Pros",
            "place_id": "ChIJ123",
            "type": "Air duct cleaning service",
            "gps_coordinates": {"latitude": 39.84, "longitude": -86.39},
            "extra": [1, 2]
        });
        let result = LocalResult::from_value(raw.clone()).unwrap();
        assert_eq!(result.title, "Vent Pros");
        assert_eq!(result.business_type.as_deref(), Some("Air duct cleaning service"));
        assert_eq!(result.raw, raw);
    }
}
