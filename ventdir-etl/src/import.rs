//! SerpAPI Google Maps search to import CSVs

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::Args;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;
use ventdir_core::{slugify, Amenity, BusinessStatus, SiteConfig};

use crate::address::{parse_address, ParsedAddress};
use crate::amenities::extract_amenities;
use crate::csv_out::{save_import, CsvRow, SavedFiles};
use crate::hours::{parse_operating_hours, ImportedHours};
use crate::nominatim::{NominatimClient, REQUEST_INTERVAL};
use crate::serpapi::{LocalResult, SerpApiClient};

pub const DEFAULT_QUERY: &str = "dryer vent cleaning";
const COUNTRY: &str = "United States";
const PAGE_DELAY: Duration = Duration::from_secs(1);

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    /// Search area, e.g. "Indiana, United States" or "Los Angeles, CA"
    #[arg(long)]
    pub location: String,

    #[arg(long, default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Stop after this many locations
    #[arg(long)]
    pub limit: Option<usize>,

    /// Fetch and parse without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Files go to `<output-dir>/<location slug>/`
    #[arg(long, value_name = "DIR", default_value = "serpapi_data")]
    pub output_dir: PathBuf,
}

/// One `locations.csv` row
#[derive(Debug, Clone)]
pub struct ImportedLocation {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub city_slug: String,
    pub website_url: String,
    pub phone: String,
    pub address: ParsedAddress,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: String,
    pub business_type: String,
    pub business_types: String,
    pub business_status: BusinessStatus,
    pub google_rating: Option<f64>,
    pub review_count: Option<u64>,
    pub booking_appointment_url: String,
    pub location_url: String,
    pub google_place_id: String,
    pub google_id: String,
    pub updated_at: DateTime<Utc>,
    pub serp_payload: String,
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl CsvRow for ImportedLocation {
    fn fields(&self) -> Vec<String> {
        let blank = String::new;
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.slug.clone(),
            self.city_slug.clone(),
            self.website_url.clone(),
            self.phone.clone(),
            blank(),
            self.address.street_address.clone(),
            self.address.city.clone(),
            self.address.state.clone(),
            self.address.postal_code.clone(),
            COUNTRY.to_string(),
            opt(self.latitude),
            opt(self.longitude),
            self.description.clone(),
            self.business_type.clone(),
            self.business_types.clone(),
            self.business_status.to_string(),
            opt(self.google_rating),
            opt(self.review_count),
            blank(),
            blank(),
            blank(),
            blank(),
            blank(),
            blank(),
            blank(),
            self.booking_appointment_url.clone(),
            blank(),
            blank(),
            self.location_url.clone(),
            self.google_place_id.clone(),
            self.google_id.clone(),
            blank(),
            self.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.serp_payload.clone(),
        ]
    }
}

/// One `location_hours.csv` row
#[derive(Debug, Clone)]
pub struct HoursRow {
    pub location_id: Uuid,
    pub hours: ImportedHours,
}

impl CsvRow for HoursRow {
    fn fields(&self) -> Vec<String> {
        vec![
            self.location_id.to_string(),
            self.hours.day_of_week.to_string(),
            self.hours.open_time.clone().unwrap_or_default(),
            self.hours.close_time.clone().unwrap_or_default(),
            self.hours.is_closed.to_string(),
        ]
    }
}

/// One `location_amenities.csv` row
#[derive(Debug, Clone)]
pub struct AmenityRow {
    pub location_id: Uuid,
    pub amenity: Amenity,
}

impl CsvRow for AmenityRow {
    fn fields(&self) -> Vec<String> {
        vec![
            self.location_id.to_string(),
            self.amenity.name.clone(),
            self.amenity.category.clone(),
        ]
    }
}

/// Unwrap Google's `/url?q=<target>&...` redirect links.
pub fn extract_real_url(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return String::new();
    };
    if !raw.starts_with("/url?q=") {
        return raw.to_string();
    }
    Url::parse("https://google.com")
        .and_then(|base| base.join(raw))
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(k, _)| k == "q")
                .map(|(_, v)| v.into_owned())
        })
        .filter(|target| !target.is_empty())
        .unwrap_or_else(|| raw.to_string())
}

/// Postgres array literal: `{"a","b"}`
pub fn format_business_types(types: &[String]) -> String {
    if types.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = types
        .iter()
        .map(|t| format!("\"{}\"", t.replace('"', "\\\"")))
        .collect();
    format!("{{{}}}", quoted.join(","))
}

pub fn build_location(result: &LocalResult, address: ParsedAddress, id: Uuid, now: DateTime<Utc>) -> ImportedLocation {
    let types = result.types.as_deref().unwrap_or_default();
    let place_id = result.place_id.clone().unwrap_or_default();
    let gps = result.gps_coordinates;

    ImportedLocation {
        id,
        name: result.title.clone(),
        slug: slugify(&result.title),
        city_slug: slugify(&address.city),
        website_url: extract_real_url(result.website.as_deref()),
        phone: result.phone.clone().unwrap_or_default(),
        latitude: gps.map(|g| g.latitude),
        longitude: gps.map(|g| g.longitude),
        description: result.description.clone().unwrap_or_default(),
        business_type: result
            .business_type
            .clone()
            .or_else(|| types.first().cloned())
            .unwrap_or_default(),
        business_types: format_business_types(types),
        business_status: BusinessStatus::from_open_state(result.open_state.as_deref()),
        google_rating: result.rating,
        review_count: result.reviews,
        booking_appointment_url: result.book_online.clone().unwrap_or_default(),
        location_url: format!("https://www.google.com/maps/place/?q=place_id:{place_id}"),
        google_place_id: place_id,
        google_id: result.provider_id.clone().unwrap_or_default(),
        updated_at: now,
        serp_payload: result.raw.to_string(),
        address,
    }
}

/// Everything collected so far, in CSV row form
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub locations: Vec<ImportedLocation>,
    pub hours: Vec<HoursRow>,
    pub amenities: Vec<AmenityRow>,
}

impl ImportBatch {
    pub fn push(&mut self, result: &LocalResult, address: ParsedAddress, now: DateTime<Utc>) {
        let location = build_location(result, address, Uuid::new_v4(), now);
        let location_id = location.id;

        if let Some(hours) = &result.operating_hours {
            self.hours.extend(
                parse_operating_hours(hours)
                    .into_iter()
                    .map(|hours| HoursRow { location_id, hours }),
            );
        }
        self.amenities.extend(
            extract_amenities(result.extensions.as_ref(), result.service_options.as_ref())
                .into_iter()
                .map(|amenity| AmenityRow {
                    location_id,
                    amenity,
                }),
        );
        self.locations.push(location);
    }

    pub fn save(&self, dir: &std::path::Path) -> Result<SavedFiles> {
        save_import(dir, &self.locations, &self.hours, &self.amenities)
    }
}

#[derive(Debug)]
pub struct ImportSummary {
    pub api_calls: u32,
    pub locations: usize,
    pub hours: usize,
    pub amenities: usize,
    pub output_dir: PathBuf,
    /// `None` on a dry run
    pub saved: Option<SavedFiles>,
}

async fn resolve_address(result: &LocalResult, nominatim: &NominatimClient) -> Option<ParsedAddress> {
    if let Some(parsed) = result.address.as_deref().and_then(parse_address) {
        return Some(parsed);
    }
    let gps = result.gps_coordinates?;
    info!(title = %result.title, "no parseable address, trying reverse geocoding");
    let found = nominatim.reverse(gps.latitude, gps.longitude).await;
    tokio::time::sleep(REQUEST_INTERVAL).await;
    found
}

pub async fn run_import(args: ImportArgs, config: &SiteConfig, quiet: bool) -> Result<ImportSummary> {
    let serpapi = SerpApiClient::from_config(config)?;
    let nominatim = NominatimClient::new(&config.site.user_agent)?;
    let output_dir = args.output_dir.join(slugify(&args.location));

    info!(
        location = %args.location,
        query = %args.query,
        output = %output_dir.display(),
        dry_run = args.dry_run,
        "starting SerpAPI import"
    );

    let pb = crate::spinner(quiet, "{spinner:.green} {pos} locations | {msg}")?;
    let mut batch = ImportBatch::default();
    let mut api_calls = 0;
    let mut page = 1;

    loop {
        pb.set_message(format!("page {page}"));
        let data = serpapi
            .maps_page(&args.query, &args.location, page)
            .await
            .with_context(|| format!("failed to fetch page {page}"))?;
        api_calls += 1;
        info!(page, results = data.local_results.len(), "fetched page");

        if data.local_results.is_empty() {
            break;
        }
        let has_next = data.has_next();
        let mut limit_reached = false;

        for raw in data.local_results {
            let result = match LocalResult::from_value(raw) {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "skipping malformed result");
                    continue;
                }
            };
            let Some(address) = resolve_address(&result, &nominatim).await else {
                warn!(
                    title = %result.title,
                    address = result.address.as_deref().unwrap_or(""),
                    "skipping: could not parse address"
                );
                continue;
            };

            batch.push(&result, address, Utc::now());
            pb.inc(1);

            if args.limit.is_some_and(|limit| batch.locations.len() >= limit) {
                limit_reached = true;
                break;
            }
        }

        if !args.dry_run && !batch.locations.is_empty() {
            batch.save(&output_dir)?;
        }
        if !has_next || limit_reached {
            break;
        }
        page += 1;
        tokio::time::sleep(PAGE_DELAY).await;
    }
    pb.finish_and_clear();

    let saved = if args.dry_run {
        None
    } else {
        Some(batch.save(&output_dir)?)
    };

    Ok(ImportSummary {
        api_calls,
        locations: batch.locations.len(),
        hours: batch.hours.len(),
        amenities: batch.amenities.len(),
        output_dir,
        saved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> LocalResult {
        LocalResult::from_value(json!({
            "title": "Hoosier Vent Pros",
            "place_id": "ChIJabc",
            "provider_id": "/g/11xyz",
            "address": "8 N Grant St, Brownsburg, IN 46112, United States",
            "phone": "(317) 555-0100",
            "website": "/url?q=https://hoosiervents.example/&opi=89978449",
            "type": "Air duct cleaning service",
            "types": ["Air duct cleaning service", "Dryer \"vent\" service"],
            "open_state": "Temporarily closed",
            "rating": 4.8,
            "reviews": 112,
            "gps_coordinates": {"latitude": 39.84, "longitude": -86.39},
            "operating_hours": {"monday": "8 am–5 pm", "sunday": "Closed"},
            "extensions": [{"accessibility": ["wheelchair-accessible-entrance"]}]
        }))
        .unwrap()
    }

    #[test]
    fn redirect_urls_are_unwrapped() {
        assert_eq!(
            extract_real_url(Some("/url?q=https://example.com/page&sa=U")),
            "https://example.com/page"
        );
        assert_eq!(extract_real_url(Some("https://direct.example")), "https://direct.example");
        assert_eq!(extract_real_url(None), "");
    }

    #[test]
    fn business_types_array_literal() {
        let types = vec!["A".to_string(), "B \"x\"".to_string()];
        assert_eq!(format_business_types(&types), r#"{"A","B \"x\""}"#);
        assert_eq!(format_business_types(&[]), "");
    }

    #[test]
    fn location_row_from_result() {
        let result = sample();
        let address = parse_address(result.address.as_deref().unwrap()).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 7, 10, 14, 0, 0).unwrap();
        let location = build_location(&result, address, Uuid::nil(), now);

        assert_eq!(location.slug, "hoosier-vent-pros");
        assert_eq!(location.city_slug, "brownsburg");
        assert_eq!(location.website_url, "https://hoosiervents.example/");
        assert_eq!(location.business_status, BusinessStatus::ClosedTemporarily);
        assert_eq!(
            location.location_url,
            "https://www.google.com/maps/place/?q=place_id:ChIJabc"
        );

        let fields = location.fields();
        assert_eq!(fields.len(), crate::csv_out::LOCATION_COLUMNS.len());
        assert_eq!(fields[9], "Indiana");
        assert_eq!(fields[11], "United States");
        assert_eq!(fields[17], "CLOSED_TEMPORARILY");
        assert_eq!(fields[34], "2024-07-10T14:00:00.000Z");
        assert!(fields[35].contains("\"place_id\":\"ChIJabc\""));
    }

    #[test]
    fn batch_links_hours_and_amenities() {
        let result = sample();
        let address = parse_address(result.address.as_deref().unwrap()).unwrap();
        let mut batch = ImportBatch::default();
        batch.push(&result, address, Utc::now());

        let id = batch.locations[0].id;
        assert_eq!(batch.hours.len(), 2);
        assert!(batch.hours.iter().all(|h| h.location_id == id));
        assert_eq!(batch.hours[0].fields()[4], "true");
        assert_eq!(batch.amenities.len(), 1);
        assert_eq!(batch.amenities[0].fields()[2], "Accessibility");
    }

    #[test]
    fn batch_writes_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let result = sample();
        let address = parse_address(result.address.as_deref().unwrap()).unwrap();
        let mut batch = ImportBatch::default();
        batch.push(&result, address, Utc::now());

        let saved = batch.save(dir.path()).unwrap();
        let text = std::fs::read_to_string(&saved.locations).unwrap();
        assert!(text.starts_with("\"id\",\"name\",\"slug\""));
        assert!(saved.hours.is_some());
        assert!(saved.amenities.is_some());
    }
}
