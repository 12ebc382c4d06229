//! XML sitemaps
//!
//! The index lists the static, cities and location sitemaps; location
//! sitemaps are served in batches of `LOCATION_SITEMAP_BATCH`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Router};
use serde::Deserialize;
use ventdir_core::sitemap::{
    batch_offset, city_url, location_url, static_urls, SitemapIndex, UrlSet,
    LOCATION_SITEMAP_BATCH,
};

use crate::db::StatsRepo;
use crate::http::server::AppState;

const CACHE_INDEX: &str = "public, max-age=21600, s-maxage=86400, stale-while-revalidate=43200";
const CACHE_URLSET: &str = "public, max-age=86400, s-maxage=604800, stale-while-revalidate=86400";
const CACHE_EMPTY: &str = "public, max-age=3600";

#[derive(Debug, Deserialize)]
pub struct BatchParams {
    pub batch: Option<i64>,
}

fn xml(cache_control: &'static str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/xml"),
            (header::CACHE_CONTROL, cache_control),
        ],
        body,
    )
        .into_response()
}

fn failure(what: &str, error: impl std::fmt::Display) -> Response {
    tracing::error!(error = %error, "{what} sitemap generation error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Error generating {what} sitemap"),
    )
        .into_response()
}

/// GET /sitemap.xml
async fn index(State(state): State<Arc<AppState>>) -> Response {
    match StatsRepo::new(&state.pool).visible_count().await {
        Ok(total) => {
            let index = SitemapIndex::for_site(&state.site.site.base_url, total);
            xml(CACHE_INDEX, index.to_xml())
        }
        Err(e) => failure("index", e),
    }
}

/// GET /sitemap-static.xml
async fn static_pages(State(state): State<Arc<AppState>>) -> Response {
    xml(CACHE_URLSET, static_urls(&state.site.site.base_url).to_xml())
}

/// GET /sitemap-cities.xml
async fn cities(State(state): State<Arc<AppState>>) -> Response {
    let base_url = &state.site.site.base_url;
    match StatsRepo::new(&state.pool).distinct_cities().await {
        Ok(rows) if rows.is_empty() => {
            tracing::warn!("cities sitemap: no cities returned");
            xml(CACHE_EMPTY, UrlSet::new().to_xml())
        }
        Ok(rows) => {
            let urls: UrlSet = rows
                .iter()
                .map(|c| city_url(base_url, &c.city_slug, &c.state))
                .collect();
            xml(CACHE_URLSET, urls.to_xml())
        }
        Err(e) => failure("cities", e),
    }
}

/// GET /sitemap-locations.xml?batch=N (1-based, default 1)
async fn locations(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BatchParams>,
) -> Response {
    let base_url = &state.site.site.base_url;
    let Some(offset) = batch_offset(params.batch.unwrap_or(1)) else {
        return xml(CACHE_EMPTY, UrlSet::new().to_xml());
    };
    match StatsRepo::new(&state.pool)
        .sitemap_locations(offset, LOCATION_SITEMAP_BATCH)
        .await
    {
        Ok(rows) => {
            let urls: UrlSet = rows
                .iter()
                .map(|l| location_url(base_url, &l.state, &l.city_slug, &l.slug))
                .collect();
            xml(CACHE_URLSET, urls.to_xml())
        }
        Err(e) => failure("locations", e),
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sitemap.xml", get(index))
        .route("/sitemap-static.xml", get(static_pages))
        .route("/sitemap-cities.xml", get(cities))
        .route("/sitemap-locations.xml", get(locations))
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::{header, StatusCode};
    use tower::ServiceExt;
    use ventdir_core::SiteConfig;

    use crate::http::routes::testing::get;
    use crate::http::test_support::{app, app_with, StubGeocoder};

    #[tokio::test]
    async fn static_sitemap_uses_configured_base_url() {
        let mut site = SiteConfig::default();
        site.site.base_url = "https://vents.example".into();
        let response = app_with(site, StubGeocoder(None))
            .oneshot(get("/sitemap-static.xml"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/xml");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<loc>https://vents.example/states</loc>"));
        assert!(body.contains("<loc>https://vents.example/privacy</loc>"));
    }

    #[tokio::test]
    async fn out_of_range_batch_is_empty_urlset() {
        let uri = format!("/sitemap-locations.xml?batch={}", i64::MAX);
        let response = app().oneshot(get(&uri)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "public, max-age=3600");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.ends_with("</urlset>"));
        assert!(!body.contains("<url>"));
    }

    #[tokio::test]
    async fn database_failure_is_plain_500() {
        let response = app().oneshot(get("/sitemap.xml")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Error generating index sitemap");
    }
}
