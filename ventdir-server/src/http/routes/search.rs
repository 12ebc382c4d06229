//! Header search box endpoint

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::Response;
use axum::{routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use ventdir_core::geo::DEFAULT_RADIUS_MILES;
use ventdir_core::SearchInput;

use super::cached;
use crate::db::LocationRepo;
use crate::http::server::AppState;
use crate::search::zip_search_for_api;

const CACHE_SHORT_QUERY: &str = "public, max-age=300, s-maxage=300";
const CACHE_RESULTS: &str = "public, max-age=1800, s-maxage=1800";
const CACHE_ERROR: &str = "public, max-age=60, s-maxage=60";

/// Queries shorter than this return no results
const MIN_QUERY_CHARS: usize = 2;
const TEXT_RESULT_LIMIT: i64 = 10;
const ZIP_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse<T> {
    pub results: Vec<T>,
}

fn results<T: Serialize>(cache_control: &'static str, results: Vec<T>) -> Response {
    cached(cache_control, Json(SearchResponse { results }))
}

/// GET /api/search?q= - zip radius search or free-text match
async fn search(State(state): State<Arc<AppState>>, Query(params): Query<SearchParams>) -> Response {
    let query = params.q.unwrap_or_default();
    if query.chars().count() < MIN_QUERY_CHARS {
        return results::<()>(CACHE_SHORT_QUERY, Vec::new());
    }

    match SearchInput::classify(&query) {
        Some(SearchInput::Zip(zip)) => {
            let rows = zip_search_for_api(
                &state.pool,
                state.geocoder.as_ref(),
                &zip,
                DEFAULT_RADIUS_MILES,
                ZIP_LOOKUP_TIMEOUT,
            )
            .await;
            results(CACHE_RESULTS, rows)
        }
        Some(SearchInput::Place(term)) => {
            match LocationRepo::new(&state.pool).text_search(&term, TEXT_RESULT_LIMIT).await {
                Ok(hits) => results(CACHE_RESULTS, hits),
                Err(e) => {
                    tracing::error!(query = %term, error = %e, "search error");
                    results::<()>(CACHE_ERROR, Vec::new())
                }
            }
        }
        None => results::<()>(CACHE_SHORT_QUERY, Vec::new()),
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/search", get(search))
}
