//! Moderation listing for the admin dashboard

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Response;
use axum::{routing::get, Json, Router};
use serde::Deserialize;
use ventdir_core::ReviewStatus;

use super::cached;
use crate::db::{AdminFilter, LocationRepo};
use crate::http::error::ApiError;
use crate::http::extractors::AdminAuth;
use crate::http::server::AppState;
use crate::models::{Paginated, Pagination, PaginationParams, ValidationError};

const CACHE_ADMIN: &str = "private, max-age=60, s-maxage=60";

/// Filter half of the query string; paging is read separately.
#[derive(Debug, Default, Deserialize)]
pub struct AdminListParams {
    pub status: Option<String>,
    pub search: Option<String>,
    pub only24: Option<String>,
}

impl AdminListParams {
    fn into_filter(self, page: Pagination) -> Result<AdminFilter, ValidationError> {
        let review_status = match self.status.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<ReviewStatus>()
                .map_err(|_| ValidationError::InvalidVariant {
                    field: "status",
                    value: raw.to_string(),
                })?,
            None => ReviewStatus::Pending,
        };

        Ok(AdminFilter {
            review_status: review_status.as_str().to_string(),
            search: self.search,
            only_24_hours: self.only24.as_deref() == Some("true"),
            limit: page.limit(),
            offset: page.offset(),
        })
    }
}

/// GET /api/admin/locations?page=&pageSize=&status=&search=&only24=
async fn list_locations(
    _auth: AdminAuth,
    State(state): State<Arc<AppState>>,
    Query(paging): Query<PaginationParams>,
    Query(params): Query<AdminListParams>,
) -> Result<Response, ApiError> {
    let filter = params.into_filter(Pagination::from(&paging))?;
    let (data, count) = LocationRepo::new(&state.pool).admin_list(&filter).await?;

    Ok(cached(CACHE_ADMIN, Json(Paginated { data, count })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/admin/locations", get(list_locations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use ventdir_core::SiteConfig;

    use crate::http::routes::testing::{get, send};
    use crate::http::test_support::{app, app_with, StubGeocoder};

    fn site_with_token(token: &str) -> SiteConfig {
        let mut site = SiteConfig::default();
        site.server.admin_token = Some(token.to_string());
        site
    }

    fn authed(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn refused_without_configured_token() {
        let (status, _, body) = send(app(), authed("/api/admin/locations", "anything")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");
    }

    #[tokio::test]
    async fn refused_with_wrong_or_missing_token() {
        let app = app_with(site_with_token("s3cret"), StubGeocoder(None));
        let (status, _, _) = send(app.clone(), authed("/api/admin/locations", "guess")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _, _) = send(app, get("/api/admin/locations")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_status_is_400() {
        let app = app_with(site_with_token("s3cret"), StubGeocoder(None));
        let (status, _, body) =
            send(app, authed("/api/admin/locations?status=deleted", "s3cret")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[test]
    fn filter_defaults() {
        let filter = AdminListParams::default()
            .into_filter(Pagination::default())
            .unwrap();
        assert_eq!(filter.review_status, "pending");
        assert!(!filter.only_24_hours);
        assert_eq!((filter.limit, filter.offset), (10, 0));
    }

    #[test]
    fn filter_from_query_values() {
        let params = AdminListParams {
            status: Some("approved".into()),
            search: Some("vent".into()),
            only24: Some("true".into()),
        };
        let filter = params.into_filter(Pagination::new(2, 500)).unwrap();
        assert_eq!(filter.review_status, "approved");
        assert!(filter.only_24_hours);
        assert_eq!((filter.limit, filter.offset), (50, 100));
    }
}
