//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost and the site origin by default)
//! - Request tracing
//! - Graceful shutdown
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::Router;
    use sqlx::postgres::PgPoolOptions;
    use ventdir_core::{Coordinates, SiteConfig};

    use super::{build_router, AppState, ServerConfig};
    use crate::geocode::Geocoder;

    /// Geocoder returning a fixed answer
    pub struct StubGeocoder(pub Option<Coordinates>);

    #[async_trait]
    impl Geocoder for StubGeocoder {
        async fn coordinates_for_zip(&self, _zip: &str) -> Option<Coordinates> {
            self.0
        }
    }

    /// Router over a pool that never connects; only for paths that stop
    /// before the database.
    pub fn app_with(site: SiteConfig, geocoder: StubGeocoder) -> Router {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(200))
            .connect_lazy("postgres://localhost:1/ventdir_test")
            .expect("lazy pool");
        build_router(
            AppState::new(pool, site, Arc::new(geocoder)),
            &ServerConfig::default(),
        )
    }

    pub fn app() -> Router {
        app_with(SiteConfig::default(), StubGeocoder(None))
    }
}
