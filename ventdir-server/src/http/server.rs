//! Axum server setup
//!
//! Server skeleton with:
//! - CORS limited to localhost and the site's own origin by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use ventdir_core::SiteConfig;

use super::routes;
use crate::geocode::Geocoder;

/// Local origins always allowed by the default CORS policy
const LOCAL_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:3030",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:3030",
];

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost and site origin)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
        }
    }
}

impl ServerConfig {
    /// Read `[server]` from the site config.
    pub fn from_site(site: &SiteConfig) -> Result<Self, ServerError> {
        let bind_addr = site
            .server
            .bind
            .parse()
            .map_err(|_| ServerError::InvalidBind(site.server.bind.clone()))?;
        Ok(Self {
            bind_addr,
            cors_permissive: site.server.cors_permissive,
        })
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Site settings: base URL, admin token, image account hash
    pub site: SiteConfig,
    /// Zip code lookup, swappable in tests
    pub geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    pub fn new(pool: PgPool, site: SiteConfig, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            pool,
            site,
            geocoder,
        }
    }

    /// Cloudflare delivery hash, if configured.
    pub fn account_hash(&self) -> Option<&str> {
        self.site
            .cloudflare
            .account_hash
            .as_deref()
            .filter(|h| !h.is_empty())
    }
}

/// Build the application router with all routes and middleware.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = LOCAL_ORIGINS
            .iter()
            .copied()
            .chain(std::iter::once(state.site.site.base_url.trim_end_matches('/')))
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::search::router())
        .merge(routes::nearby::router())
        .merge(routes::admin::router())
        .merge(routes::reviews::router())
        .merge(routes::claims::router())
        .merge(routes::feedback::router())
        .merge(routes::listings::router())
        .merge(routes::home::router())
        .merge(routes::sitemaps::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// let state = AppState::new(pool, site, Arc::new(geocoder));
/// run_server(state, ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    tracing::info!(base_url = %state.site.site.base_url, "site config loaded");
    let app = build_router(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid bind address: {0}")]
    InvalidBind(String),
}
