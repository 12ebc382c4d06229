//! HTTP server command

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ventdir_server::db::create_pool_with_options;
use ventdir_server::{run_server, AppState, ServerConfig, ZippopotamGeocoder};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides `server.bind`)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Bearer token for /api/admin routes
    #[arg(long, env = "VENTDIR_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut site = ventdir_etl::load_site_config()?;
    if let Some(url) = args.database_url {
        site.database.url = Some(url);
    }
    if let Some(token) = args.admin_token {
        site.server.admin_token = Some(token);
    }

    let mut config = ServerConfig::from_site(&site)?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.cors_permissive |= args.cors_permissive;

    if site.server.admin_token.is_none() {
        tracing::warn!("no admin token configured; /api/admin routes will reject every request");
    }

    let database_url = site.database_url().context(
        "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or ventdir.toml",
    )?;
    let pool = create_pool_with_options(database_url, site.database.max_connections)
        .await
        .context("Failed to create database pool")?;

    let geocoder = ZippopotamGeocoder::new(&site.geocoder, &site.site.user_agent)
        .context("Failed to build geocoder client")?;

    tracing::info!("Starting ventdir server on {}", config.bind_addr);
    run_server(AppState::new(pool, site, Arc::new(geocoder)), config)
        .await
        .context("Server error")?;

    Ok(())
}
