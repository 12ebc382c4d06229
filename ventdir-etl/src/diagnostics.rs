//! Connectivity checks for the database and Cloudflare Images

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{info, warn};
use ventdir_core::SiteConfig;

use crate::cloudflare::CloudflareClient;

/// Public image used for the upload round trip
pub const TEST_IMAGE_URL: &str = "https://images.unsplash.com/photo-1449965408869-eaa3f722e40d?w=400";

#[derive(Debug)]
pub struct DatabaseReport {
    pub server_version: String,
    pub locations: i64,
}

pub async fn check_database(config: &SiteConfig) -> Result<DatabaseReport> {
    let pool = crate::db::connect(config).await?;

    let one: i32 = sqlx::query_scalar("SELECT 1")
        .fetch_one(&pool)
        .await
        .context("SELECT 1 failed")?;
    anyhow::ensure!(one == 1, "unexpected response from database");

    let server_version: String = sqlx::query_scalar("SHOW server_version")
        .fetch_one(&pool)
        .await
        .context("failed to read server version")?;
    let locations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM locations")
        .fetch_one(&pool)
        .await
        .context("failed to query locations table")?;

    info!(%server_version, locations, "database reachable");
    Ok(DatabaseReport {
        server_version,
        locations,
    })
}

#[derive(Debug)]
pub struct CloudflareReport {
    /// Images on the first v2 list page
    pub listed: usize,
    /// Whether the test image was uploaded and deleted; `None` when skipped
    pub upload_deleted: Option<bool>,
}

/// List to verify the token, then optionally upload and delete a test image.
pub async fn check_cloudflare(config: &SiteConfig, test_upload: bool) -> Result<CloudflareReport> {
    let client = CloudflareClient::from_config(config)?;

    let list = client
        .list_v2()
        .await
        .context("authentication failed; check the token has Cloudflare Images: Edit")?;
    info!(images = list.images.len(), "Cloudflare credentials valid");

    let mut report = CloudflareReport {
        listed: list.images.len(),
        upload_deleted: None,
    };
    if !test_upload {
        return Ok(report);
    }

    let id = client
        .upload_from_url(TEST_IMAGE_URL, &json!({"purpose": "connectivity-check"}))
        .await
        .context("test upload failed")?;
    info!(%id, "test image uploaded");

    report.upload_deleted = Some(match client.delete_image(&id).await {
        Ok(()) => true,
        Err(e) => {
            warn!(%id, error = %e, "could not delete test image");
            false
        }
    });
    Ok(report)
}
