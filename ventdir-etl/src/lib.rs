//! Data jobs for the ventdir directory
//!
//! - `import`: SerpAPI Google Maps search to import CSVs
//! - `migrate_images`: Google-hosted listing images to Cloudflare Images
//! - `migrate_photos`: SerpAPI photo galleries to Cloudflare Images
//! - `image_metadata`: site tagging of Cloudflare images
//! - `diagnostics`: database and Cloudflare connectivity checks

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

pub mod address;
pub mod amenities;
pub mod cloudflare;
pub mod config;
pub mod csv_out;
pub mod db;
pub mod diagnostics;
pub mod hours;
pub mod image_metadata;
pub mod import;
pub mod migrate_images;
pub mod migrate_photos;
pub mod nominatim;
pub mod retry;
pub mod serpapi;

pub use config::{load_dotenv, load_site_config};
pub use diagnostics::{check_cloudflare, check_database, CloudflareReport, DatabaseReport};
pub use image_metadata::{run_image_metadata, ImageMetadataArgs, MetadataSummary, SiteTag};
pub use import::{run_import, ImportArgs, ImportSummary};
pub use migrate_images::{run_migrate_images, ImageMigrationStats, MigrateImagesArgs};
pub use migrate_photos::{run_migrate_photos, MigratePhotosArgs, PhotoMigrationStats};

/// Spinner with a position counter; hidden when `quiet`.
pub(crate) fn spinner(quiet: bool, template: &str) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template(template)
            .context("failed to create progress style")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Bar over `len` items; hidden when `quiet`.
pub(crate) fn progress_bar(quiet: bool, len: u64) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} {elapsed_precise} [{bar:30.cyan/blue}] {pos}/{len} {msg}",
        )
        .context("failed to create progress style")?
        .progress_chars("█▉▊▋▌▍▎▏ "),
    );
    Ok(pb)
}

/// Pretty JSON list of failures for a later retry run.
pub(crate) fn write_failures<T: Serialize>(path: &Path, failures: &[T]) -> Result<()> {
    let body = serde_json::to_string_pretty(failures)?;
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))?;
    info!(count = failures.len(), path = %path.display(), "saved failures");
    Ok(())
}
