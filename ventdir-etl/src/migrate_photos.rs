//! Upload each location's SerpAPI photo gallery to Cloudflare Images

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use ventdir_core::{ImageType, SiteConfig};

use crate::cloudflare::{CloudflareClient, CloudflareError, ImageDownloader};
use crate::db::{self, NewImage, PayloadSource};
use crate::retry::RetryPolicy;
use crate::serpapi::{Photo, SerpApiClient};

const BATCH_SIZE: usize = 3;
const BATCH_DELAY: Duration = Duration::from_secs(3);
const PHOTO_DELAY: Duration = Duration::from_secs(1);
const UPLOAD_RETRIES: u32 = 2;
const UPLOADED_BY: &str = "serpapi-migration";
const SITE_TAG: &str = "dryer-vent-cleaners";

#[derive(Args, Debug, Clone)]
pub struct MigratePhotosArgs {
    /// Process at most this many locations
    #[arg(long)]
    pub limit: Option<usize>,

    /// Resume after this location id
    #[arg(long, value_name = "LOCATION_ID")]
    pub start_after: Option<Uuid>,

    #[arg(long, default_value = "10")]
    pub max_photos: usize,

    #[arg(long, value_name = "PATH", default_value = "serpapi-photos-failed.json")]
    pub failed_file: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedLocation {
    pub location_id: Uuid,
    pub location_name: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct PhotoMigrationStats {
    pub total: usize,
    pub migrated: usize,
    pub already_migrated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub photos_uploaded: usize,
    pub photos_failed: usize,
    pub failed_locations: Vec<FailedLocation>,
    pub resume_after: Option<Uuid>,
}

/// Cloudflare metadata for the photo at 1-based `position`.
pub fn photo_metadata(location: &PayloadSource, position: usize) -> Value {
    json!({
        "site": SITE_TAG,
        "location_id": location.id,
        "location_name": location.name,
        "type": ImageType::Photo.as_str(),
        "source": "serpapi",
        "position": position,
    })
}

/// Up to `max` photos that have a usable URL, with their 0-based index in
/// the SerpAPI list.
pub fn photo_urls(photos: &[Photo], max: usize) -> Vec<(usize, &str)> {
    photos
        .iter()
        .take(max)
        .enumerate()
        .filter_map(|(i, photo)| photo.best_url().map(|url| (i, url)))
        .collect()
}

enum Outcome {
    Migrated,
    AlreadyMigrated,
    Skipped,
    NothingUploaded,
}

struct PhotoMigrator {
    pool: PgPool,
    serpapi: SerpApiClient,
    cloudflare: CloudflareClient,
    downloader: ImageDownloader,
    retry: RetryPolicy,
    max_photos: usize,
}

impl PhotoMigrator {
    async fn upload_photo(&self, url: &str, metadata: &Value) -> Result<String, CloudflareError> {
        self.retry
            .run(
                || async {
                    let bytes = self.downloader.download(url).await?;
                    self.cloudflare.upload_bytes(bytes, metadata).await
                },
                |_| true,
            )
            .await
    }

    async fn store_photo(&self, location: &PayloadSource, index: usize, url: &str) -> Result<()> {
        let cf_image_id = self
            .upload_photo(url, &photo_metadata(location, index + 1))
            .await
            .context("upload failed")?;
        db::insert_image(
            &self.pool,
            &NewImage {
                location_id: location.id,
                cf_image_id: &cf_image_id,
                image_type: ImageType::Photo,
                is_primary: index == 0,
                uploaded_by: UPLOADED_BY,
                source_url: url,
            },
        )
        .await
    }

    async fn process(&self, location: &PayloadSource, stats: &mut PhotoMigrationStats) -> Result<Outcome> {
        let Some(link) = location.photos_link() else {
            return Ok(Outcome::Skipped);
        };
        if db::has_any_image(&self.pool, location.id).await? {
            return Ok(Outcome::AlreadyMigrated);
        }

        let photos = self
            .serpapi
            .photos(&link)
            .await
            .context("failed to fetch photos")?;
        let urls = photo_urls(&photos, self.max_photos);
        if urls.is_empty() {
            return Ok(Outcome::Skipped);
        }
        info!(count = urls.len(), "uploading photos");

        let mut uploaded = 0;
        for (n, (index, url)) in urls.iter().enumerate() {
            match self.store_photo(location, *index, url).await {
                Ok(()) => {
                    uploaded += 1;
                    stats.photos_uploaded += 1;
                    if n + 1 < urls.len() {
                        tokio::time::sleep(PHOTO_DELAY).await;
                    }
                }
                Err(e) => {
                    warn!(position = index + 1, error = %format!("{e:#}"), "photo failed");
                    stats.photos_failed += 1;
                }
            }
        }

        Ok(if uploaded > 0 {
            Outcome::Migrated
        } else {
            Outcome::NothingUploaded
        })
    }
}

pub async fn run_migrate_photos(args: MigratePhotosArgs, config: &SiteConfig, quiet: bool) -> Result<PhotoMigrationStats> {
    let migrator = PhotoMigrator {
        pool: db::connect(config).await?,
        serpapi: SerpApiClient::from_config(config)?,
        cloudflare: CloudflareClient::from_config(config)?,
        downloader: ImageDownloader::new(None)?,
        retry: RetryPolicy::new(UPLOAD_RETRIES),
        max_photos: args.max_photos,
    };
    info!(limit = ?args.limit, max_photos = args.max_photos, "starting SerpAPI photo migration");

    let locations: Vec<PayloadSource> = db::locations_with_payload(&migrator.pool, args.start_after)
        .await?
        .into_iter()
        .take(args.limit.unwrap_or(usize::MAX))
        .collect();

    let mut stats = PhotoMigrationStats {
        total: locations.len(),
        ..Default::default()
    };
    if locations.is_empty() {
        info!("no locations with SerpAPI payloads");
        return Ok(stats);
    }

    let pb = crate::progress_bar(quiet, locations.len() as u64)?;
    let batches: Vec<&[PayloadSource]> = locations.chunks(BATCH_SIZE).collect();
    for (index, batch) in batches.iter().enumerate() {
        pb.set_message(format!("batch {}/{}", index + 1, batches.len()));
        for location in batch.iter() {
            info!(name = %location.name, "processing location");
            match migrator.process(location, &mut stats).await {
                Ok(Outcome::Migrated) => stats.migrated += 1,
                Ok(Outcome::AlreadyMigrated) => stats.already_migrated += 1,
                Ok(Outcome::Skipped) => stats.skipped += 1,
                Ok(Outcome::NothingUploaded) => stats.failed += 1,
                Err(e) => {
                    warn!(name = %location.name, error = %format!("{e:#}"), "location failed");
                    stats.failed += 1;
                    stats.failed_locations.push(FailedLocation {
                        location_id: location.id,
                        location_name: location.name.clone(),
                        error: format!("{e:#}"),
                    });
                }
            }
            pb.inc(1);
        }
        if index + 1 < batches.len() {
            tokio::time::sleep(BATCH_DELAY).await;
        }
    }
    pb.finish_and_clear();

    if !stats.failed_locations.is_empty() {
        crate::write_failures(&args.failed_file, &stats.failed_locations)?;
    }
    if args.limit.is_some() {
        stats.resume_after = locations.last().map(|l| l.id);
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(image: Option<&str>, thumbnail: Option<&str>) -> Photo {
        Photo {
            image: image.map(str::to_string),
            thumbnail: thumbnail.map(str::to_string),
        }
    }

    #[test]
    fn photo_urls_prefer_full_size_and_respect_max() {
        let photos = vec![
            photo(Some("https://a/full"), Some("https://a/thumb")),
            photo(None, Some("https://b/thumb")),
            photo(None, None),
            photo(Some("https://d/full"), None),
        ];
        assert_eq!(
            photo_urls(&photos, 10),
            vec![(0, "https://a/full"), (1, "https://b/thumb"), (3, "https://d/full")]
        );
        assert_eq!(photo_urls(&photos, 2).len(), 2);
    }

    #[test]
    fn metadata_carries_site_and_position() {
        let location = PayloadSource {
            id: Uuid::nil(),
            name: "Vent Pros".into(),
            city: None,
            state: None,
            serp_payload: None,
        };
        let meta = photo_metadata(&location, 1);
        assert_eq!(meta["site"], "dryer-vent-cleaners");
        assert_eq!(meta["source"], "serpapi");
        assert_eq!(meta["type"], "photo");
        assert_eq!(meta["position"], 1);
    }
}
