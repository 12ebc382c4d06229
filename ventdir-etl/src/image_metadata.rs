//! Tag Cloudflare images with the site they belong to

use std::time::Duration;

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde_json::{Map, Value};
use tracing::{info, warn};
use ventdir_core::SiteConfig;

use crate::cloudflare::{CloudflareClient, CloudflareImage};

const UPDATE_DELAY: Duration = Duration::from_millis(100);

/// Sites sharing the Cloudflare Images account
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SiteTag {
    SelfCarWashFinder,
    DryerVentCleaners,
}

impl SiteTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfCarWashFinder => "self-car-wash-finder",
            Self::DryerVentCleaners => "dryer-vent-cleaners",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ImageMetadataArgs {
    #[arg(long, value_enum)]
    pub site: SiteTag,

    /// Only update this image
    #[arg(long, value_name = "ID")]
    pub image_id: Option<String>,

    /// Report what would change without patching
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Default)]
pub struct MetadataSummary {
    pub considered: usize,
    pub updated: usize,
    pub failed: usize,
}

pub fn needs_site(image: &CloudflareImage, site: SiteTag) -> bool {
    image.site() != Some(site.as_str())
}

/// Existing metadata with `site` set.
pub fn merged_metadata(image: &CloudflareImage, site: SiteTag) -> Map<String, Value> {
    let mut metadata = image.meta.clone().unwrap_or_default();
    metadata.insert("site".to_string(), Value::String(site.as_str().to_string()));
    metadata
}

pub async fn run_image_metadata(args: ImageMetadataArgs, config: &SiteConfig, quiet: bool) -> Result<MetadataSummary> {
    let client = CloudflareClient::from_config(config)?;

    let images = match &args.image_id {
        Some(id) => vec![client.get_image(id).await?],
        None => {
            let all = client.list_all().await?;
            let total = all.len();
            let pending: Vec<CloudflareImage> =
                all.into_iter().filter(|i| needs_site(i, args.site)).collect();
            info!(total, pending = pending.len(), site = args.site.as_str(), "listed images");
            pending
        }
    };

    let mut summary = MetadataSummary {
        considered: images.len(),
        ..Default::default()
    };
    if images.is_empty() {
        info!("all images already tagged");
        return Ok(summary);
    }

    let pb = crate::progress_bar(quiet, images.len() as u64)?;
    for image in &images {
        let metadata = merged_metadata(image, args.site);
        if args.dry_run {
            info!(id = %image.id, current = image.site().unwrap_or("none"), "would update");
            summary.updated += 1;
        } else {
            match client.update_metadata(&image.id, &metadata).await {
                Ok(_) => summary.updated += 1,
                Err(e) => {
                    warn!(id = %image.id, error = %e, "metadata update failed");
                    summary.failed += 1;
                }
            }
        }
        pb.inc(1);
        tokio::time::sleep(UPDATE_DELAY).await;
    }
    pb.finish_and_clear();
    Ok(summary)
}
