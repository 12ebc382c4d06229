//! Data job commands: import and image migrations

use anyhow::Result;
use ventdir_etl::{
    ImageMetadataArgs, ImportArgs, MigrateImagesArgs, MigratePhotosArgs,
};

use crate::ui;

pub async fn run_import(args: ImportArgs) -> Result<()> {
    let config = ventdir_etl::load_site_config()?;
    let dry_run = args.dry_run;
    let summary = ventdir_etl::run_import(args, &config, ui::is_quiet()).await?;

    ui::section("SerpAPI import");
    ui::field("API calls", summary.api_calls);
    ui::field("Locations", summary.locations);
    ui::field("Hours records", summary.hours);
    ui::field("Amenity records", summary.amenities);

    match &summary.saved {
        Some(saved) => {
            println!("\nWrote {}", saved.locations.display());
            for path in [&saved.hours, &saved.amenities].into_iter().flatten() {
                println!("Wrote {}", path.display());
            }
            println!("\nFiles saved to: {}", summary.output_dir.display());
        }
        None if dry_run => println!("\nDry run: no files were written"),
        None => {}
    }
    Ok(())
}

pub async fn run_migrate_images(args: MigrateImagesArgs) -> Result<()> {
    let config = ventdir_etl::load_site_config()?;
    let download_local = args.download_local;
    let failed_file = args.failed_file.clone();
    let stats = ventdir_etl::run_migrate_images(args, &config, ui::is_quiet()).await?;

    ui::section("Image migration");
    ui::field("Locations processed", stats.total);
    ui::field("Images migrated", stats.migrated);
    ui::field("Already migrated", stats.already_migrated);
    ui::field("Skipped (no images)", stats.skipped);
    ui::field("Failed", stats.failed.len());

    if !stats.failed.is_empty() {
        println!("\nFailed images:");
        for fail in &stats.failed {
            println!("  - {} ({}): {}", fail.location_name, fail.image_type, fail.error);
        }
        println!("\nFailures saved to: {}", failed_file.display());
        if !download_local {
            println!("Retry them with: ventdir migrate-images --download-local");
        }
    }
    if let Some(last) = stats.resume_after {
        println!("\nTo continue: ventdir migrate-images --start-after {last}");
    }
    Ok(())
}

pub async fn run_migrate_photos(args: MigratePhotosArgs) -> Result<()> {
    let config = ventdir_etl::load_site_config()?;
    let failed_file = args.failed_file.clone();
    let stats = ventdir_etl::run_migrate_photos(args, &config, ui::is_quiet()).await?;

    ui::section("SerpAPI photo migration");
    ui::field("Locations processed", stats.total);
    ui::field("Locations migrated", stats.migrated);
    ui::field("Already had images", stats.already_migrated);
    ui::field("Skipped (no photos)", stats.skipped);
    ui::field("Failed", stats.failed);
    ui::field("Photos uploaded", stats.photos_uploaded);
    ui::field("Photos failed", stats.photos_failed);

    if !stats.failed_locations.is_empty() {
        println!("\nFailures saved to: {}", failed_file.display());
    }
    if let Some(last) = stats.resume_after {
        println!("\nTo continue: ventdir migrate-photos --start-after {last}");
    }
    Ok(())
}

pub async fn run_image_metadata(args: ImageMetadataArgs) -> Result<()> {
    let config = ventdir_etl::load_site_config()?;
    let dry_run = args.dry_run;
    let site = args.site;
    let summary = ventdir_etl::run_image_metadata(args, &config, ui::is_quiet()).await?;

    ui::section("Image metadata");
    ui::field("Site", site.as_str());
    ui::field("Images considered", summary.considered);
    ui::field(if dry_run { "Would update" } else { "Updated" }, summary.updated);
    ui::field("Failed", summary.failed);
    Ok(())
}
