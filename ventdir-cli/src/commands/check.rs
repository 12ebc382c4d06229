//! Connectivity diagnostics

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(subcommand)]
    pub command: CheckCommands,
}

#[derive(Subcommand, Debug)]
pub enum CheckCommands {
    /// Connect to Postgres and count locations
    Db,
    /// Verify the Cloudflare Images token
    Cloudflare {
        /// Also upload and delete a test image
        #[arg(long)]
        upload: bool,
    },
}

pub async fn run_check(args: CheckArgs) -> Result<()> {
    let config = ventdir_etl::load_site_config()?;
    match args.command {
        CheckCommands::Db => {
            let report = ventdir_etl::check_database(&config).await?;
            println!("✓ Database connection successful");
            println!("  Server version: {}", report.server_version);
            println!("  Locations:      {}", report.locations);
        }
        CheckCommands::Cloudflare { upload } => {
            let report = ventdir_etl::check_cloudflare(&config, upload).await?;
            println!("✓ Cloudflare credentials valid ({} images listed)", report.listed);
            match report.upload_deleted {
                Some(true) => println!("✓ Test upload succeeded and was cleaned up"),
                Some(false) => println!("⚠ Test upload succeeded but the image could not be deleted"),
                None => {}
            }
        }
    }
    Ok(())
}
