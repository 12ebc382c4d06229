//! Config file commands

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ventdir_core::SiteConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show which config file would be loaded
    Path,
    /// Print the effective config (file plus environment) with secrets masked
    Show,
    /// Write a default config file
    Init(InitArgs),
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Where to write (default: ./ventdir.toml)
    #[arg(long, value_name = "PATH", default_value = "ventdir.toml")]
    pub path: PathBuf,

    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            match SiteConfig::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("(none; using defaults and environment)"),
            }
            Ok(())
        }
        ConfigCommands::Show => run_show(),
        ConfigCommands::Init(args) => run_init(args),
    }
}

fn mask(value: &mut Option<String>) {
    if value.is_some() {
        *value = Some("********".to_string());
    }
}

/// Copy of `config` safe to print.
pub fn masked(config: &SiteConfig) -> SiteConfig {
    let mut shown = config.clone();
    mask(&mut shown.database.url);
    mask(&mut shown.cloudflare.api_token);
    mask(&mut shown.serpapi.api_key);
    mask(&mut shown.server.admin_token);
    shown
}

fn run_show() -> Result<()> {
    let config = ventdir_etl::load_site_config()?;
    let rendered = toml::to_string_pretty(&masked(&config)).context("failed to render config")?;
    println!("{rendered}");
    Ok(())
}

fn run_init(args: InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.path.display()
        );
    }
    SiteConfig::default().save(&args.path)?;
    println!("✅ Created config at: {}", args.path.display());
    println!("\nSecrets are read from the environment:");
    println!("  DATABASE_URL, CLOUDFLARE_ACCOUNT_ID, CLOUDFLARE_IMAGES_API_TOKEN,");
    println!("  CLOUDFLARE_IMAGES_ACCOUNT_HASH, SERPAPI_API_KEY, VENTDIR_ADMIN_TOKEN");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_masked() {
        let mut config = SiteConfig::default();
        config.database.url = Some("postgres://user:pw@host/db".into());
        config.serpapi.api_key = Some("secret".into());

        let shown = masked(&config);
        assert_eq!(shown.database.url.as_deref(), Some("********"));
        assert_eq!(shown.serpapi.api_key.as_deref(), Some("********"));
        assert_eq!(shown.cloudflare.api_token, None);
        assert_eq!(shown.site.base_url, config.site.base_url);
    }
}
