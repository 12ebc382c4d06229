use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};
use ventdir_core::SiteConfig;

/// Env files read from the working directory, highest priority first.
const LOCAL_ENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Load environment variables from .env files in multiple locations
///
/// Priority order (highest to lowest):
/// 1. Variables already set in the process environment
/// 2. ./.env.local
/// 3. ./.env
/// 4. ~/.ventdir/.env
///
/// dotenvy never overwrites a variable that is already set, so loading in
/// priority order gives the earlier file precedence.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = LOCAL_ENV_FILES.iter().map(PathBuf::from).collect();
    if let Some(dir) = config_dir() {
        candidates.push(dir.join(".env"));
    }

    let mut loaded = Vec::new();
    for path in candidates.into_iter().filter(|p| p.exists()) {
        match dotenvy::from_path(&path) {
            Ok(()) => {
                debug!("Loaded env file: {}", path.display());
                loaded.push(path);
            }
            Err(e) => debug!("Failed to load {}: {}", path.display(), e),
        }
    }

    if loaded.is_empty() {
        info!("Using environment variables only (no .env file found)");
    } else {
        let names: Vec<String> = loaded.iter().map(|p| p.display().to_string()).collect();
        info!("Loaded configuration from: {}", names.join(", "));
    }
    loaded
}

/// Get the ventdir config directory path (~/.ventdir)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ventdir"))
}

/// Env files first, then the TOML config with environment overrides.
pub fn load_site_config() -> Result<SiteConfig> {
    load_dotenv();
    SiteConfig::load().context("failed to load site config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_dir_is_under_home() {
        if let Some(dir) = config_dir() {
            assert!(dir.ends_with(".ventdir"));
        }
    }
}
