use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DirectoryError, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.dryerventcleaners.co";
pub const DEFAULT_USER_AGENT: &str = "DryerVentCleaners/1.0";
pub const DEFAULT_GEOCODER_URL: &str = "https://api.zippopotam.us/us";

/// Configuration shared by the server, the ETL scripts and the CLI.
///
/// Every section is optional in the file; missing sections take defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub site: SiteSection,
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub cloudflare: CloudflareSection,
    pub serpapi: SerpApiSection,
    pub geocoder: GeocoderSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSection {
    pub name: String,
    /// Absolute origin used in sitemap URLs, without trailing slash.
    pub base_url: String,
    /// Sent to third-party APIs.
    pub user_agent: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: "Dryer Vent Cleaners".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub cors_permissive: bool,
    /// Bearer token for `/api/admin/*`. Admin routes reject everything when unset.
    pub admin_token: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3030".to_string(),
            cors_permissive: false,
            admin_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudflareSection {
    pub account_id: Option<String>,
    pub api_token: Option<String>,
    /// Public delivery hash used in `imagedelivery.net` URLs.
    pub account_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SerpApiSection {
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeocoderSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODER_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl SiteConfig {
    /// Load config from the first existing candidate path, then apply
    /// environment overrides. No file at all yields defaults.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML file and expand `${VAR}` references in string values.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| DirectoryError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            toml::from_str(&content).map_err(|source| DirectoryError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.expand_variables(&env_vars());
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// `$VENTDIR_CONFIG`, then `./ventdir.toml`, then `~/.ventdir/config.toml`.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(explicit) = env::var("VENTDIR_CONFIG") {
            return Some(PathBuf::from(explicit));
        }
        let local = PathBuf::from("ventdir.toml");
        if local.exists() {
            return Some(local);
        }
        dirs::home_dir()
            .map(|home| home.join(".ventdir/config.toml"))
            .filter(|p| p.exists())
    }

    /// Environment wins over the file for secrets and deploy-specific values.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(id) = get("CLOUDFLARE_ACCOUNT_ID") {
            self.cloudflare.account_id = Some(id);
        }
        if let Some(token) = get("CLOUDFLARE_IMAGES_API_TOKEN") {
            self.cloudflare.api_token = Some(token);
        }
        if let Some(hash) = get("CLOUDFLARE_IMAGES_ACCOUNT_HASH") {
            self.cloudflare.account_hash = Some(hash);
        }
        if let Some(key) = get("SERPAPI_API_KEY") {
            self.serpapi.api_key = Some(key);
        }
        if let Some(token) = get("VENTDIR_ADMIN_TOKEN") {
            self.server.admin_token = Some(token);
        }
        if let Some(base) = get("VENTDIR_BASE_URL") {
            self.site.base_url = base.trim_end_matches('/').to_string();
        }
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database
            .url
            .as_deref()
            .ok_or_else(|| DirectoryError::config("DATABASE_URL is not set"))
    }

    pub fn cloudflare_credentials(&self) -> Result<(&str, &str)> {
        match (
            self.cloudflare.account_id.as_deref(),
            self.cloudflare.api_token.as_deref(),
        ) {
            (Some(id), Some(token)) => Ok((id, token)),
            _ => Err(DirectoryError::config(
                "CLOUDFLARE_ACCOUNT_ID and CLOUDFLARE_IMAGES_API_TOKEN must be set",
            )),
        }
    }

    pub fn serpapi_key(&self) -> Result<&str> {
        self.serpapi
            .api_key
            .as_deref()
            .ok_or_else(|| DirectoryError::config("SERPAPI_API_KEY is not set"))
    }

    fn expand_variables(&mut self, vars: &HashMap<String, String>) {
        let expand_opt = |value: &mut Option<String>| {
            if let Some(v) = value.as_mut() {
                *v = expand_string(v, vars);
            }
        };
        expand_opt(&mut self.database.url);
        expand_opt(&mut self.cloudflare.account_id);
        expand_opt(&mut self.cloudflare.api_token);
        expand_opt(&mut self.cloudflare.account_hash);
        expand_opt(&mut self.serpapi.api_key);
        expand_opt(&mut self.server.admin_token);
        self.site.base_url = expand_string(&self.site.base_url, vars);
    }

    /// Write the current config as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| DirectoryError::ConfigWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| DirectoryError::config(format!("failed to serialize config: {e}")))?;
        fs::write(path, toml_str).map_err(|source| DirectoryError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn env_vars() -> HashMap<String, String> {
    env::vars().collect()
}

/// Replace `${KEY}` with its value from `vars`; unknown keys are left alone.
fn expand_string(s: &str, vars: &HashMap<String, String>) -> String {
    let mut result = s.to_string();
    for (key, value) in vars {
        let pattern = format!("${{{}}}", key);
        if result.contains(&pattern) {
            result = result.replace(&pattern, value);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_usable() {
        let config = SiteConfig::default();
        assert_eq!(config.site.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.geocoder.timeout_secs, 10);
        assert!(config.server.admin_token.is_none());
        assert!(config.database_url().is_err());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
bind = "0.0.0.0:8080"

[database]
url = "postgres://localhost/${{VENTDIR_TEST_DB_NAME}}"
"#
        )
        .unwrap();

        let mut config = SiteConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.site.user_agent, DEFAULT_USER_AGENT);

        let mut vars = HashMap::new();
        vars.insert("VENTDIR_TEST_DB_NAME".to_string(), "ventdir".to_string());
        config.expand_variables(&vars);
        assert_eq!(config.database_url().unwrap(), "postgres://localhost/ventdir");
    }

    #[test]
    fn invalid_toml_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbind = ").unwrap();
        let err = SiteConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, DirectoryError::ConfigParse { .. }));
    }

    #[test]
    fn env_overrides_win() {
        let mut config = SiteConfig::default();
        config.database.url = Some("postgres://file".into());
        config.apply_env_overrides(|key| match key {
            "DATABASE_URL" => Some("postgres://env".into()),
            "VENTDIR_BASE_URL" => Some("https://staging.example.com/".into()),
            "SERPAPI_API_KEY" => Some("   ".into()),
            _ => None,
        });
        assert_eq!(config.database_url().unwrap(), "postgres://env");
        assert_eq!(config.site.base_url, "https://staging.example.com");
        assert!(config.serpapi_key().is_err());
    }

    #[test]
    fn cloudflare_credentials_need_both_values() {
        let mut config = SiteConfig::default();
        config.cloudflare.account_id = Some("acct".into());
        assert!(config.cloudflare_credentials().is_err());
        config.cloudflare.api_token = Some("tok".into());
        assert_eq!(config.cloudflare_credentials().unwrap(), ("acct", "tok"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");
        let mut config = SiteConfig::default();
        config.server.admin_token = Some("secret".into());
        config.save(&path).unwrap();
        let loaded = SiteConfig::from_file(&path).unwrap();
        assert_eq!(loaded.server.admin_token.as_deref(), Some("secret"));
    }

    #[test]
    fn expand_string_leaves_unknown_keys() {
        let vars = HashMap::from([("A".to_string(), "1".to_string())]);
        assert_eq!(expand_string("${A}-${B}", &vars), "1-${B}");
    }
}
