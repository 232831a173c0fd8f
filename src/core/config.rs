use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_MFAPI_BASE_URL: &str = "https://api.mfapi.in/mf";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MfApiProviderConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Extra attempts after the first failed request.
    pub retries: usize,
    pub retry_delay_ms: u64,
    /// Keep a scheme's NAV history in memory for this long. Unset disables caching.
    pub cache_ttl_secs: Option<u64>,
}

impl Default for MfApiProviderConfig {
    fn default() -> Self {
        MfApiProviderConfig {
            base_url: DEFAULT_MFAPI_BASE_URL.to_string(),
            timeout_secs: 30,
            retries: 0,
            retry_delay_ms: 500,
            cache_ttl_secs: None,
        }
    }
}

impl MfApiProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ProvidersConfig {
    pub mfapi: MfApiProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub providers: ProvidersConfig,
}

impl AppConfig {
    /// Loads the config from the platform default path, or defaults when no file exists there.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "navprofit", "navprofit")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
server:
  host: "127.0.0.1"
  port: 9000
providers:
  mfapi:
    base_url: "http://example.com/mf"
    timeout_secs: 5
    retries: 2
    cache_ttl_secs: 600
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.server.addr(), "127.0.0.1:9000");
        assert_eq!(config.providers.mfapi.base_url, "http://example.com/mf");
        assert_eq!(config.providers.mfapi.timeout(), Duration::from_secs(5));
        assert_eq!(config.providers.mfapi.retries, 2);
        assert_eq!(config.providers.mfapi.retry_delay_ms, 500);
        assert_eq!(
            config.providers.mfapi.cache_ttl(),
            Some(Duration::from_secs(600))
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml_str = r#"
server:
  port: 8123
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.providers.mfapi.base_url, DEFAULT_MFAPI_BASE_URL);
        assert_eq!(config.providers.mfapi.retries, 0);
        assert!(config.providers.mfapi.cache_ttl().is_none());
    }

    #[test]
    fn test_default_config_survives_yaml_round_trip() {
        let yaml = AppConfig::default().to_yaml().unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "providers:\n  mfapi:\n    timeout_secs: 3").unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.providers.mfapi.timeout_secs, 3);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load_from_path(dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }

    #[test]
    fn test_load_from_invalid_yaml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }
}
