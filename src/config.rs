use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_BASE_URL;
use crate::geo::{DEFAULT_RADIUS_KM, Radius};

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "TOOLSHARE_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub nearby: NearbyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(env!("CARGO_PKG_NAME"))
                .join("session.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyConfig {
    /// `null` keeps every positioned tool, annotated with its distance
    pub radius_km: Option<f64>,
}

impl Default for NearbyConfig {
    fn default() -> Self {
        Self {
            radius_km: Some(DEFAULT_RADIUS_KM),
        }
    }
}

impl NearbyConfig {
    pub fn radius(&self) -> Radius {
        Radius::from_km(self.radius_km)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            nearby: NearbyConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain, then apply environment overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file(config_path)?;
        config.apply_env_overrides(std::env::var(API_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    fn load_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    fn apply_env_overrides(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            log::info!("Using API URL from {}", API_URL_ENV);
            self.api.base_url = url;
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(km) = self.nearby.radius_km {
            Radius::within(km).context("Invalid nearby.radius_km")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("toolshare.yml");
        fs::write(&path, content).unwrap();
        (temp, path)
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.nearby.radius(), Radius::Within(DEFAULT_RADIUS_KM));
        assert!(config.session.path.ends_with("session.json"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let (_temp, path) = write_config("api:\n  base_url: http://192.168.18.196:3333\n");
        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.api.base_url, "http://192.168.18.196:3333");
        assert_eq!(config.nearby.radius_km, Some(DEFAULT_RADIUS_KM));
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_null_radius_is_unbounded() {
        let (_temp, path) = write_config("nearby:\n  radius_km: null\n");
        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.nearby.radius(), Radius::Unbounded);
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let missing = PathBuf::from("/definitely/not/here/toolshare.yml");
        assert!(Config::load_file(Some(&missing)).is_err());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let (_temp, path) = write_config("api: [unclosed");
        assert!(Config::load_from_file(&path).is_err());
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_env_overrides(Some("https://api.example.com".to_string()));
        assert_eq!(config.api.base_url, "https://api.example.com");

        config.apply_env_overrides(Some("  ".to_string()));
        assert_eq!(config.api.base_url, "https://api.example.com");

        config.apply_env_overrides(None);
        assert_eq!(config.api.base_url, "https://api.example.com");
    }

    #[test]
    fn test_negative_radius_rejected() {
        let mut config = Config::default();
        config.nearby.radius_km = Some(-1.0);
        assert!(config.validate().is_err());
    }
}
