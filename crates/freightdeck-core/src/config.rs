use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
///
/// Loaded from the config file with CLI flags layered on top.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub dashboard: DashboardConfig,
    pub export: ExportConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults if
    /// no file exists yet.
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// XDG on Linux/macOS, AppData on Windows.
    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("freightdeck");

        Ok(config_dir.join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the CRM API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Use the built-in demo backend instead of HTTP
    #[serde(default)]
    pub demo: bool,
}

fn default_api_url() -> String {
    "http://localhost:5000/api".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            demo: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Seconds before a refresh is flagged as taking longer than expected
    #[serde(default = "default_slow_after")]
    pub slow_after_secs: u64,

    /// How many rows the recent-activity lists show
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

fn default_slow_after() -> u64 {
    5
}

fn default_recent_limit() -> usize {
    5
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            slow_after_secs: default_slow_after(),
            recent_limit: default_recent_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportConfig {
    /// Directory exports land in; defaults to the current directory
    pub output_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dashboard.slow_after_secs, 5);
        assert_eq!(config.dashboard.recent_limit, 5);
        assert_eq!(config.backend.api_url, "http://localhost:5000/api");
        assert!(!config.backend.demo);
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("slow_after_secs"));
        assert!(toml.contains("api_url"));

        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.dashboard.slow_after_secs, 5);
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [backend]
            api_url = "https://crm.example.com/api"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.backend.api_url, "https://crm.example.com/api");
        assert_eq!(parsed.dashboard.slow_after_secs, 5);
    }
}
