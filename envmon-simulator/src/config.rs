//! Simulator configuration
//!
//! Handles:
//! - API endpoint and HTTP timeout
//! - Per-mode counts and intervals
//! - Optional RNG seed for reproducible runs

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const CONFIG_ENV_VAR: &str = "ENVMON_SIM_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "simulator.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub http: HttpConfig,
    pub seed: Option<u64>,
    pub device_id: Option<String>,
    pub serial: SerialConfig,
    pub api_test: LoopConfig,
    pub connection: ConnectionConfig,
    pub bulk: BulkConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub api_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub count: usize,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub send_count: usize,
    pub send_interval_secs: u64,
    pub poll_count: usize,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
    pub count: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000/api/sensors".to_string(),
            timeout_secs: 5,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self { interval_secs: 3 }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { count: 10, interval_secs: 3 }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            send_count: 5,
            send_interval_secs: 2,
            poll_count: 8,
            poll_interval_secs: 3,
        }
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self { count: 10 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Endpoint bulk, à côté de l'endpoint principal
    pub fn bulk_url(&self) -> String {
        format!("{}/bulk", self.api_url.trim_end_matches('/'))
    }
}

impl SimulatorConfig {
    /// Resolve the config path: explicit flag, then env var, then ./simulator.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Charge la config; fichier absent ou vide -> config par défaut
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        if content.trim().is_empty() {
            warn!("config {} is empty, using defaults", path.display());
            return Ok(Self::default());
        }

        let config: SimulatorConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SimulatorConfig::default();
        assert_eq!(config.http.api_url, "http://localhost:3000/api/sensors");
        assert_eq!(config.http.timeout(), Duration::from_secs(5));
        assert_eq!(config.api_test.count, 10);
        assert_eq!(config.connection.send_count, 5);
        assert_eq!(config.connection.poll_count, 8);
        assert_eq!(config.serial.interval_secs, 3);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_bulk_url() {
        let mut http = HttpConfig::default();
        assert_eq!(http.bulk_url(), "http://localhost:3000/api/sensors/bulk");
        http.api_url = "http://10.0.0.2:3000/api/sensors/".into();
        assert_eq!(http.bulk_url(), "http://10.0.0.2:3000/api/sensors/bulk");
    }

    #[test]
    fn test_resolve_explicit_path_wins() {
        let path = SimulatorConfig::resolve_path(Some(Path::new("/etc/envmon/sim.toml")));
        assert_eq!(path, PathBuf::from("/etc/envmon/sim.toml"));
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
seed = 7

[http]
api_url = "http://192.168.1.20:3000/api/sensors"

[connection]
poll_count = 12
"#
        )
        .unwrap();

        let config = SimulatorConfig::load(file.path()).await.unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.http.api_url, "http://192.168.1.20:3000/api/sensors");
        // champs absents -> valeurs par défaut
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.connection.poll_count, 12);
        assert_eq!(config.connection.send_count, 5);
    }

    #[tokio::test]
    async fn test_missing_and_empty_files_use_defaults() {
        let missing = SimulatorConfig::load(Path::new("/nonexistent/envmon/simulator.toml")).await.unwrap();
        assert_eq!(missing, SimulatorConfig::default());

        let empty = tempfile::NamedTempFile::new().unwrap();
        let config = SimulatorConfig::load(empty.path()).await.unwrap();
        assert_eq!(config, SimulatorConfig::default());
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let config: SimulatorConfig = toml::from_str(include_str!("../../simulator.example.toml")).unwrap();
        assert_eq!(config, SimulatorConfig::default());
    }

    #[tokio::test]
    async fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http = 12").unwrap();
        assert!(SimulatorConfig::load(file.path()).await.is_err());
    }
}
