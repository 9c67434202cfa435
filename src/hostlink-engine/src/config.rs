//! Engine configuration (`config.toml`).
//!
//! ```toml
//! log-level = "debug"
//!
//! [services]
//! daemon-unit = "yggdrasil.service"
//! facts-timer = "rhc-canonical-facts.timer"
//! facts-service = "rhc-canonical-facts.service"
//! subscription-manager = "/usr/sbin/subscription-manager"
//! insights-client = "/usr/bin/insights-client"
//! systemctl = "/usr/bin/systemctl"
//!
//! [feature-dependencies]
//! remote-management = ["content", "analytics"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use hostlink_features::{ConfigError, FeatureRegistry, RegistryError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default configuration directory.
pub const DEFAULT_CONFIG_DIR: &str = "/etc/hostlink";
/// Name of the main configuration file inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Name of the drop-in directory inside the configuration directory.
pub const DROP_IN_DIR_NAME: &str = "config.toml.d";

const KNOWN_KEYS: &[&str] = &["log-level", "services", "feature-dependencies"];
const KNOWN_SERVICE_KEYS: &[&str] = &[
    "daemon-unit",
    "facts-timer",
    "facts-service",
    "subscription-manager",
    "insights-client",
    "systemctl",
];

/// Unit names and tool locations the collaborators use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServiceLayout {
    /// Background management daemon.
    pub daemon_unit: String,
    /// Timer that refreshes canonical facts.
    pub facts_timer: String,
    /// One-shot service that collects canonical facts.
    pub facts_service: String,
    pub subscription_manager: PathBuf,
    pub insights_client: PathBuf,
    pub systemctl: PathBuf,
}

impl Default for ServiceLayout {
    fn default() -> Self {
        Self {
            daemon_unit: "yggdrasil.service".to_string(),
            facts_timer: "rhc-canonical-facts.timer".to_string(),
            facts_service: "rhc-canonical-facts.service".to_string(),
            subscription_manager: PathBuf::from("/usr/sbin/subscription-manager"),
            insights_client: PathBuf::from("/usr/bin/insights-client"),
            systemctl: PathBuf::from("/usr/bin/systemctl"),
        }
    }
}

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineConfig {
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub services: ServiceLayout,

    /// Replaces the built-in dependency edges when present.
    #[serde(default)]
    pub feature_dependencies: Option<BTreeMap<String, Vec<String>>>,
}

impl EngineConfig {
    /// Load `config.toml`. A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Config file {} not found, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse(path, &content)
    }

    /// Parse `config.toml` content; `path` is only used for messages.
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = content.parse().map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;

        for key in table.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!("Ignoring unknown key '{}' in {}", key, path.display());
            }
        }
        if let Some(toml::Value::Table(services)) = table.get("services") {
            for key in services.keys() {
                if !KNOWN_SERVICE_KEYS.contains(&key.as_str()) {
                    warn!(
                        "Ignoring unknown key 'services.{}' in {}",
                        key,
                        path.display()
                    );
                }
            }
        }

        toml::Value::Table(table)
            .try_into()
            .map_err(|source| ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Build the feature registry, honouring `[feature-dependencies]`.
    pub fn registry(&self) -> Result<FeatureRegistry, RegistryError> {
        match &self.feature_dependencies {
            Some(map) => {
                debug!("Using dependency edges from configuration");
                FeatureRegistry::with_dependency_map(map)
            }
            None => FeatureRegistry::builtin(),
        }
    }
}

/// Locations derived from the configuration directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
}

impl ConfigPaths {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn drop_in_dir(&self) -> PathBuf {
        self.config_dir.join(DROP_IN_DIR_NAME)
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_DIR)
    }
}
