//! Drop-in features configuration.
//!
//! Each `*.toml` file under `config.toml.d/` may carry a table
//! `features = { "<feature>" = <bool>, ... }`. Files are applied in filename
//! order and later files override earlier ones key by key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Feature values read from the drop-in configuration directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Feature overrides (config key -> enabled).
    #[serde(default)]
    pub overrides: BTreeMap<String, bool>,
}

impl FeaturesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a single drop-in file. A file without a `features` table yields
    /// an empty layer.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source,
                })?;
        Self::parse(path, &content)
    }

    /// Parse drop-in content; `path` is only used for error messages.
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = content.parse().map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;

        match table.get("features") {
            Some(toml::Value::Table(features)) => {
                let mut config = Self::default();
                for (key, val) in features {
                    match val {
                        toml::Value::Boolean(enabled) => {
                            config.overrides.insert(key.clone(), *enabled);
                        }
                        other => {
                            return Err(ConfigError::InvalidValue {
                                path: path.to_path_buf(),
                                key: key.clone(),
                                found: other.type_str().to_string(),
                            });
                        }
                    }
                }
                Ok(config)
            }
            Some(_) => Err(ConfigError::NotATable {
                path: path.to_path_buf(),
            }),
            None => Ok(Self::default()),
        }
    }

    /// Check if a feature is explicitly set.
    pub fn is_enabled(&self, config_key: &str) -> Option<bool> {
        self.overrides.get(config_key).copied()
    }

    /// Set feature enabled state.
    pub fn set_enabled(&mut self, config_key: &str, enabled: bool) {
        self.overrides.insert(config_key.to_string(), enabled);
    }

    /// Apply another layer on top of this one.
    pub fn merge(&mut self, other: FeaturesConfig) {
        self.overrides.extend(other.overrides);
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Load and merge every `*.toml` file in `dir`, in filename order.
///
/// A missing directory is not an error: it simply contributes no values.
pub async fn load_drop_in_dir(dir: &Path) -> Result<FeaturesConfig, ConfigError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Drop-in directory {} not found", dir.display());
            return Ok(FeaturesConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::ReadError {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut files: Vec<PathBuf> = Vec::new();
    loop {
        let entry = entries
            .next_entry()
            .await
            .map_err(|source| ConfigError::ReadError {
                path: dir.to_path_buf(),
                source,
            })?;
        let Some(entry) = entry else { break };
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "toml") && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut merged = FeaturesConfig::default();
    for file in files {
        let layer = FeaturesConfig::load(&file).await?;
        tracing::debug!(
            "Loaded {} feature value(s) from {}",
            layer.overrides.len(),
            file.display()
        );
        merged.merge(layer);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_config() {
        let mut config = FeaturesConfig::new();

        config.set_enabled("content", true);
        assert_eq!(config.is_enabled("content"), Some(true));
        assert_eq!(config.is_enabled("analytics"), None);
    }

    #[test]
    fn test_parse_inline_table() {
        let config = FeaturesConfig::parse(
            Path::new("01-features.toml"),
            r#"features = { "content" = true, "remote-management" = false }"#,
        )
        .unwrap();

        assert_eq!(config.is_enabled("content"), Some(true));
        assert_eq!(config.is_enabled("remote-management"), Some(false));
        assert_eq!(config.is_enabled("analytics"), None);
    }

    #[test]
    fn test_parse_without_features_table() {
        let config = FeaturesConfig::parse(Path::new("x.toml"), "log-level = \"debug\"").unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_non_boolean_value_is_rejected() {
        let err = FeaturesConfig::parse(Path::new("x.toml"), r#"features = { "content" = "yes" }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "content"));
    }

    #[test]
    fn test_features_must_be_a_table() {
        let err = FeaturesConfig::parse(Path::new("x.toml"), "features = true").unwrap_err();
        assert!(matches!(err, ConfigError::NotATable { .. }));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let err = FeaturesConfig::parse(Path::new("x.toml"), "features = {").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_drop_in_files_merge_in_filename_order() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("02-override.toml"),
            r#"features = { "content" = false }"#,
        )
        .await
        .unwrap();
        tokio::fs::write(
            dir.path().join("01-features.toml"),
            r#"features = { "content" = true, "analytics" = false }"#,
        )
        .await
        .unwrap();
        tokio::fs::write(dir.path().join("README"), "features = nonsense")
            .await
            .unwrap();

        let config = load_drop_in_dir(dir.path()).await.unwrap();

        assert_eq!(config.is_enabled("content"), Some(false));
        assert_eq!(config.is_enabled("analytics"), Some(false));
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_drop_in_dir(&dir.path().join("config.toml.d"))
            .await
            .unwrap();
        assert!(config.is_empty());
    }
}
