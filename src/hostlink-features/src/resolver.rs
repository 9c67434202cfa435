//! Layered feature resolution.
//!
//! Three layers are combined feature by feature, the most specific winning:
//! built-in default (every feature enabled) < drop-in config < CLI overrides.
//! The resolver never derives one feature from another; inconsistent sets are
//! left for [`crate::DependencyValidator`] to reject.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::FeaturesConfig;
use crate::error::ResolveError;
use crate::registry::FeatureRegistry;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerSource {
    Default,
    ConfigFile,
    Cli,
}

impl LayerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerSource::Default => "default",
            LayerSource::ConfigFile => "config-file",
            LayerSource::Cli => "cli",
        }
    }
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One feature's value in one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerValue {
    pub feature_id: String,
    pub enabled: bool,
    pub source: LayerSource,
}

impl LayerValue {
    fn new(feature_id: impl Into<String>, enabled: bool, source: LayerSource) -> Self {
        Self {
            feature_id: feature_id.into(),
            enabled,
            source,
        }
    }
}

/// Feature ids passed with `--enable-feature` / `--disable-feature`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliLayer {
    pub enable: Vec<String>,
    pub disable: Vec<String>,
}

impl CliLayer {
    pub fn new(enable: Vec<String>, disable: Vec<String>) -> Self {
        Self { enable, disable }
    }

    pub fn is_empty(&self) -> bool {
        self.enable.is_empty() && self.disable.is_empty()
    }
}

/// The merged result: exactly one value per known feature, in registry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveFeatureSet {
    values: IndexMap<String, LayerValue>,
}

impl EffectiveFeatureSet {
    /// Resolved value of a feature. Unknown ids resolve to `false`.
    pub fn is_enabled(&self, feature_id: &str) -> bool {
        self.values.get(feature_id).is_some_and(|v| v.enabled)
    }

    /// The layer that produced a feature's value.
    pub fn source_of(&self, feature_id: &str) -> Option<LayerSource> {
        self.values.get(feature_id).map(|v| v.source)
    }

    pub fn get(&self, feature_id: &str) -> Option<&LayerValue> {
        self.values.get(feature_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerValue> {
        self.values.values()
    }

    /// Ids of enabled features, in registry order.
    pub fn enabled_ids(&self) -> Vec<&str> {
        self.values
            .values()
            .filter(|v| v.enabled)
            .map(|v| v.feature_id.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Merges default, config-file and CLI layers against a registry.
#[derive(Debug, Clone, Copy)]
pub struct LayeredConfigResolver<'a> {
    registry: &'a FeatureRegistry,
}

impl<'a> LayeredConfigResolver<'a> {
    pub fn new(registry: &'a FeatureRegistry) -> Self {
        Self { registry }
    }

    /// Every feature enabled.
    pub fn default_layer(&self) -> Vec<LayerValue> {
        self.registry
            .features()
            .iter()
            .map(|f| LayerValue::new(&f.id, true, LayerSource::Default))
            .collect()
    }

    /// Values from the drop-in config, matched on each feature's config key.
    /// Keys that match no feature are logged and dropped.
    pub fn config_layer(&self, config: &FeaturesConfig) -> Vec<LayerValue> {
        for key in config.overrides.keys() {
            if !self.registry.features().iter().any(|f| &f.config_key == key) {
                tracing::warn!("Ignoring unknown feature '{}' in drop-in configuration", key);
            }
        }
        self.registry
            .features()
            .iter()
            .filter_map(|f| {
                config
                    .is_enabled(&f.config_key)
                    .map(|enabled| LayerValue::new(&f.id, enabled, LayerSource::ConfigFile))
            })
            .collect()
    }

    /// Validate CLI overrides. Every id is checked before any value is
    /// produced; the first unknown id aborts collection.
    pub fn cli_layer(&self, cli: &CliLayer) -> Result<Vec<LayerValue>, ResolveError> {
        for (action, ids) in [("enable", &cli.enable), ("disable", &cli.disable)] {
            if let Some(unknown) = ids.iter().find(|id| !self.registry.is_known(id)) {
                return Err(ResolveError::UnknownFeature {
                    action,
                    id: unknown.clone(),
                    valid: self.registry.known_ids(),
                });
            }
        }

        if let Some(both) = cli.enable.iter().find(|id| cli.disable.contains(id)) {
            return Err(ResolveError::ContradictoryOverride(both.clone()));
        }

        let enabled = cli
            .enable
            .iter()
            .map(|id| LayerValue::new(id, true, LayerSource::Cli));
        let disabled = cli
            .disable
            .iter()
            .map(|id| LayerValue::new(id, false, LayerSource::Cli));
        Ok(enabled.chain(disabled).collect())
    }

    /// Merge all three layers into one value per feature.
    pub fn resolve(
        &self,
        config: &FeaturesConfig,
        cli: &CliLayer,
    ) -> Result<EffectiveFeatureSet, ResolveError> {
        let cli_values = self.cli_layer(cli)?;

        let mut values: IndexMap<String, LayerValue> = self
            .default_layer()
            .into_iter()
            .map(|v| (v.feature_id.clone(), v))
            .collect();

        for value in self.config_layer(config).into_iter().chain(cli_values) {
            if let Some(slot) = values.get_mut(&value.feature_id) {
                *slot = value;
            }
        }

        for value in values.values() {
            tracing::debug!(
                "Feature '{}' resolved to {} ({})",
                value.feature_id,
                value.enabled,
                value.source
            );
        }

        Ok(EffectiveFeatureSet { values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Feature;
    use pretty_assertions::assert_eq;

    fn registry() -> FeatureRegistry {
        FeatureRegistry::builtin().unwrap()
    }

    fn config(pairs: &[(&str, bool)]) -> FeaturesConfig {
        let mut config = FeaturesConfig::new();
        for (key, enabled) in pairs {
            config.set_enabled(key, *enabled);
        }
        config
    }

    #[test]
    fn test_defaults_enable_everything() {
        let registry = registry();
        let set = LayeredConfigResolver::new(&registry)
            .resolve(&FeaturesConfig::default(), &CliLayer::default())
            .unwrap();

        assert_eq!(set.len(), 3);
        assert!(set.iter().all(|v| v.enabled && v.source == LayerSource::Default));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let registry = registry();
        let set = LayeredConfigResolver::new(&registry)
            .resolve(&config(&[("remote-management", false)]), &CliLayer::default())
            .unwrap();

        assert!(set.is_enabled("content"));
        assert!(set.is_enabled("analytics"));
        assert!(!set.is_enabled("remote-management"));
        assert_eq!(set.source_of("content"), Some(LayerSource::Default));
        assert_eq!(
            set.source_of("remote-management"),
            Some(LayerSource::ConfigFile)
        );
    }

    #[test]
    fn test_cli_wins_over_config() {
        let registry = registry();
        let set = LayeredConfigResolver::new(&registry)
            .resolve(
                &config(&[("remote-management", false)]),
                &CliLayer::new(vec!["remote-management".to_string()], Vec::new()),
            )
            .unwrap();

        assert!(set.is_enabled("remote-management"));
        assert_eq!(set.source_of("remote-management"), Some(LayerSource::Cli));
    }

    #[test]
    fn test_cli_does_not_cascade() {
        let registry = registry();
        let set = LayeredConfigResolver::new(&registry)
            .resolve(
                &FeaturesConfig::default(),
                &CliLayer::new(Vec::new(), vec!["content".to_string()]),
            )
            .unwrap();

        assert!(!set.is_enabled("content"));
        assert!(set.is_enabled("analytics"));
        assert!(set.is_enabled("remote-management"));
    }

    #[test]
    fn test_unknown_cli_id_is_rejected() {
        let registry = registry();
        let err = LayeredConfigResolver::new(&registry)
            .resolve(
                &FeaturesConfig::default(),
                &CliLayer::new(Vec::new(), vec!["nonexistent-feature".to_string()]),
            )
            .unwrap_err();

        assert_eq!(
            err,
            ResolveError::UnknownFeature {
                action: "disable",
                id: "nonexistent-feature".to_string(),
                valid: vec![
                    "content".to_string(),
                    "analytics".to_string(),
                    "remote-management".to_string()
                ],
            }
        );
    }

    #[test]
    fn test_unknown_id_reported_before_contradiction() {
        let registry = registry();
        let err = LayeredConfigResolver::new(&registry)
            .cli_layer(&CliLayer::new(
                vec!["content".to_string()],
                vec!["content".to_string(), "bogus".to_string()],
            ))
            .unwrap_err();

        assert!(matches!(err, ResolveError::UnknownFeature { ref id, .. } if id == "bogus"));
    }

    #[test]
    fn test_enable_and_disable_same_feature() {
        let registry = registry();
        let err = LayeredConfigResolver::new(&registry)
            .cli_layer(&CliLayer::new(
                vec!["analytics".to_string()],
                vec!["analytics".to_string()],
            ))
            .unwrap_err();

        assert_eq!(err, ResolveError::ContradictoryOverride("analytics".to_string()));
    }

    #[test]
    fn test_unknown_config_key_is_ignored() {
        let registry = registry();
        let set = LayeredConfigResolver::new(&registry)
            .resolve(&config(&[("telemetry", false)]), &CliLayer::default())
            .unwrap();

        assert!(set.get("telemetry").is_none());
        assert!(set.iter().all(|v| v.enabled));
    }

    #[test]
    fn test_config_key_differs_from_id() {
        let registry = FeatureRegistry::new(
            vec![
                Feature::new("content", "Content"),
                Feature::new("analytics", "Analytics").config_key("insights"),
            ],
            Vec::new(),
        )
        .unwrap();
        let set = LayeredConfigResolver::new(&registry)
            .resolve(&config(&[("insights", false)]), &CliLayer::default())
            .unwrap();

        assert!(!set.is_enabled("analytics"));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let registry = registry();
        let resolver = LayeredConfigResolver::new(&registry);
        let cfg = config(&[("content", false), ("analytics", false)]);
        let cli = CliLayer::new(vec!["content".to_string()], Vec::new());

        assert_eq!(
            resolver.resolve(&cfg, &cli).unwrap(),
            resolver.resolve(&cfg, &cli).unwrap()
        );
    }
}
