//! Error types for hostlink-features.

use std::path::PathBuf;
use thiserror::Error;

use crate::validator::ValidationConflict;

/// Errors raised while building the feature registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two features share an id.
    #[error("Duplicate feature id: {0}")]
    DuplicateFeature(String),

    /// An edge mentions an id that is not in the catalog.
    #[error("Dependency edge {feature} -> {dependency} references unknown feature '{unknown}'")]
    UnknownEdgeEndpoint {
        feature: String,
        dependency: String,
        unknown: String,
    },

    /// The edge list contains a cycle.
    #[error("Circular feature dependency detected: {path}")]
    CircularDependency { path: String },
}

/// Errors raised while loading drop-in feature configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a configuration file or directory.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse TOML in '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A feature key holds something other than a boolean.
    #[error("Invalid value for feature '{key}' in '{path}': expected a boolean, found {found}")]
    InvalidValue {
        path: PathBuf,
        key: String,
        found: String,
    },

    /// The `features` key is not a table.
    #[error("Invalid 'features' entry in '{path}': expected a table")]
    NotATable { path: PathBuf },
}

/// Errors raised while collecting the CLI override layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// `--enable-feature` or `--disable-feature` named an unknown feature.
    #[error("cannot {action} feature \"{id}\": no such feature exists ({valid})", valid = .valid.join(","))]
    UnknownFeature {
        action: &'static str,
        id: String,
        valid: Vec<String>,
    },

    /// The same feature was both enabled and disabled on the command line.
    #[error("feature \"{0}\" cannot be both enabled and disabled")]
    ContradictoryOverride(String),
}

/// The resolved feature set enables a feature whose dependency is disabled.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", render_conflicts(.conflicts))]
pub struct DependencyConflictError {
    pub conflicts: Vec<ValidationConflict>,
}

fn render_conflicts(conflicts: &[ValidationConflict]) -> String {
    conflicts
        .iter()
        .map(|c| {
            format!(
                "cannot enable feature \"{}\": required feature \"{}\" is disabled",
                c.feature_id, c.missing_dependency_id
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_feature_message_lists_valid_ids() {
        let err = ResolveError::UnknownFeature {
            action: "enable",
            id: "nonexistent-feature".to_string(),
            valid: vec![
                "content".to_string(),
                "analytics".to_string(),
                "remote-management".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "cannot enable feature \"nonexistent-feature\": no such feature exists (content,analytics,remote-management)"
        );
    }

    #[test]
    fn test_conflict_message_names_every_pair() {
        let err = DependencyConflictError {
            conflicts: vec![
                ValidationConflict::new("analytics", "content"),
                ValidationConflict::new("remote-management", "content"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("\"analytics\": required feature \"content\""));
        assert!(msg.contains("\"remote-management\": required feature \"content\""));
    }
}
