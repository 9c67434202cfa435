//! Feature definitions.

use serde::{Deserialize, Serialize};

/// Identifiers of the built-in features.
pub mod ids {
    /// Access to vendor content repositories.
    pub const CONTENT: &str = "content";
    /// Telemetry data collection.
    pub const ANALYTICS: &str = "analytics";
    /// Remote management through the background daemon.
    pub const REMOTE_MANAGEMENT: &str = "remote-management";
}

/// A feature that can be enabled/disabled during `connect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature ID, as accepted by `--enable-feature`.
    pub id: String,
    /// Key used in the drop-in `features` table.
    pub config_key: String,
    /// Key used in the structured report.
    pub report_key: String,
    /// Display name.
    pub label: String,
    /// Description.
    pub description: String,
}

impl Feature {
    /// Create a feature whose config key equals its id and whose report key
    /// is the id in snake case.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            config_key: id.clone(),
            report_key: id.replace('-', "_"),
            id,
            label: label.into(),
            description: String::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn config_key(mut self, key: impl Into<String>) -> Self {
        self.config_key = key.into();
        self
    }

    pub fn report_key(mut self, key: impl Into<String>) -> Self {
        self.report_key = key.into();
        self
    }
}

/// `feature` can only be enabled when `dependency` is enabled too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub feature: String,
    pub dependency: String,
}

impl DependencyEdge {
    pub fn requires(feature: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            dependency: dependency.into(),
        }
    }
}
