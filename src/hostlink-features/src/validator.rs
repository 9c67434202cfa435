//! Dependency validation over a resolved feature set.

use serde::{Deserialize, Serialize};

use crate::error::DependencyConflictError;
use crate::registry::FeatureRegistry;
use crate::resolver::EffectiveFeatureSet;

/// An enabled feature whose dependency resolved to disabled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationConflict {
    #[serde(rename = "feature")]
    pub feature_id: String,
    #[serde(rename = "missing_dependency")]
    pub missing_dependency_id: String,
}

impl ValidationConflict {
    pub fn new(feature_id: impl Into<String>, missing_dependency_id: impl Into<String>) -> Self {
        Self {
            feature_id: feature_id.into(),
            missing_dependency_id: missing_dependency_id.into(),
        }
    }
}

/// Checks `enabled(f) => enabled(d)` for every edge `f -> d`.
#[derive(Debug, Clone, Copy)]
pub struct DependencyValidator<'a> {
    registry: &'a FeatureRegistry,
}

impl<'a> DependencyValidator<'a> {
    pub fn new(registry: &'a FeatureRegistry) -> Self {
        Self { registry }
    }

    /// One conflict per violated edge, in registry order. Which layer set a
    /// value does not matter.
    pub fn validate(&self, set: &EffectiveFeatureSet) -> Vec<ValidationConflict> {
        let mut conflicts = Vec::new();
        for feature in self.registry.features() {
            if !set.is_enabled(&feature.id) {
                continue;
            }
            for dependency in self.registry.dependencies_of(&feature.id) {
                if !set.is_enabled(dependency) {
                    tracing::warn!(
                        "Feature '{}' requires '{}', which is disabled",
                        feature.id,
                        dependency
                    );
                    conflicts.push(ValidationConflict::new(&feature.id, dependency));
                }
            }
        }
        conflicts
    }

    /// Like [`Self::validate`], but as a `Result` carrying every conflict.
    pub fn ensure_consistent(&self, set: &EffectiveFeatureSet) -> Result<(), DependencyConflictError> {
        let conflicts = self.validate(set);
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(DependencyConflictError { conflicts })
        }
    }
}
