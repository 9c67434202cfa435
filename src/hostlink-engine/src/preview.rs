//! The `features` command: resolve and validate without touching the host.

use hostlink_features::{
    CliLayer, DependencyValidator, FeatureRegistry, FeaturesConfig, LayerSource,
    LayeredConfigResolver, ValidationConflict,
};

use crate::error::Result;
use crate::exit_status::{EXIT_OK, EXIT_USAGE};

/// One feature as it would be activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub feature_id: String,
    pub report_key: String,
    pub label: String,
    pub enabled: bool,
    pub source: LayerSource,
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturePreview {
    pub entries: Vec<PreviewEntry>,
    pub conflicts: Vec<ValidationConflict>,
    pub exit_code: i32,
}

/// Resolve and validate. Unknown ids are an `Err`; conflicts are reported
/// in the preview with a usage exit code.
pub fn preview_features(
    registry: &FeatureRegistry,
    config: &FeaturesConfig,
    cli: &CliLayer,
) -> Result<FeaturePreview> {
    let set = LayeredConfigResolver::new(registry).resolve(config, cli)?;
    let conflicts = DependencyValidator::new(registry).validate(&set);

    let entries = registry
        .features()
        .iter()
        .map(|f| PreviewEntry {
            feature_id: f.id.clone(),
            report_key: f.report_key.clone(),
            label: f.label.clone(),
            enabled: set.is_enabled(&f.id),
            source: set.source_of(&f.id).unwrap_or(LayerSource::Default),
            requires: registry.dependencies_of(&f.id).to_vec(),
        })
        .collect();

    let exit_code = if conflicts.is_empty() {
        EXIT_OK
    } else {
        EXIT_USAGE
    };

    Ok(FeaturePreview {
        entries,
        conflicts,
        exit_code,
    })
}
