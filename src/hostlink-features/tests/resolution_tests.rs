//! End-to-end resolution tests: drop-in files on disk, CLI overrides,
//! dependency validation.

use std::path::Path;

use hostlink_features::{
    CliLayer, DependencyValidator, FeatureRegistry, LayerSource, LayeredConfigResolver,
    ResolveError, ValidationConflict, load_drop_in_dir,
};
use pretty_assertions::assert_eq;

// ============================================================================
// HELPERS
// ============================================================================

async fn write_drop_in(dir: &Path, name: &str, body: &str) {
    tokio::fs::write(dir.join(name), body).await.unwrap();
}

fn cli(enable: &[&str], disable: &[&str]) -> CliLayer {
    CliLayer::new(
        enable.iter().map(|s| s.to_string()).collect(),
        disable.iter().map(|s| s.to_string()).collect(),
    )
}

fn enabled_map(
    registry: &FeatureRegistry,
    set: &hostlink_features::EffectiveFeatureSet,
) -> Vec<(String, bool)> {
    registry
        .features()
        .iter()
        .map(|f| (f.report_key.clone(), set.is_enabled(&f.id)))
        .collect()
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[tokio::test]
async fn test_everything_enabled_in_config() {
    let dir = tempfile::tempdir().unwrap();
    write_drop_in(
        dir.path(),
        "01-features.toml",
        r#"features = { "content" = true, "analytics" = true, "remote-management" = true }"#,
    )
    .await;

    let registry = FeatureRegistry::builtin().unwrap();
    let config = load_drop_in_dir(dir.path()).await.unwrap();
    let set = LayeredConfigResolver::new(&registry)
        .resolve(&config, &CliLayer::default())
        .unwrap();

    assert!(DependencyValidator::new(&registry).validate(&set).is_empty());
    assert!(set.iter().all(|v| v.enabled && v.source == LayerSource::ConfigFile));
}

#[tokio::test]
async fn test_remote_management_disabled_in_config() {
    let dir = tempfile::tempdir().unwrap();
    write_drop_in(
        dir.path(),
        "01-features.toml",
        r#"features = { "remote-management" = false }"#,
    )
    .await;

    let registry = FeatureRegistry::builtin().unwrap();
    let config = load_drop_in_dir(dir.path()).await.unwrap();
    let set = LayeredConfigResolver::new(&registry)
        .resolve(&config, &CliLayer::default())
        .unwrap();

    assert!(DependencyValidator::new(&registry).validate(&set).is_empty());
    assert_eq!(
        enabled_map(&registry, &set),
        vec![
            ("content".to_string(), true),
            ("analytics".to_string(), true),
            ("remote_management".to_string(), false),
        ]
    );
}

#[tokio::test]
async fn test_content_disabled_with_remote_management_enabled_conflicts() {
    let dir = tempfile::tempdir().unwrap();
    write_drop_in(
        dir.path(),
        "01-features.toml",
        r#"features = { "content" = false, "remote-management" = true }"#,
    )
    .await;

    let registry = FeatureRegistry::builtin().unwrap();
    let config = load_drop_in_dir(dir.path()).await.unwrap();
    let set = LayeredConfigResolver::new(&registry)
        .resolve(&config, &CliLayer::default())
        .unwrap();

    let conflicts = DependencyValidator::new(&registry).validate(&set);
    assert!(conflicts.contains(&ValidationConflict::new("remote-management", "content")));
    assert!(conflicts.contains(&ValidationConflict::new("analytics", "content")));
}

#[tokio::test]
async fn test_cli_enable_repairs_config_conflict() {
    let dir = tempfile::tempdir().unwrap();
    write_drop_in(
        dir.path(),
        "01-features.toml",
        r#"features = { "content" = false, "remote-management" = true }"#,
    )
    .await;

    let registry = FeatureRegistry::builtin().unwrap();
    let config = load_drop_in_dir(dir.path()).await.unwrap();
    let set = LayeredConfigResolver::new(&registry)
        .resolve(&config, &cli(&["content"], &[]))
        .unwrap();

    assert!(DependencyValidator::new(&registry).validate(&set).is_empty());
    assert!(set.iter().all(|v| v.enabled));
    assert_eq!(set.source_of("content"), Some(LayerSource::Cli));
}

#[tokio::test]
async fn test_later_drop_in_overrides_earlier() {
    let dir = tempfile::tempdir().unwrap();
    write_drop_in(dir.path(), "01-features.toml", r#"features = { "analytics" = false }"#).await;
    write_drop_in(dir.path(), "99-local.toml", r#"features = { "analytics" = true }"#).await;

    let registry = FeatureRegistry::builtin().unwrap();
    let config = load_drop_in_dir(dir.path()).await.unwrap();
    let set = LayeredConfigResolver::new(&registry)
        .resolve(&config, &CliLayer::default())
        .unwrap();

    assert!(set.is_enabled("analytics"));
}

#[test]
fn test_unknown_enable_lists_valid_ids() {
    let registry = FeatureRegistry::builtin().unwrap();
    let err = LayeredConfigResolver::new(&registry)
        .resolve(&Default::default(), &cli(&["nonexistent-feature"], &[]))
        .unwrap_err();

    assert!(matches!(err, ResolveError::UnknownFeature { .. }));
    let msg = err.to_string();
    assert!(msg.contains("nonexistent-feature"));
    assert!(msg.contains("content,analytics,remote-management"));
}

#[test]
fn test_cli_disable_of_dependency_conflicts_with_defaults() {
    let registry = FeatureRegistry::builtin().unwrap();
    let set = LayeredConfigResolver::new(&registry)
        .resolve(&Default::default(), &cli(&[], &["analytics"]))
        .unwrap();

    let err = DependencyValidator::new(&registry)
        .ensure_consistent(&set)
        .unwrap_err();
    assert_eq!(
        err.conflicts,
        vec![ValidationConflict::new("remote-management", "analytics")]
    );
}
