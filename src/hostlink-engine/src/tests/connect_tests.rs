//! Tests for the connect pipeline.

use hostlink_features::{CliLayer, FeatureRegistry, FeaturesConfig};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use super::fakes::{FakeHost, root_env};
use crate::config::ServiceLayout;
use crate::connect::{ConnectPipeline, ConnectRequest, ConnectStage};
use crate::credentials::CredentialArgs;
use crate::environment::HostEnvironment;
use crate::error::EngineError;
use crate::exit_status::{EXIT_FAILURE, EXIT_OK, EXIT_USAGE, RegistrationOutcome};
use crate::orchestrator::OrchestratorOptions;
use crate::report::ConnectReport;

fn password_args() -> CredentialArgs {
    CredentialArgs {
        username: Some("admin".to_string()),
        password: Some("secret".to_string()),
        ..Default::default()
    }
}

fn request(config: &[(&str, bool)], enable: &[&str], disable: &[&str]) -> ConnectRequest {
    let mut features_config = FeaturesConfig::new();
    for (key, enabled) in config {
        features_config.set_enabled(key, *enabled);
    }
    ConnectRequest {
        credentials: password_args(),
        features_config,
        cli: CliLayer::new(
            enable.iter().map(|s| s.to_string()).collect(),
            disable.iter().map(|s| s.to_string()).collect(),
        ),
    }
}

async fn run(
    host: &FakeHost,
    env: &HostEnvironment,
    request: &ConnectRequest,
) -> crate::error::Result<crate::result::InvocationResult> {
    let registry = FeatureRegistry::builtin().unwrap();
    ConnectPipeline::new(&registry, env, host.collaborators(), CancellationToken::new())
        .run(request)
        .await
}

#[tokio::test]
async fn test_all_features_enabled_in_config() {
    let host = FakeHost::new();
    let env = root_env();
    let registry = FeatureRegistry::builtin().unwrap();
    let result = ConnectPipeline::new(&registry, &env, host.collaborators(), CancellationToken::new())
        .with_options(OrchestratorOptions::default().with_max_parallel(1))
        .run(&request(
            &[
                ("content", true),
                ("analytics", true),
                ("remote-management", true),
            ],
            &[],
            &[],
        ))
        .await
        .unwrap();

    assert_eq!(result.exit_code, EXIT_OK);
    assert!(result.registered());
    assert_eq!(result.activation_records.len(), 3);
    assert!(
        result
            .activation_records
            .iter()
            .all(|r| r.enabled && r.successful)
    );
    assert!(host.daemon_active());
    assert_eq!(
        host.calls(),
        vec![
            "rhsm:identity",
            "rhsm:register content=true",
            "rhsm:manage_repos=1",
            "rhsm:refresh",
            "insights:register",
            "systemd:enable --now rhc-canonical-facts.timer",
            "systemd:start rhc-canonical-facts.service",
            "systemd:enable --now yggdrasil.service",
        ]
    );
}

#[tokio::test]
async fn test_remote_management_disabled_leaves_daemon_alone() {
    let host = FakeHost::new();
    let env = root_env();
    let result = run(&host, &env, &request(&[("remote-management", false)], &[], &[]))
        .await
        .unwrap();

    assert_eq!(result.exit_code, EXIT_OK);
    let rm = result.record("remote-management").unwrap();
    assert!(!rm.enabled);
    assert!(rm.successful);
    assert!(result.record("content").unwrap().enabled);
    assert!(result.record("analytics").unwrap().enabled);
    assert!(!host.daemon_active());
    assert!(!host.calls().iter().any(|c| c.starts_with("systemd:")));
}

#[tokio::test]
async fn test_dependency_conflict_has_no_side_effects() {
    let host = FakeHost::new();
    let env = root_env();
    let registry = FeatureRegistry::builtin().unwrap();
    let mut pipeline =
        ConnectPipeline::new(&registry, &env, host.collaborators(), CancellationToken::new());

    let err = pipeline
        .run(&request(
            &[("content", false), ("remote-management", true)],
            &[],
            &[],
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::DependencyConflict(ref c)
        if c.conflicts.iter().any(|c| c.feature_id == "remote-management" && c.missing_dependency_id == "content")));
    assert_eq!(err.exit_code(), EXIT_USAGE);
    assert_eq!(pipeline.stage(), ConnectStage::ValidationFailed);
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_cli_enable_resolves_config_conflict() {
    let host = FakeHost::new();
    let env = root_env();
    let result = run(
        &host,
        &env,
        &request(
            &[("content", false), ("remote-management", true)],
            &["content"],
            &[],
        ),
    )
    .await
    .unwrap();

    assert_eq!(result.exit_code, EXIT_OK);
    assert!(result.registered());
    assert!(
        result
            .activation_records
            .iter()
            .all(|r| r.enabled && r.successful)
    );
}

#[tokio::test]
async fn test_unknown_feature_is_rejected_before_anything_else() {
    let host = FakeHost::new();
    let env = root_env();
    let err = run(&host, &env, &request(&[], &["nonexistent-feature"], &[]))
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), EXIT_USAGE);
    assert!(err.to_string().contains("nonexistent-feature"));
    assert!(
        err.to_string()
            .contains("(content,analytics,remote-management)")
    );
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_masked_daemon_does_not_block_other_features() {
    let host = FakeHost::build(|_, _, services| {
        services.masked.insert("yggdrasil.service".to_string());
    });
    let env = root_env();
    let result = run(&host, &env, &request(&[], &[], &[])).await.unwrap();

    assert_eq!(result.exit_code, EXIT_FAILURE);
    assert!(result.registered());
    assert!(result.record("content").unwrap().successful);
    assert!(result.record("analytics").unwrap().successful);

    let rm = result.record("remote-management").unwrap();
    assert!(rm.enabled);
    assert!(!rm.successful);
    assert!(rm.error.as_deref().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn test_rejected_credentials_abort_activation() {
    let host = FakeHost::build(|subscription, _, _| {
        subscription.reject_credentials = true;
    });
    let env = root_env();
    let result = run(&host, &env, &request(&[], &[], &[])).await.unwrap();

    assert_eq!(result.exit_code, EXIT_FAILURE);
    assert!(matches!(result.registration, RegistrationOutcome::Failed(_)));
    assert!(result.activation_records.is_empty());
    assert_eq!(
        host.calls(),
        vec!["rhsm:identity", "rhsm:register content=true"]
    );
}

#[tokio::test]
async fn test_already_connected_is_usage_error() {
    let host = FakeHost::build(|subscription, _, _| {
        *subscription.registered.lock().unwrap() = true;
    });
    let env = root_env();
    let err = run(&host, &env, &request(&[], &[], &[])).await.unwrap_err();

    assert!(matches!(err, EngineError::AlreadyConnected));
    assert_eq!(err.exit_code(), EXIT_USAGE);
    assert_eq!(host.calls(), vec!["rhsm:identity"]);
}

#[tokio::test]
async fn test_non_root_is_generic_failure() {
    let host = FakeHost::new();
    let env = HostEnvironment::new("host.example.com", 1000, ServiceLayout::default());
    let result = run(&host, &env, &request(&[], &[], &[])).await.unwrap();

    assert_eq!(result.exit_code, EXIT_FAILURE);
    assert!(result.uid_error.is_some());
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_credential_conflict_precedes_root_check() {
    let host = FakeHost::new();
    let env = HostEnvironment::new("host.example.com", 1000, ServiceLayout::default());
    let mut req = request(&[], &[], &[]);
    req.credentials.activation_keys = vec!["key".to_string()];

    let err = run(&host, &env, &req).await.unwrap_err();
    assert_eq!(err.exit_code(), EXIT_USAGE);
}

#[tokio::test]
async fn test_content_disabled_turns_off_repo_management() {
    let host = FakeHost::new();
    let env = root_env();
    let result = run(
        &host,
        &env,
        &request(
            &[
                ("content", false),
                ("analytics", false),
                ("remote-management", false),
            ],
            &[],
            &[],
        ),
    )
    .await
    .unwrap();

    assert_eq!(result.exit_code, EXIT_OK);
    let calls = host.calls();
    assert!(calls.contains(&"rhsm:register content=false".to_string()));
    assert!(calls.contains(&"rhsm:manage_repos=0".to_string()));
    assert!(!calls.contains(&"insights:register".to_string()));
}

#[tokio::test]
async fn test_json_report_matches_resolved_set() {
    let host = FakeHost::new();
    let env = root_env();
    let registry = FeatureRegistry::builtin().unwrap();
    let result = ConnectPipeline::new(&registry, &env, host.collaborators(), CancellationToken::new())
        .run(&request(&[("remote-management", false)], &[], &[]))
        .await
        .unwrap();

    let json = serde_json::to_string(&ConnectReport::from_result(&registry, &result)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed["hostname"], "host.example.com");
    assert_eq!(parsed["uid"], 0);
    assert_eq!(parsed["rhsm_connected"], true);
    for feature in registry.features() {
        assert_eq!(
            parsed["features"][&feature.report_key]["enabled"],
            result.features.is_enabled(&feature.id),
            "{}",
            feature.id
        );
    }
    assert_eq!(parsed["features"]["remote_management"]["successful"], true);
}
