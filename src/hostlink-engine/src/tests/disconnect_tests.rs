//! Tests for the disconnect and status pipelines.

use pretty_assertions::assert_eq;

use super::fakes::{FakeHost, root_env};
use crate::config::ServiceLayout;
use crate::disconnect::DisconnectPipeline;
use crate::environment::HostEnvironment;
use crate::exit_status::{EXIT_FAILURE, EXIT_OK};
use crate::report::{DisconnectReport, StatusReport};
use crate::result::DisconnectStep;
use crate::status::StatusPipeline;

fn connected_host(fail_unregister: bool) -> FakeHost {
    FakeHost::build(|subscription, analytics, services| {
        *subscription.registered.lock().unwrap() = true;
        *subscription.manage_repos.lock().unwrap() = true;
        *analytics.registered.lock().unwrap() = true;
        analytics.fail_unregister = fail_unregister;
        services
            .active
            .lock()
            .unwrap()
            .insert(ServiceLayout::default().daemon_unit);
    })
}

#[tokio::test]
async fn test_disconnect_undoes_everything() {
    let host = connected_host(false);
    let env = root_env();
    let result = DisconnectPipeline::new(&env, host.collaborators()).run().await;

    assert_eq!(result.exit_code, EXIT_OK);
    assert!(result.steps.iter().all(|s| s.successful && !s.skipped));
    assert_eq!(
        host.calls(),
        vec![
            "systemd:disable --now yggdrasil.service",
            "systemd:disable --now rhc-canonical-facts.timer",
            "insights:unregister",
            "rhsm:identity",
            "rhsm:unregister",
        ]
    );
}

#[tokio::test]
async fn test_disconnect_skips_what_is_not_connected() {
    let host = FakeHost::new();
    let env = root_env();
    let result = DisconnectPipeline::new(&env, host.collaborators()).run().await;

    assert_eq!(result.exit_code, EXIT_OK);
    assert!(result.steps.iter().all(|s| s.successful && s.skipped));
    assert_eq!(host.calls(), vec!["rhsm:identity"]);
}

#[tokio::test]
async fn test_failed_step_does_not_stop_later_steps() {
    let host = connected_host(true);
    let env = root_env();
    let result = DisconnectPipeline::new(&env, host.collaborators()).run().await;

    assert_eq!(result.exit_code, EXIT_FAILURE);
    assert!(!result.step(DisconnectStep::Analytics).unwrap().successful);
    assert!(result.step(DisconnectStep::Rhsm).unwrap().successful);

    let report = DisconnectReport::from_result(&result);
    assert!(report.daemon_stopped);
    assert!(!report.analytics_disconnected);
    assert!(report.analytics_disconnect_error.is_some());
    assert!(report.rhsm_disconnected);
}

#[tokio::test]
async fn test_disconnect_requires_root() {
    let host = connected_host(false);
    let env = HostEnvironment::new("host.example.com", 1000, ServiceLayout::default());
    let result = DisconnectPipeline::new(&env, host.collaborators()).run().await;

    assert_eq!(result.exit_code, EXIT_FAILURE);
    assert!(result.uid_error.is_some());
    assert!(result.steps.is_empty());
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_status_of_connected_host() {
    let host = connected_host(false);
    let env = root_env();
    let result = StatusPipeline::new(&env, host.collaborators()).run().await;

    assert_eq!(result.exit_code, EXIT_OK);
    let report = StatusReport::from_result(&result);
    assert!(report.rhsm_connected);
    assert!(report.content_enabled);
    assert!(report.analytics_connected);
    assert!(report.daemon_running);
}

#[tokio::test]
async fn test_status_of_disconnected_host() {
    let host = FakeHost::new();
    let env = root_env();
    let result = StatusPipeline::new(&env, host.collaborators()).run().await;

    assert_eq!(result.exit_code, EXIT_FAILURE);
    let json = serde_json::to_value(StatusReport::from_result(&result)).unwrap();
    assert_eq!(json["rhsm_connected"], false);
    assert_eq!(json["daemon_running"], false);
    assert!(json.get("rhsm_error").is_none());
}
