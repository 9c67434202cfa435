//! Structured (JSON) reports.
//!
//! These are the single source of truth for output; the text rendering in
//! the CLI is derived from the same structures.

use hostlink_features::FeatureRegistry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::preview::FeaturePreview;
use crate::result::{DisconnectResult, DisconnectStep, InvocationResult, StatusResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureReport {
    pub enabled: bool,
    pub successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `connect --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectReport {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname_error: Option<String>,
    pub uid: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid_error: Option<String>,
    pub rhsm_connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhsm_error: Option<String>,
    pub features: IndexMap<String, FeatureReport>,
}

impl ConnectReport {
    /// Features without an activation record (nothing was activated) are
    /// reported with their resolved value and `successful = false`.
    pub fn from_result(registry: &FeatureRegistry, result: &InvocationResult) -> Self {
        let features = registry
            .features()
            .iter()
            .map(|f| {
                let report = match result.record(&f.id) {
                    Some(record) => FeatureReport {
                        enabled: record.enabled,
                        successful: record.successful,
                        error: record.error.clone(),
                    },
                    None => FeatureReport {
                        enabled: result.features.is_enabled(&f.id),
                        successful: false,
                        error: None,
                    },
                };
                (f.report_key.clone(), report)
            })
            .collect();

        Self {
            hostname: result.hostname.clone(),
            hostname_error: result.hostname_error.clone(),
            uid: result.uid,
            uid_error: result.uid_error.clone(),
            rhsm_connected: result.registered(),
            rhsm_error: result.registration.error().map(str::to_string),
            features,
        }
    }
}

/// `disconnect --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisconnectReport {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname_error: Option<String>,
    pub uid: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid_error: Option<String>,
    pub rhsm_disconnected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhsm_disconnect_error: Option<String>,
    pub analytics_disconnected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics_disconnect_error: Option<String>,
    pub daemon_stopped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemon_stop_error: Option<String>,
}

impl DisconnectReport {
    pub fn from_result(result: &DisconnectResult) -> Self {
        let outcome = |step| {
            result
                .step(step)
                .map(|s| (s.successful, s.error.clone()))
                .unwrap_or((false, None))
        };
        let (rhsm_disconnected, rhsm_disconnect_error) = outcome(DisconnectStep::Rhsm);
        let (analytics_disconnected, analytics_disconnect_error) =
            outcome(DisconnectStep::Analytics);
        let (daemon_stopped, daemon_stop_error) = outcome(DisconnectStep::Daemon);

        Self {
            hostname: result.hostname.clone(),
            hostname_error: result.hostname_error.clone(),
            uid: result.uid,
            uid_error: result.uid_error.clone(),
            rhsm_disconnected,
            rhsm_disconnect_error,
            analytics_disconnected,
            analytics_disconnect_error,
            daemon_stopped,
            daemon_stop_error,
        }
    }
}

/// `status --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname_error: Option<String>,
    pub rhsm_connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhsm_error: Option<String>,
    pub content_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_error: Option<String>,
    pub analytics_connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics_error: Option<String>,
    pub daemon_running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemon_error: Option<String>,
}

impl StatusReport {
    pub fn from_result(result: &StatusResult) -> Self {
        Self {
            hostname: result.hostname.clone(),
            hostname_error: result.hostname_error.clone(),
            rhsm_connected: result.rhsm.active,
            rhsm_error: result.rhsm.error.clone(),
            content_enabled: result.content.active,
            content_error: result.content.error.clone(),
            analytics_connected: result.analytics.active,
            analytics_error: result.analytics.error.clone(),
            daemon_running: result.daemon.active,
            daemon_error: result.daemon.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturePreviewEntry {
    pub enabled: bool,
    pub source: String,
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConflict {
    pub feature: String,
    pub missing_dependency: String,
}

/// `features --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturesReport {
    pub features: IndexMap<String, FeaturePreviewEntry>,
    pub conflicts: Vec<PreviewConflict>,
}

impl FeaturesReport {
    pub fn from_preview(preview: &FeaturePreview) -> Self {
        Self {
            features: preview
                .entries
                .iter()
                .map(|e| {
                    (
                        e.report_key.clone(),
                        FeaturePreviewEntry {
                            enabled: e.enabled,
                            source: e.source.to_string(),
                            requires: e.requires.clone(),
                        },
                    )
                })
                .collect(),
            conflicts: preview
                .conflicts
                .iter()
                .map(|c| PreviewConflict {
                    feature: c.feature_id.clone(),
                    missing_dependency: c.missing_dependency_id.clone(),
                })
                .collect(),
        }
    }
}
