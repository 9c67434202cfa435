//! Terminal results of the engine pipelines.

use hostlink_features::EffectiveFeatureSet;
use serde::{Deserialize, Serialize};

use crate::error::ActivationError;
use crate::exit_status::RegistrationOutcome;

/// Outcome of activating (or deactivating) one feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationRecord {
    pub feature_id: String,
    /// Resolved value, independent of `successful`.
    pub enabled: bool,
    pub successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActivationRecord {
    pub fn succeeded(feature_id: impl Into<String>, enabled: bool) -> Self {
        Self {
            feature_id: feature_id.into(),
            enabled,
            successful: true,
            error: None,
        }
    }

    pub fn failed(enabled: bool, error: &ActivationError) -> Self {
        Self {
            feature_id: error.feature().to_string(),
            enabled,
            successful: false,
            error: Some(error.to_string()),
        }
    }
}

/// Everything `connect` learned, handed to the reporter.
#[derive(Debug, Clone)]
pub struct InvocationResult {
    pub hostname: String,
    pub hostname_error: Option<String>,
    pub uid: u32,
    pub uid_error: Option<String>,
    pub registration: RegistrationOutcome,
    /// The set that drove activation.
    pub features: EffectiveFeatureSet,
    pub activation_records: Vec<ActivationRecord>,
    pub exit_code: i32,
}

impl InvocationResult {
    pub fn registered(&self) -> bool {
        self.registration.is_registered()
    }

    pub fn record(&self, feature_id: &str) -> Option<&ActivationRecord> {
        self.activation_records
            .iter()
            .find(|r| r.feature_id == feature_id)
    }
}

/// Outcome of one `disconnect` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: DisconnectStep,
    /// Nothing to undo; the step did not call its collaborator.
    pub skipped: bool,
    pub successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectStep {
    /// Stop and disable the management daemon.
    Daemon,
    /// Unregister from the analytics service.
    Analytics,
    /// Unregister from the subscription service.
    Rhsm,
}

impl DisconnectStep {
    pub fn label(&self) -> &'static str {
        match self {
            DisconnectStep::Daemon => "remote management",
            DisconnectStep::Analytics => "analytics",
            DisconnectStep::Rhsm => "subscription service",
        }
    }
}

/// Everything `disconnect` learned.
#[derive(Debug, Clone)]
pub struct DisconnectResult {
    pub hostname: String,
    pub hostname_error: Option<String>,
    pub uid: u32,
    pub uid_error: Option<String>,
    pub steps: Vec<StepRecord>,
    pub exit_code: i32,
}

impl DisconnectResult {
    pub fn step(&self, step: DisconnectStep) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.step == step)
    }
}

/// One queried facet of `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub active: bool,
    pub error: Option<String>,
}

impl Facet {
    pub fn from_query<E: std::fmt::Display>(result: std::result::Result<bool, E>) -> Self {
        match result {
            Ok(active) => Self {
                active,
                error: None,
            },
            Err(e) => Self {
                active: false,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.active && self.error.is_none()
    }
}

/// Everything `status` learned.
#[derive(Debug, Clone)]
pub struct StatusResult {
    pub hostname: String,
    pub hostname_error: Option<String>,
    pub rhsm: Facet,
    pub content: Facet,
    pub analytics: Facet,
    pub daemon: Facet,
    pub exit_code: i32,
}
