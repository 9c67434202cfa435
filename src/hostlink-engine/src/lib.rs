//! Hostlink engine.
//!
//! Drives the host-side effects of `connect`, `disconnect` and `status`:
//! - Resolved features are activated independently through [`ActivationOrchestrator`]
//! - External tools sit behind the traits in [`collaborators`]
//! - Outcomes map to sysexits-style codes through [`exit_status`]
//! - Results serialize into the reports in [`report`]

pub mod activators;
pub mod collaborators;
pub mod config;
pub mod connect;
pub mod credentials;
pub mod disconnect;
pub mod environment;
pub mod error;
pub mod exit_status;
pub mod orchestrator;
pub mod preview;
pub mod report;
pub mod result;
pub mod status;

#[cfg(test)]
mod tests;

pub use activators::{
    AnalyticsActivator, ContentActivator, FeatureActivator, RemoteManagementActivator,
    builtin_activators,
};
pub use collaborators::{AnalyticsService, Collaborators, ServiceManager, SubscriptionService};
pub use config::{ConfigPaths, EngineConfig, ServiceLayout};
pub use connect::{ConnectPipeline, ConnectRequest, ConnectStage};
pub use credentials::{CredentialArgs, Credentials, RegistrationRequest};
pub use disconnect::DisconnectPipeline;
pub use environment::HostEnvironment;
pub use error::{ActivationError, CollaboratorError, EngineError, Result};
pub use exit_status::{RegistrationOutcome, map_exit_code};
pub use orchestrator::{ActivationOrchestrator, OrchestratorOptions};
pub use preview::{FeaturePreview, PreviewEntry, preview_features};
pub use report::{ConnectReport, DisconnectReport, FeaturesReport, StatusReport};
pub use result::{
    ActivationRecord, DisconnectResult, DisconnectStep, Facet, InvocationResult, StatusResult,
    StepRecord,
};
pub use status::StatusPipeline;

// Re-export the features crate for callers that only depend on the engine.
pub use hostlink_features;
