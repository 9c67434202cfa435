//! Error types for hostlink-engine.

use hostlink_features::{ConfigError, DependencyConflictError, RegistryError, ResolveError};
use thiserror::Error;

use crate::exit_status::{EXIT_CONFIG, EXIT_FAILURE, EXIT_SOFTWARE, EXIT_USAGE};

/// Failure talking to an external tool (subscription-manager, insights-client, systemctl).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The program could not be started at all.
    #[error("failed to execute {program}: {message}")]
    Spawn { program: String, message: String },

    /// The program ran and exited unsuccessfully.
    #[error("{command} failed{}: {stderr}", exit_suffix(.code))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The subsystem cannot be reached (masked or missing unit, missing binary).
    #[error("{subsystem} is unavailable: {reason}")]
    Unavailable { subsystem: String, reason: String },

    /// The program printed something we could not interpret.
    #[error("unexpected output from {command}: {output}")]
    UnexpectedOutput { command: String, output: String },
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {code}"),
        None => " (terminated by signal)".to_string(),
    }
}

impl CollaboratorError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CollaboratorError::Unavailable { .. })
    }
}

/// Failure activating or deactivating one feature.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActivationError {
    /// The collaborator call failed.
    #[error("{source}")]
    Collaborator {
        feature: String,
        #[source]
        source: CollaboratorError,
    },

    /// The collaborator could not be reached.
    #[error("{subsystem} is unavailable: {reason}")]
    CollaboratorUnavailable {
        feature: String,
        subsystem: String,
        reason: String,
    },

    /// No activator is registered for this feature.
    #[error("no activator registered for feature \"{feature}\"")]
    MissingActivator { feature: String },

    /// Cancellation was requested before the activation started.
    #[error("cancelled before activation started")]
    Cancelled { feature: String },
}

impl ActivationError {
    /// Wrap a collaborator failure, promoting `Unavailable` to its own variant.
    pub fn from_collaborator(feature: impl Into<String>, source: CollaboratorError) -> Self {
        let feature = feature.into();
        match source {
            CollaboratorError::Unavailable { subsystem, reason } => {
                ActivationError::CollaboratorUnavailable {
                    feature,
                    subsystem,
                    reason,
                }
            }
            source => ActivationError::Collaborator { feature, source },
        }
    }

    pub fn feature(&self) -> &str {
        match self {
            ActivationError::Collaborator { feature, .. }
            | ActivationError::CollaboratorUnavailable { feature, .. }
            | ActivationError::MissingActivator { feature }
            | ActivationError::Cancelled { feature } => feature,
        }
    }
}

/// Errors that end an invocation before any report is produced.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Unknown or contradictory `--enable-feature` / `--disable-feature`.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The resolved set enables a feature without its dependencies.
    #[error(transparent)]
    DependencyConflict(#[from] DependencyConflictError),

    /// Invalid combination of command line parameters.
    #[error("{0}")]
    Usage(String),

    /// The host is already registered.
    #[error("this system is already connected")]
    AlreadyConnected,

    /// The dependency edge list is invalid.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A configuration file could not be read or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Querying the subscription service failed before any side effect.
    #[error("cannot determine registration state: {0}")]
    RegistrationState(#[source] CollaboratorError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn usage(msg: impl Into<String>) -> Self {
        EngineError::Usage(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::Resolve(_)
            | EngineError::DependencyConflict(_)
            | EngineError::Usage(_)
            | EngineError::AlreadyConnected => EXIT_USAGE,
            EngineError::Registry(_) | EngineError::Config(_) => EXIT_CONFIG,
            EngineError::RegistrationState(_) => EXIT_FAILURE,
            EngineError::Internal(_) => EXIT_SOFTWARE,
        }
    }

    /// Whether this is a usage error (caller supplied a contradictory invocation).
    pub fn is_usage(&self) -> bool {
        self.exit_code() == EXIT_USAGE
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
