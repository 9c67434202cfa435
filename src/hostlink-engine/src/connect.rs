//! The `connect` pipeline.
//!
//! `Start -> Resolving -> ValidationFailed | Validated -> Activating -> Reported`.
//! Every usage error is detected before the first side effect.

use std::sync::Arc;

use hostlink_features::{
    CliLayer, DependencyValidator, FeatureRegistry, FeaturesConfig, LayeredConfigResolver, ids,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::activators::{FeatureActivator, builtin_activators};
use crate::collaborators::Collaborators;
use crate::credentials::{CredentialArgs, Credentials};
use crate::environment::HostEnvironment;
use crate::error::{EngineError, Result};
use crate::exit_status::{RegistrationOutcome, map_exit_code};
use crate::orchestrator::{ActivationOrchestrator, OrchestratorOptions};
use crate::result::InvocationResult;

/// Stage of a `connect` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectStage {
    Start,
    Resolving,
    ValidationFailed,
    Validated,
    Activating,
    Reported,
}

/// Inputs of one `connect` invocation.
#[derive(Debug, Clone, Default)]
pub struct ConnectRequest {
    pub credentials: CredentialArgs,
    pub features_config: FeaturesConfig,
    pub cli: CliLayer,
}

pub struct ConnectPipeline<'a> {
    registry: &'a FeatureRegistry,
    env: &'a HostEnvironment,
    collaborators: Collaborators,
    activators: Vec<Arc<dyn FeatureActivator>>,
    options: OrchestratorOptions,
    cancel: CancellationToken,
    stage: ConnectStage,
}

impl<'a> ConnectPipeline<'a> {
    pub fn new(
        registry: &'a FeatureRegistry,
        env: &'a HostEnvironment,
        collaborators: Collaborators,
        cancel: CancellationToken,
    ) -> Self {
        let activators = builtin_activators(&collaborators, &env.services);
        Self {
            registry,
            env,
            collaborators,
            activators,
            options: OrchestratorOptions::default(),
            cancel,
            stage: ConnectStage::Start,
        }
    }

    pub fn with_options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the activators (tests, alternative catalogs).
    pub fn with_activators(mut self, activators: Vec<Arc<dyn FeatureActivator>>) -> Self {
        self.activators = activators;
        self
    }

    pub fn stage(&self) -> ConnectStage {
        self.stage
    }

    fn advance(&mut self, stage: ConnectStage) {
        debug!("connect: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Run the pipeline. `Err` means nothing was changed on the host.
    pub async fn run(&mut self, request: &ConnectRequest) -> Result<InvocationResult> {
        self.advance(ConnectStage::Resolving);
        let set = LayeredConfigResolver::new(self.registry)
            .resolve(&request.features_config, &request.cli)?;

        if let Err(conflict) = DependencyValidator::new(self.registry).ensure_consistent(&set) {
            self.advance(ConnectStage::ValidationFailed);
            error!("Dependency conflict: {}", conflict);
            return Err(conflict.into());
        }
        self.advance(ConnectStage::Validated);

        let registration = Credentials::from_args(&request.credentials, set.is_enabled(ids::CONTENT))?;

        let mut result = InvocationResult {
            hostname: self.env.hostname.clone(),
            hostname_error: self.env.hostname_error.clone(),
            uid: self.env.uid,
            uid_error: None,
            registration: RegistrationOutcome::NotAttempted,
            features: set,
            activation_records: Vec::new(),
            exit_code: 0,
        };

        if let Some(uid_error) = self.env.uid_error() {
            error!("Refusing to connect: {}", uid_error);
            result.uid_error = Some(uid_error);
            return Ok(self.finish(result));
        }
        if self.env.hostname_error.is_some() {
            return Ok(self.finish(result));
        }

        let already_registered = self
            .collaborators
            .subscription
            .is_registered()
            .await
            .map_err(EngineError::RegistrationState)?;
        if already_registered {
            return Err(EngineError::AlreadyConnected);
        }

        if self.cancel.is_cancelled() {
            result.registration = RegistrationOutcome::Failed("cancelled before registration".to_string());
            return Ok(self.finish(result));
        }

        info!("Registering {} with the subscription service", self.env.hostname);
        let content = result.features.is_enabled(ids::CONTENT);
        match self
            .collaborators
            .subscription
            .register(&registration, content)
            .await
        {
            Ok(()) => {
                info!("Registered {}", self.env.hostname);
                result.registration = RegistrationOutcome::Registered;
            }
            Err(e) => {
                error!("Registration failed: {}", e);
                result.registration = RegistrationOutcome::Failed(e.to_string());
                return Ok(self.finish(result));
            }
        }

        self.advance(ConnectStage::Activating);
        let orchestrator =
            ActivationOrchestrator::new(self.registry, self.activators.clone(), self.cancel.clone())
                .with_options(self.options.clone());
        result.activation_records = orchestrator.activate(&result.features).await;

        Ok(self.finish(result))
    }

    fn finish(&mut self, mut result: InvocationResult) -> InvocationResult {
        // Pre-flight failures leave registration NotAttempted, which maps to a generic failure.
        let code = map_exit_code(&[], &result.activation_records, &result.registration);
        result.exit_code = code;
        self.advance(ConnectStage::Reported);
        info!("connect finished with exit code {}", code);
        result
    }
}
