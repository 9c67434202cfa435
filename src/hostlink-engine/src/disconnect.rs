//! The `disconnect` pipeline.
//!
//! Steps run in a fixed order (daemon, analytics, subscription) and are
//! independent: a failing step does not stop the next one.

use tracing::{error, info};

use crate::collaborators::Collaborators;
use crate::environment::HostEnvironment;
use crate::error::CollaboratorError;
use crate::exit_status::{EXIT_FAILURE, EXIT_OK};
use crate::result::{DisconnectResult, DisconnectStep, StepRecord};

pub struct DisconnectPipeline<'a> {
    env: &'a HostEnvironment,
    collaborators: Collaborators,
}

impl<'a> DisconnectPipeline<'a> {
    pub fn new(env: &'a HostEnvironment, collaborators: Collaborators) -> Self {
        Self { env, collaborators }
    }

    pub async fn run(&self) -> DisconnectResult {
        let mut result = DisconnectResult {
            hostname: self.env.hostname.clone(),
            hostname_error: self.env.hostname_error.clone(),
            uid: self.env.uid,
            uid_error: None,
            steps: Vec::new(),
            exit_code: EXIT_OK,
        };

        if let Some(uid_error) = self.env.uid_error() {
            error!("Refusing to disconnect: {}", uid_error);
            result.uid_error = Some(uid_error);
            result.exit_code = EXIT_FAILURE;
            return result;
        }

        result.steps.push(self.stop_daemon().await);
        result.steps.push(self.unregister_analytics().await);
        result.steps.push(self.unregister_subscription().await);

        if result.steps.iter().any(|s| !s.successful) {
            result.exit_code = EXIT_FAILURE;
        }
        info!("disconnect finished with exit code {}", result.exit_code);
        result
    }

    async fn stop_daemon(&self) -> StepRecord {
        step_record(DisconnectStep::Daemon, self.try_stop_daemon().await)
    }

    async fn unregister_analytics(&self) -> StepRecord {
        step_record(DisconnectStep::Analytics, self.try_unregister_analytics().await)
    }

    async fn unregister_subscription(&self) -> StepRecord {
        step_record(DisconnectStep::Rhsm, self.try_unregister_subscription().await)
    }

    async fn try_stop_daemon(&self) -> Result<bool, CollaboratorError> {
        let layout = &self.env.services;
        let services = &self.collaborators.services;
        if !services.is_active(&layout.daemon_unit).await? {
            return Ok(true);
        }
        services.disable_now(&layout.daemon_unit).await?;
        services.disable_now(&layout.facts_timer).await?;
        Ok(false)
    }

    async fn try_unregister_analytics(&self) -> Result<bool, CollaboratorError> {
        let analytics = &self.collaborators.analytics;
        if !analytics.is_registered().await? {
            return Ok(true);
        }
        analytics.unregister().await?;
        Ok(false)
    }

    async fn try_unregister_subscription(&self) -> Result<bool, CollaboratorError> {
        let subscription = &self.collaborators.subscription;
        if !subscription.is_registered().await? {
            return Ok(true);
        }
        subscription.unregister().await?;
        Ok(false)
    }
}

/// `Ok(skipped)` or the failure of a step.
fn step_record(step: DisconnectStep, outcome: Result<bool, CollaboratorError>) -> StepRecord {
    match outcome {
        Ok(skipped) => {
            if skipped {
                info!("Nothing to undo for {}", step.label());
            } else {
                info!("Disconnected {}", step.label());
            }
            StepRecord {
                step,
                skipped,
                successful: true,
                error: None,
            }
        }
        Err(e) => {
            error!("Cannot disconnect {}: {}", step.label(), e);
            StepRecord {
                step,
                skipped: false,
                successful: false,
                error: Some(e.to_string()),
            }
        }
    }
}
