//! External collaborators.
//!
//! The engine never talks to the host directly; it goes through these traits.
//! The `*Cli` implementations drive the real tools through a [`CommandRunner`].

mod command;
mod insights;
mod subscription;
mod systemd;

use std::sync::Arc;

use async_trait::async_trait;

pub use command::{CommandLine, CommandOutput, CommandRunner, ProcessRunner};
pub use insights::InsightsClientCli;
pub use subscription::SubscriptionManagerCli;
pub use systemd::SystemctlCli;

use crate::config::ServiceLayout;
use crate::credentials::RegistrationRequest;
use crate::error::CollaboratorError;

/// The subscription service (host identity and content repositories).
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    async fn is_registered(&self) -> Result<bool, CollaboratorError>;

    /// Register the host. Content templates are only sent when `enable_content` is set.
    async fn register(
        &self,
        request: &RegistrationRequest,
        enable_content: bool,
    ) -> Result<(), CollaboratorError>;

    async fn unregister(&self) -> Result<(), CollaboratorError>;

    /// Whether the subscription service manages repository files.
    async fn manages_repos(&self) -> Result<bool, CollaboratorError>;

    async fn set_manage_repos(&self, enabled: bool) -> Result<(), CollaboratorError>;

    /// Regenerate the repository files.
    async fn refresh(&self) -> Result<(), CollaboratorError>;
}

/// The analytics (telemetry) client.
#[async_trait]
pub trait AnalyticsService: Send + Sync {
    async fn is_registered(&self) -> Result<bool, CollaboratorError>;
    async fn register(&self) -> Result<(), CollaboratorError>;
    async fn unregister(&self) -> Result<(), CollaboratorError>;
}

/// The init system's unit manager.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Enable a unit and start it. Masked or missing units are `Unavailable`.
    async fn enable_now(&self, unit: &str) -> Result<(), CollaboratorError>;

    /// Stop a unit and disable it.
    async fn disable_now(&self, unit: &str) -> Result<(), CollaboratorError>;

    async fn start(&self, unit: &str) -> Result<(), CollaboratorError>;

    async fn is_active(&self, unit: &str) -> Result<bool, CollaboratorError>;
}

/// The set of collaborators a pipeline works with.
#[derive(Clone)]
pub struct Collaborators {
    pub subscription: Arc<dyn SubscriptionService>,
    pub analytics: Arc<dyn AnalyticsService>,
    pub services: Arc<dyn ServiceManager>,
}

impl Collaborators {
    /// Collaborators driving the real tools named in `layout`.
    pub fn system(layout: &ServiceLayout) -> Self {
        Self::with_runner(layout, Arc::new(ProcessRunner))
    }

    pub fn with_runner(layout: &ServiceLayout, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            subscription: Arc::new(SubscriptionManagerCli::new(
                &layout.subscription_manager,
                runner.clone(),
            )),
            analytics: Arc::new(InsightsClientCli::new(&layout.insights_client, runner.clone())),
            services: Arc::new(SystemctlCli::new(&layout.systemctl, runner)),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
