//! Per-feature side effects.

use std::sync::Arc;

use async_trait::async_trait;
use hostlink_features::ids;
use tracing::{debug, info};

use crate::collaborators::{AnalyticsService, Collaborators, ServiceManager, SubscriptionService};
use crate::config::ServiceLayout;
use crate::error::ActivationError;

/// Turns one feature on or off.
#[async_trait]
pub trait FeatureActivator: Send + Sync {
    fn feature_id(&self) -> &str;

    async fn enable(&self) -> Result<(), ActivationError>;

    /// Teardown or no-op for a feature that resolved to disabled.
    async fn disable(&self) -> Result<(), ActivationError>;
}

/// Content repositories managed by the subscription service.
pub struct ContentActivator {
    subscription: Arc<dyn SubscriptionService>,
}

impl ContentActivator {
    pub fn new(subscription: Arc<dyn SubscriptionService>) -> Self {
        Self { subscription }
    }
}

#[async_trait]
impl FeatureActivator for ContentActivator {
    fn feature_id(&self) -> &str {
        ids::CONTENT
    }

    async fn enable(&self) -> Result<(), ActivationError> {
        self.subscription
            .set_manage_repos(true)
            .await
            .map_err(|e| ActivationError::from_collaborator(ids::CONTENT, e))?;
        self.subscription
            .refresh()
            .await
            .map_err(|e| ActivationError::from_collaborator(ids::CONTENT, e))?;
        info!("Content repositories enabled");
        Ok(())
    }

    async fn disable(&self) -> Result<(), ActivationError> {
        self.subscription
            .set_manage_repos(false)
            .await
            .map_err(|e| ActivationError::from_collaborator(ids::CONTENT, e))?;
        info!("Content repository management disabled");
        Ok(())
    }
}

/// Registration with the analytics service.
pub struct AnalyticsActivator {
    analytics: Arc<dyn AnalyticsService>,
}

impl AnalyticsActivator {
    pub fn new(analytics: Arc<dyn AnalyticsService>) -> Self {
        Self { analytics }
    }
}

#[async_trait]
impl FeatureActivator for AnalyticsActivator {
    fn feature_id(&self) -> &str {
        ids::ANALYTICS
    }

    async fn enable(&self) -> Result<(), ActivationError> {
        self.analytics
            .register()
            .await
            .map_err(|e| ActivationError::from_collaborator(ids::ANALYTICS, e))?;
        info!("Connected to analytics");
        Ok(())
    }

    async fn disable(&self) -> Result<(), ActivationError> {
        debug!("Analytics disabled, not registering");
        Ok(())
    }
}

/// The facts timer/service and the management daemon.
pub struct RemoteManagementActivator {
    services: Arc<dyn ServiceManager>,
    layout: ServiceLayout,
}

impl RemoteManagementActivator {
    pub fn new(services: Arc<dyn ServiceManager>, layout: ServiceLayout) -> Self {
        Self { services, layout }
    }
}

#[async_trait]
impl FeatureActivator for RemoteManagementActivator {
    fn feature_id(&self) -> &str {
        ids::REMOTE_MANAGEMENT
    }

    async fn enable(&self) -> Result<(), ActivationError> {
        let err = |e| ActivationError::from_collaborator(ids::REMOTE_MANAGEMENT, e);
        self.services
            .enable_now(&self.layout.facts_timer)
            .await
            .map_err(err)?;
        self.services
            .start(&self.layout.facts_service)
            .await
            .map_err(err)?;
        self.services
            .enable_now(&self.layout.daemon_unit)
            .await
            .map_err(err)?;
        info!("Activated {}", self.layout.daemon_unit);
        Ok(())
    }

    async fn disable(&self) -> Result<(), ActivationError> {
        debug!("Remote management disabled, not starting {}", self.layout.daemon_unit);
        Ok(())
    }
}

/// The built-in activators, keyed by feature id.
pub fn builtin_activators(
    collaborators: &Collaborators,
    layout: &ServiceLayout,
) -> Vec<Arc<dyn FeatureActivator>> {
    vec![
        Arc::new(ContentActivator::new(collaborators.subscription.clone())),
        Arc::new(AnalyticsActivator::new(collaborators.analytics.clone())),
        Arc::new(RemoteManagementActivator::new(
            collaborators.services.clone(),
            layout.clone(),
        )),
    ]
}
