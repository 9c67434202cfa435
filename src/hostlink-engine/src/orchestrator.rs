//! Activation orchestration.
//!
//! Every feature is activated independently: one record per feature, in
//! registry order, whatever happened to its siblings. Activations run with
//! bounded concurrency; each lands in its own slot of the ordered output.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use hostlink_features::{EffectiveFeatureSet, FeatureRegistry};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::activators::FeatureActivator;
use crate::error::ActivationError;
use crate::result::ActivationRecord;

/// Options for controlling orchestration behavior.
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// Maximum number of activations in flight.
    pub max_parallel: usize,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self { max_parallel: 4 }
    }
}

impl OrchestratorOptions {
    pub fn with_max_parallel(mut self, max: usize) -> Self {
        self.max_parallel = max.max(1);
        self
    }
}

pub struct ActivationOrchestrator<'a> {
    registry: &'a FeatureRegistry,
    activators: HashMap<String, Arc<dyn FeatureActivator>>,
    options: OrchestratorOptions,
    cancel: CancellationToken,
}

impl<'a> ActivationOrchestrator<'a> {
    pub fn new(
        registry: &'a FeatureRegistry,
        activators: Vec<Arc<dyn FeatureActivator>>,
        cancel: CancellationToken,
    ) -> Self {
        let activators = activators
            .into_iter()
            .map(|a| (a.feature_id().to_string(), a))
            .collect();
        Self {
            registry,
            activators,
            options: OrchestratorOptions::default(),
            cancel,
        }
    }

    pub fn with_options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether the feature and its whole dependency chain resolved to enabled.
    fn gate(&self, set: &EffectiveFeatureSet, feature_id: &str) -> bool {
        set.is_enabled(feature_id)
            && self
                .registry
                .dependency_closure(feature_id)
                .iter()
                .all(|d| set.is_enabled(d))
    }

    /// Activate every known feature. Must only be called on a set without
    /// validation conflicts.
    pub async fn activate(&self, set: &EffectiveFeatureSet) -> Vec<ActivationRecord> {
        let jobs = self.registry.features().iter().map(|feature| {
            let feature_id = feature.id.clone();
            let enabled = set.is_enabled(&feature_id);
            let gated = self.gate(set, &feature_id);
            let activator = self.activators.get(&feature_id).cloned();
            let cancel = self.cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    warn!("Skipping '{}': cancelled", feature_id);
                    return ActivationRecord::failed(
                        enabled,
                        &ActivationError::Cancelled {
                            feature: feature_id,
                        },
                    );
                }
                let Some(activator) = activator else {
                    return ActivationRecord::failed(
                        enabled,
                        &ActivationError::MissingActivator {
                            feature: feature_id,
                        },
                    );
                };

                let start = Instant::now();
                let outcome = if gated {
                    debug!("Activating '{}'", feature_id);
                    activator.enable().await
                } else {
                    debug!("Deactivating '{}'", feature_id);
                    activator.disable().await
                };
                debug!("'{}' finished after {:?}", feature_id, start.elapsed());

                match outcome {
                    Ok(()) => ActivationRecord::succeeded(feature_id, enabled),
                    Err(e) => {
                        warn!("Activation of '{}' failed: {}", feature_id, e);
                        ActivationRecord::failed(enabled, &e)
                    }
                }
            }
        });

        let records: Vec<ActivationRecord> = stream::iter(jobs)
            .buffered(self.options.max_parallel.max(1))
            .collect()
            .await;

        info!(
            "Activation finished: {}/{} successful",
            records.iter().filter(|r| r.successful).count(),
            records.len()
        );
        records
    }
}
