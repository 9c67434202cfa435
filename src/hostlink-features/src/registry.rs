//! Feature registry.
//!
//! The catalog and its dependency edges are fixed at construction; there is
//! no mutation API afterwards.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::error::RegistryError;
use crate::features::{DependencyEdge, Feature, ids};

/// Registry of known features and the edges between them.
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    features: Vec<Feature>,
    index: HashMap<String, usize>,
    dependencies: HashMap<String, Vec<String>>,
    topological: Vec<String>,
}

impl FeatureRegistry {
    /// Build a registry, rejecting duplicate ids, edges to unknown ids and cycles.
    pub fn new(features: Vec<Feature>, edges: Vec<DependencyEdge>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(features.len());
        for (pos, feature) in features.iter().enumerate() {
            if index.insert(feature.id.clone(), pos).is_some() {
                return Err(RegistryError::DuplicateFeature(feature.id.clone()));
            }
        }

        let mut dependencies: HashMap<String, Vec<String>> = features
            .iter()
            .map(|f| (f.id.clone(), Vec::new()))
            .collect();

        for edge in edges {
            for endpoint in [&edge.feature, &edge.dependency] {
                if !index.contains_key(endpoint) {
                    return Err(RegistryError::UnknownEdgeEndpoint {
                        feature: edge.feature.clone(),
                        dependency: edge.dependency.clone(),
                        unknown: endpoint.clone(),
                    });
                }
            }
            let deps = dependencies.entry(edge.feature.clone()).or_default();
            if !deps.contains(&edge.dependency) {
                deps.push(edge.dependency);
            }
        }

        let topological = topological_order(&features, &dependencies)?;

        Ok(Self {
            features,
            index,
            dependencies,
            topological,
        })
    }

    /// The built-in catalog with the built-in edge list.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(builtin_features(), builtin_edges())
    }

    /// The built-in catalog with edges taken from a `feature -> [dependencies]` map,
    /// as found in the `[feature-dependencies]` table of `config.toml`.
    pub fn with_dependency_map(map: &BTreeMap<String, Vec<String>>) -> Result<Self, RegistryError> {
        let edges = map
            .iter()
            .flat_map(|(feature, deps)| {
                deps.iter()
                    .map(move |dep| DependencyEdge::requires(feature.clone(), dep.clone()))
            })
            .collect();
        Self::new(builtin_features(), edges)
    }

    /// All features in declaration order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Look up a feature by id.
    pub fn get(&self, feature_id: &str) -> Option<&Feature> {
        self.index.get(feature_id).map(|&pos| &self.features[pos])
    }

    /// Check if a feature id is part of the catalog.
    pub fn is_known(&self, feature_id: &str) -> bool {
        self.index.contains_key(feature_id)
    }

    /// Ids of all known features in declaration order.
    pub fn known_ids(&self) -> Vec<String> {
        self.features.iter().map(|f| f.id.clone()).collect()
    }

    /// Direct dependencies of a feature. Empty for unknown ids.
    pub fn dependencies_of(&self, feature_id: &str) -> &[String] {
        self.dependencies
            .get(feature_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every feature reachable through dependency edges, least dependent first.
    pub fn dependency_closure(&self, feature_id: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut stack: Vec<&str> = self
            .dependencies_of(feature_id)
            .iter()
            .map(String::as_str)
            .collect();
        while let Some(id) = stack.pop() {
            if seen.insert(id.to_string()) {
                stack.extend(self.dependencies_of(id).iter().map(String::as_str));
            }
        }
        self.topological
            .iter()
            .filter(|id| seen.contains(*id))
            .cloned()
            .collect()
    }

    /// Feature ids ordered from least to most dependent.
    pub fn topological_order(&self) -> &[String] {
        &self.topological
    }

    /// All edges, grouped by feature in declaration order.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.features
            .iter()
            .flat_map(|f| {
                self.dependencies_of(&f.id)
                    .iter()
                    .map(|d| DependencyEdge::requires(f.id.clone(), d.clone()))
            })
            .collect()
    }
}

/// Kahn's algorithm, seeded in declaration order so the result is stable.
fn topological_order(
    features: &[Feature],
    dependencies: &HashMap<String, Vec<String>>,
) -> Result<Vec<String>, RegistryError> {
    let mut in_degree: HashMap<&str, usize> = features
        .iter()
        .map(|f| (f.id.as_str(), dependencies.get(&f.id).map_or(0, Vec::len)))
        .collect();

    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for feature in features {
        for dep in dependencies.get(&feature.id).into_iter().flatten() {
            dependents
                .entry(dep.as_str())
                .or_default()
                .push(feature.id.as_str());
        }
    }

    let mut queue: VecDeque<&str> = features
        .iter()
        .map(|f| f.id.as_str())
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();

    let mut result = Vec::with_capacity(features.len());
    while let Some(id) = queue.pop_front() {
        result.push(id.to_string());
        for dependent in dependents.get(id).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(dependent) {
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*dependent);
                }
            }
        }
    }

    if result.len() != features.len() {
        let remaining: Vec<_> = features
            .iter()
            .map(|f| f.id.as_str())
            .filter(|id| !result.iter().any(|r| r.as_str() == *id))
            .collect();
        return Err(RegistryError::CircularDependency {
            path: remaining.join(" -> "),
        });
    }

    Ok(result)
}

/// Builtin features, least dependent first.
pub fn builtin_features() -> Vec<Feature> {
    vec![
        Feature::new(ids::CONTENT, "Content").description("Get access to vendor content repositories"),
        Feature::new(ids::ANALYTICS, "Analytics").description("Enable data collection for analytics"),
        Feature::new(ids::REMOTE_MANAGEMENT, "Remote Management")
            .description("Remote management through the background daemon"),
    ]
}

/// Builtin dependency edges.
pub fn builtin_edges() -> Vec<DependencyEdge> {
    vec![
        DependencyEdge::requires(ids::ANALYTICS, ids::CONTENT),
        DependencyEdge::requires(ids::REMOTE_MANAGEMENT, ids::CONTENT),
        DependencyEdge::requires(ids::REMOTE_MANAGEMENT, ids::ANALYTICS),
    ]
}
