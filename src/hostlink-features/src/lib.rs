//! Feature management for hostlink.
//!
//! Resolves which optional features (`content`, `analytics`,
//! `remote-management`) a `connect` invocation should turn on:
//! - `registry` - the fixed catalog and its dependency graph
//! - `config` - drop-in `features` tables read from disk
//! - `resolver` - default < config file < CLI precedence
//! - `validator` - rejects sets that enable a feature without its dependencies

pub mod config;
pub mod error;
pub mod features;
pub mod registry;
pub mod resolver;
pub mod validator;

pub use config::{FeaturesConfig, load_drop_in_dir};
pub use error::{ConfigError, DependencyConflictError, RegistryError, ResolveError};
pub use features::{DependencyEdge, Feature, ids};
pub use registry::{FeatureRegistry, builtin_edges, builtin_features};
pub use resolver::{CliLayer, EffectiveFeatureSet, LayerSource, LayerValue, LayeredConfigResolver};
pub use validator::{DependencyValidator, ValidationConflict};
