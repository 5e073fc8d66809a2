//! deployorder - dependency-driven ordering of deployers across lifecycle stages
//!
//! A deployer declares the named tokens it consumes (inputs) and produces
//! (outputs). A token that is both an input and an output marks the deployer as
//! a modifier of that token. Within one stage, deployers are ordered so that
//! every producer runs before every modifier of a token, and every modifier runs
//! before every pure consumer. Remaining ties are broken by `relative_order` and
//! then by registration sequence (or name).
//!
//! # Core Concepts
//!
//! - **Descriptor**: a deployer's name, inputs, outputs and relative order
//! - **Sorter**: Kahn topological sort with deterministic wave tie-breaking
//! - **Sorted cache**: an incrementally maintained order that rejects insertions
//!   which would introduce a cycle and keeps its previous state
//! - **Staged registry**: one sorted cache per lifecycle stage, safe for
//!   concurrent readers and writers
//!
//! # Example Usage
//!
//! ```
//! use deployorder::{sort_deployers, DeployerDescriptor, TieBreak};
//!
//! let deployers = vec![
//!     DeployerDescriptor::new("consumer").with_input("metadata"),
//!     DeployerDescriptor::new("producer").with_output("metadata"),
//! ];
//!
//! let ordered = sort_deployers(&deployers, TieBreak::Registration).unwrap();
//! assert_eq!(ordered[0].name, "producer");
//! assert_eq!(ordered[1].name, "consumer");
//! ```
//!
//! # Project Structure
//!
//! - [`deployer`]: deployer descriptors
//! - [`sort`]: dependency graph, topological sorter and incremental cache
//! - [`stage`]: lifecycle stages and the staged registry
//! - [`lifecycle`]: deploy/undeploy execution over deployment units
//! - [`manifest`]: YAML/JSON deployer manifests and deployment plans

pub mod cli;
pub mod config;
pub mod deployer;
pub mod lifecycle;
pub mod manifest;
pub mod progress;
pub mod sort;
pub mod stage;
pub mod util;

pub use config::{ConfigError, DeployOrderConfig};
pub use deployer::{DeployerDescriptor, Described, DEFAULT_RELATIVE_ORDER};
pub use lifecycle::{Deployer, DeployerProcessor, DeploymentUnit, LifecycleError};
pub use manifest::{DeployerManifest, DeploymentPlan};
pub use progress::{LoggingHandler, NoOpHandler, ProgressEvent, ProgressHandler};
pub use sort::{
    insert_sorted, sort_deployers, DependencyGraph, SortError, SortedDeployers, TieBreak,
    TopologicalSorter, UnresolvedEdge,
};
pub use stage::{StageOrders, StagedRegistry};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
