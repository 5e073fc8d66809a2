//! Deployer descriptors
//!
//! A deployer is described to the sorter by its name, the tokens it needs
//! (inputs), the tokens it makes available (outputs) and a relative order used
//! to break ties between deployers with no dependency on each other.

mod descriptor;

pub use descriptor::{DeployerDescriptor, Described, DEFAULT_RELATIVE_ORDER};
