//! Deployer dependency sorting
//!
//! - [`graph`]: builds the producer/modifier/consumer graph from descriptors
//! - [`topological`]: wave-ordered Kahn sort with deterministic tie-breaking
//! - [`sorted`]: an order maintained across single insertions and removals

pub mod error;
pub mod graph;
pub mod sorted;
pub mod topological;

pub use error::{SortError, UnresolvedEdge};
pub use graph::{DependencyGraph, GraphNode};
pub use sorted::SortedDeployers;
pub use topological::{insert_sorted, sort_deployers, TieBreak, TopologicalSorter};
