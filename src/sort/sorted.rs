//! Incrementally maintained deployer order
//!
//! Every insertion or removal rebuilds the dependency graph from the current
//! deployer set and re-sorts it. A rejected insertion leaves the cache exactly
//! as it was.

use super::error::SortError;
use super::graph::DependencyGraph;
use super::topological::{TieBreak, TopologicalSorter};
use crate::deployer::Described;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct Registered<T> {
    sequence: u64,
    deployer: T,
}

/// Ordered deployer list kept valid across single insertions and removals
#[derive(Debug, Clone)]
pub struct SortedDeployers<T> {
    registered: Vec<Registered<T>>,
    order: Vec<T>,
    next_sequence: u64,
    sorter: TopologicalSorter,
    verify_order: bool,
}

impl<T> Default for SortedDeployers<T>
where
    T: Described + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SortedDeployers<T>
where
    T: Described + Clone,
{
    pub fn new() -> Self {
        Self::with_tie_break(TieBreak::default())
    }

    pub fn with_tie_break(tie_break: TieBreak) -> Self {
        Self {
            registered: Vec::new(),
            order: Vec::new(),
            next_sequence: 0,
            sorter: TopologicalSorter::new(tie_break),
            verify_order: false,
        }
    }

    /// Re-checks every computed order against the graph edges.
    pub fn verify_order(mut self, verify: bool) -> Self {
        self.verify_order = verify;
        self
    }

    /// Adds a deployer and re-sorts.
    ///
    /// On error the cache is left untouched.
    pub fn insert(&mut self, deployer: T) -> Result<(), SortError> {
        let name = deployer.name().to_string();
        if self.contains(&name) {
            return Err(SortError::DuplicateDeployer(name));
        }

        let mut candidate = self.registered.clone();
        candidate.push(Registered {
            sequence: self.next_sequence,
            deployer,
        });

        match self.compute(&candidate) {
            Ok(order) => {
                self.registered = candidate;
                self.order = order;
                self.next_sequence += 1;
                debug!(deployer = %name, total = self.order.len(), "Inserted deployer");
                Ok(())
            }
            Err(e) => {
                warn!(deployer = %name, error = %e, "Rejected deployer");
                Err(e)
            }
        }
    }

    /// Removes the named deployer and re-sorts the rest from scratch.
    ///
    /// Returns the removed deployer, or `None` if it was not registered.
    pub fn remove(&mut self, name: &str) -> Result<Option<T>, SortError> {
        let Some(pos) = self.registered.iter().position(|r| r.deployer.name() == name) else {
            return Ok(None);
        };

        let mut candidate = self.registered.clone();
        let removed = candidate.remove(pos);
        let order = self.compute(&candidate)?;

        self.registered = candidate;
        self.order = order;
        debug!(deployer = %name, total = self.order.len(), "Removed deployer");
        Ok(Some(removed.deployer))
    }

    /// The current processing order
    pub fn current_order(&self) -> &[T] {
        &self.order
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registered.iter().any(|r| r.deployer.name() == name)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.registered
            .iter()
            .find(|r| r.deployer.name() == name)
            .map(|r| &r.deployer)
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn tie_break(&self) -> TieBreak {
        self.sorter.tie_break()
    }

    fn compute(&self, entries: &[Registered<T>]) -> Result<Vec<T>, SortError> {
        let graph = DependencyGraph::build_sequenced(
            entries
                .iter()
                .map(|r| (r.sequence, r.deployer.descriptor())),
        )?;
        let order = self.sorter.sort(&graph)?;

        if self.verify_order {
            graph.verify(&order)?;
        }

        Ok(order
            .into_iter()
            .map(|idx| entries[idx].deployer.clone())
            .collect())
    }
}
