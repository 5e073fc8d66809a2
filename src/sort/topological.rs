//! Wave-ordered topological sort
//!
//! Kahn's algorithm, processing ready deployers in waves: the initial ready
//! set is sorted as a whole, and every batch of deployers released by placing
//! one deployer is sorted on its own and queued behind the deployers that were
//! already ready. Within a wave the order is relative order ascending, then the
//! configured secondary key.

use super::error::{SortError, UnresolvedEdge};
use super::graph::DependencyGraph;
use crate::deployer::Described;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

/// Secondary key used when two ready deployers share a relative order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// Earlier registration first
    #[default]
    Registration,
    /// Lexicographic by name, registration as the final fallback
    Name,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "registration" => Ok(TieBreak::Registration),
            "name" => Ok(TieBreak::Name),
            other => Err(format!(
                "unknown tie-break '{}', expected 'registration' or 'name'",
                other
            )),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::Registration => write!(f, "registration"),
            TieBreak::Name => write!(f, "name"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalSorter {
    tie_break: TieBreak,
}

impl TopologicalSorter {
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Returns node indices in processing order.
    ///
    /// Fails with [`SortError::Cycle`] listing every deployer that could not be
    /// placed and the edges between them.
    pub fn sort(&self, graph: &DependencyGraph) -> Result<Vec<usize>, SortError> {
        let mut in_degree: Vec<usize> = (0..graph.len()).map(|i| graph.in_degree(i)).collect();

        let mut initial: Vec<usize> = (0..graph.len()).filter(|&i| in_degree[i] == 0).collect();
        self.sort_wave(graph, &mut initial);
        let mut ready: VecDeque<usize> = initial.into();

        let mut order = Vec::with_capacity(graph.len());
        while let Some(idx) = ready.pop_front() {
            order.push(idx);

            let mut wave = Vec::new();
            for &next in graph.successors(idx) {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    wave.push(next);
                }
            }

            if !wave.is_empty() {
                self.sort_wave(graph, &mut wave);
                trace!(
                    after = %graph.node(idx).name,
                    released = wave.len(),
                    "Queued wave of ready deployers"
                );
                ready.extend(wave);
            }
        }

        if order.len() < graph.len() {
            return Err(self.cycle_error(graph, &order));
        }

        debug!(
            deployers = order.len(),
            tie_break = %self.tie_break,
            "Sorted deployers"
        );
        Ok(order)
    }

    fn sort_wave(&self, graph: &DependencyGraph, wave: &mut [usize]) {
        wave.sort_by(|&a, &b| self.compare(graph, a, b));
    }

    fn compare(&self, graph: &DependencyGraph, a: usize, b: usize) -> Ordering {
        let (left, right) = (graph.node(a), graph.node(b));
        let by_order = left.relative_order.cmp(&right.relative_order);
        let by_sequence = left.sequence.cmp(&right.sequence).then(a.cmp(&b));

        match self.tie_break {
            TieBreak::Registration => by_order.then(by_sequence),
            TieBreak::Name => by_order
                .then_with(|| left.name.cmp(&right.name))
                .then(by_sequence),
        }
    }

    fn cycle_error(&self, graph: &DependencyGraph, order: &[usize]) -> SortError {
        let mut placed = vec![false; graph.len()];
        for &idx in order {
            placed[idx] = true;
        }

        let deployers = (0..graph.len())
            .filter(|&i| !placed[i])
            .map(|i| graph.node(i).name.clone())
            .collect();

        let edges = graph
            .edges()
            .filter(|&(from, to, _)| !placed[from] && !placed[to])
            .map(|(from, to, tokens)| UnresolvedEdge {
                from: graph.node(from).name.clone(),
                to: graph.node(to).name.clone(),
                tokens: tokens.clone(),
            })
            .collect();

        SortError::Cycle { deployers, edges }
    }
}

/// Sorts a complete deployer set from scratch.
///
/// Input position is the registration sequence.
pub fn sort_deployers<T>(deployers: &[T], tie_break: TieBreak) -> Result<Vec<T>, SortError>
where
    T: Described + Clone,
{
    let graph = DependencyGraph::build_sequenced(
        deployers
            .iter()
            .enumerate()
            .map(|(idx, d)| (idx as u64, d.descriptor())),
    )?;
    let order = TopologicalSorter::new(tie_break).sort(&graph)?;
    Ok(order.into_iter().map(|idx| deployers[idx].clone()).collect())
}

/// Sorts `existing` plus one new deployer.
///
/// `existing` is taken in its current order, so deployers it already holds keep
/// their precedence over the newcomer on ties.
pub fn insert_sorted<T>(existing: &[T], deployer: T) -> Result<Vec<T>, SortError>
where
    T: Described + Clone,
{
    let mut all = Vec::with_capacity(existing.len() + 1);
    all.extend_from_slice(existing);
    all.push(deployer);
    sort_deployers(&all, TieBreak::Registration)
}
