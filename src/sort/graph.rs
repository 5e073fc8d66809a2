//! Dependency graph construction
//!
//! Each deployer becomes a node. For every token, deployers fall into three
//! roles: pure producers (output only), modifiers (input and output) and pure
//! consumers (input only). Edges always point from the deployer that must run
//! first to the one that must run after it:
//!
//! - with modifiers: producer -> modifier and modifier -> consumer
//! - without modifiers: producer -> consumer
//!
//! Modifiers of the same token get no edge between them; the tie-break rule
//! orders them.

use super::error::SortError;
use crate::deployer::DeployerDescriptor;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// A deployer as a graph node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub name: String,
    pub relative_order: i32,
    /// Registration sequence, the default secondary tie-break key
    pub sequence: u64,
}

#[derive(Debug, Default)]
struct TokenRoles {
    producers: Vec<usize>,
    modifiers: Vec<usize>,
    consumers: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    edges: BTreeMap<(usize, usize), BTreeSet<String>>,
    successors: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
}

impl DependencyGraph {
    /// Builds the graph using each descriptor's position as its sequence.
    pub fn build(descriptors: &[DeployerDescriptor]) -> Result<Self, SortError> {
        Self::build_sequenced(
            descriptors
                .iter()
                .enumerate()
                .map(|(idx, d)| (idx as u64, d)),
        )
    }

    /// Builds the graph from `(sequence, descriptor)` pairs.
    ///
    /// Nodes are indexed in iteration order.
    pub fn build_sequenced<'a, I>(entries: I) -> Result<Self, SortError>
    where
        I: IntoIterator<Item = (u64, &'a DeployerDescriptor)>,
    {
        let mut nodes = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();
        let mut tokens: BTreeMap<&'a str, TokenRoles> = BTreeMap::new();

        for (sequence, descriptor) in entries {
            descriptor.validate()?;

            let idx = nodes.len();
            if index.insert(descriptor.name.as_str(), idx).is_some() {
                return Err(SortError::DuplicateDeployer(descriptor.name.clone()));
            }

            for token in descriptor.produced_tokens() {
                tokens.entry(token).or_default().producers.push(idx);
            }
            for token in descriptor.modified_tokens() {
                tokens.entry(token).or_default().modifiers.push(idx);
            }
            for token in descriptor.consumed_tokens() {
                tokens.entry(token).or_default().consumers.push(idx);
            }

            nodes.push(GraphNode {
                name: descriptor.name.clone(),
                relative_order: descriptor.relative_order,
                sequence,
            });
        }

        let mut edges: BTreeMap<(usize, usize), BTreeSet<String>> = BTreeMap::new();
        let mut add_edge = |from: usize, to: usize, token: &str| {
            if from != to {
                edges.entry((from, to)).or_default().insert(token.to_string());
            }
        };

        for (&token, roles) in &tokens {
            if roles.modifiers.is_empty() {
                for &producer in &roles.producers {
                    for &consumer in &roles.consumers {
                        add_edge(producer, consumer, token);
                    }
                }
            } else {
                for &modifier in &roles.modifiers {
                    for &producer in &roles.producers {
                        add_edge(producer, modifier, token);
                    }
                    for &consumer in &roles.consumers {
                        add_edge(modifier, consumer, token);
                    }
                }
            }
        }

        let mut successors = vec![Vec::new(); nodes.len()];
        let mut in_degree = vec![0; nodes.len()];
        for &(from, to) in edges.keys() {
            successors[from].push(to);
            in_degree[to] += 1;
        }

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            tokens = tokens.len(),
            "Built deployer dependency graph"
        );

        Ok(Self {
            nodes,
            edges,
            successors,
            in_degree,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, idx: usize) -> &GraphNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges as `(from, to, tokens)`, ordered by node index
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, &BTreeSet<String>)> {
        self.edges
            .iter()
            .map(|(&(from, to), tokens)| (from, to, tokens))
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.edges.contains_key(&(from, to))
    }

    /// Tokens behind the edge `from -> to`, if there is one
    pub fn edge_tokens(&self, from: usize, to: usize) -> Option<&BTreeSet<String>> {
        self.edges.get(&(from, to))
    }

    pub fn successors(&self, idx: usize) -> &[usize] {
        &self.successors[idx]
    }

    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_degree[idx]
    }

    /// Edges `(from, to)` that `order` runs backwards.
    ///
    /// Indices outside the graph are ignored; nodes missing from `order` count
    /// as placed last.
    pub fn violations(&self, order: &[usize]) -> Vec<(usize, usize)> {
        let mut position = vec![usize::MAX; self.nodes.len()];
        for (pos, &idx) in order.iter().enumerate() {
            if let Some(slot) = position.get_mut(idx) {
                *slot = pos;
            }
        }

        self.edges
            .keys()
            .filter(|&&(from, to)| position[from] >= position[to])
            .copied()
            .collect()
    }

    /// Fails with the first edge `order` runs backwards.
    pub fn verify(&self, order: &[usize]) -> Result<(), SortError> {
        if let Some(&index) = order.iter().find(|&&idx| idx >= self.nodes.len()) {
            return Err(SortError::UnknownNode {
                index,
                nodes: self.nodes.len(),
            });
        }

        match self.violations(order).first() {
            Some(&(from, to)) => Err(SortError::OrderViolation {
                producer: self.nodes[from].name.clone(),
                consumer: self.nodes[to].name.clone(),
            }),
            None => Ok(()),
        }
    }
}
