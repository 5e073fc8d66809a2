use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// An edge left over when the sorter could not place both of its ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedEdge {
    pub from: String,
    pub to: String,
    /// Tokens that produced this edge
    pub tokens: BTreeSet<String>,
}

impl fmt::Display for UnresolvedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = self.tokens.iter().map(String::as_str).collect();
        write!(f, "{} -> {} [{}]", self.from, self.to, tokens.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    #[error(
        "Deployer dependency cycle among [{}]; unresolved edges: {}",
        .deployers.join(", "),
        format_edges(.edges)
    )]
    Cycle {
        deployers: Vec<String>,
        edges: Vec<UnresolvedEdge>,
    },

    #[error("Invalid deployer '{deployer}': {reason}")]
    InvalidDescriptor { deployer: String, reason: String },

    #[error("Deployer '{0}' is already registered")]
    DuplicateDeployer(String),

    #[error("Sorted order runs consumer '{consumer}' before producer '{producer}'")]
    OrderViolation { producer: String, consumer: String },

    #[error("Order refers to node {index} but the graph has {nodes} nodes")]
    UnknownNode { index: usize, nodes: usize },
}

impl SortError {
    pub fn is_cycle(&self) -> bool {
        matches!(self, SortError::Cycle { .. })
    }
}

fn format_edges(edges: &[UnresolvedEdge]) -> String {
    if edges.is_empty() {
        return "none".to_string();
    }
    edges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_names_deployers_and_tokens() {
        let err = SortError::Cycle {
            deployers: vec!["d1".to_string(), "d2".to_string()],
            edges: vec![UnresolvedEdge {
                from: "d1".to_string(),
                to: "d2".to_string(),
                tokens: ["B".to_string()].into_iter().collect(),
            }],
        };

        let message = err.to_string();
        assert!(message.contains("[d1, d2]"));
        assert!(message.contains("d1 -> d2 [B]"));
        assert!(err.is_cycle());
    }

    #[test]
    fn test_duplicate_message() {
        let err = SortError::DuplicateDeployer("jar".to_string());
        assert_eq!(err.to_string(), "Deployer 'jar' is already registered");
        assert!(!err.is_cycle());
    }
}
