use crate::sort::SortError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Relative order given to deployers that never set one.
///
/// Unordered deployers sort after every deployer with an explicit order.
pub const DEFAULT_RELATIVE_ORDER: i32 = i32::MAX;

/// Immutable view of a deployer as seen by the dependency sorter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployerDescriptor {
    /// Stable identity, unique within a stage
    pub name: String,

    /// Tokens that must be available before this deployer runs
    #[serde(default)]
    pub inputs: BTreeSet<String>,

    /// Tokens this deployer makes available
    #[serde(default)]
    pub outputs: BTreeSet<String>,

    /// Lower runs earlier among deployers with no dependency between them
    #[serde(default = "default_relative_order")]
    pub relative_order: i32,
}

fn default_relative_order() -> i32 {
    DEFAULT_RELATIVE_ORDER
}

impl DeployerDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
            relative_order: DEFAULT_RELATIVE_ORDER,
        }
    }

    pub fn with_input(mut self, token: impl Into<String>) -> Self {
        self.inputs.insert(token.into());
        self
    }

    pub fn with_output(mut self, token: impl Into<String>) -> Self {
        self.outputs.insert(token.into());
        self
    }

    pub fn with_inputs<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn with_outputs<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs.extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn with_relative_order(mut self, relative_order: i32) -> Self {
        self.relative_order = relative_order;
        self
    }

    /// Tokens both consumed and produced: this deployer passes them through
    /// and modifies them.
    pub fn modified_tokens(&self) -> impl Iterator<Item = &str> {
        self.inputs
            .intersection(&self.outputs)
            .map(String::as_str)
    }

    /// Inputs that this deployer does not also produce
    pub fn consumed_tokens(&self) -> impl Iterator<Item = &str> {
        self.inputs.difference(&self.outputs).map(String::as_str)
    }

    /// Outputs that this deployer does not also consume
    pub fn produced_tokens(&self) -> impl Iterator<Item = &str> {
        self.outputs.difference(&self.inputs).map(String::as_str)
    }

    /// Whether this deployer modifies at least one token
    pub fn is_transient(&self) -> bool {
        self.modified_tokens().next().is_some()
    }

    /// Checks the descriptor before it enters a dependency graph.
    ///
    /// Blank names and blank token names are rejected rather than coerced.
    pub fn validate(&self) -> Result<(), SortError> {
        if self.name.trim().is_empty() {
            return Err(SortError::InvalidDescriptor {
                deployer: self.name.clone(),
                reason: "deployer name must not be empty".to_string(),
            });
        }

        let blank_input = self.inputs.iter().any(|t| t.trim().is_empty());
        let blank_output = self.outputs.iter().any(|t| t.trim().is_empty());
        if blank_input || blank_output {
            return Err(SortError::InvalidDescriptor {
                deployer: self.name.clone(),
                reason: format!(
                    "{} tokens must not be empty",
                    if blank_input { "input" } else { "output" }
                ),
            });
        }

        Ok(())
    }
}

impl fmt::Display for DeployerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.relative_order != DEFAULT_RELATIVE_ORDER {
            write!(f, "@{}", self.relative_order)?;
        }
        Ok(())
    }
}

/// Anything the sorter can order: the payload only has to expose its descriptor.
pub trait Described {
    fn descriptor(&self) -> &DeployerDescriptor;

    fn name(&self) -> &str {
        &self.descriptor().name
    }
}

impl Described for DeployerDescriptor {
    fn descriptor(&self) -> &DeployerDescriptor {
        self
    }
}

impl<T: Described + ?Sized> Described for Arc<T> {
    fn descriptor(&self) -> &DeployerDescriptor {
        (**self).descriptor()
    }
}

impl<T: Described + ?Sized> Described for Box<T> {
    fn descriptor(&self) -> &DeployerDescriptor {
        (**self).descriptor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let d = DeployerDescriptor::new("jar")
            .with_inputs(["a", "b"])
            .with_output("c")
            .with_relative_order(5);

        assert_eq!(d.name, "jar");
        assert_eq!(d.inputs.len(), 2);
        assert!(d.outputs.contains("c"));
        assert_eq!(d.relative_order, 5);
    }

    #[test]
    fn test_default_relative_order() {
        let d = DeployerDescriptor::new("plain");
        assert_eq!(d.relative_order, DEFAULT_RELATIVE_ORDER);
        assert_eq!(d.to_string(), "plain");
        assert_eq!(d.with_relative_order(3).to_string(), "plain@3");
    }

    #[test]
    fn test_token_partition() {
        let d = DeployerDescriptor::new("modifier")
            .with_inputs(["shared", "in"])
            .with_outputs(["shared", "out"]);

        assert_eq!(d.modified_tokens().collect::<Vec<_>>(), vec!["shared"]);
        assert_eq!(d.consumed_tokens().collect::<Vec<_>>(), vec!["in"]);
        assert_eq!(d.produced_tokens().collect::<Vec<_>>(), vec!["out"]);
        assert!(d.is_transient());
    }

    #[test]
    fn test_not_transient_without_overlap() {
        let d = DeployerDescriptor::new("p").with_input("a").with_output("b");
        assert!(!d.is_transient());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let err = DeployerDescriptor::new("  ").validate().unwrap_err();
        assert!(matches!(err, SortError::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_validate_rejects_blank_token() {
        let err = DeployerDescriptor::new("d")
            .with_output("")
            .validate()
            .unwrap_err();
        match err {
            SortError::InvalidDescriptor { deployer, reason } => {
                assert_eq!(deployer, "d");
                assert!(reason.contains("output"));
            }
            other => panic!("Expected InvalidDescriptor, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_defaults() {
        let d: DeployerDescriptor = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert!(d.inputs.is_empty());
        assert_eq!(d.relative_order, DEFAULT_RELATIVE_ORDER);
    }

    #[test]
    fn test_described_through_arc() {
        let d = Arc::new(DeployerDescriptor::new("shared"));
        assert_eq!(d.name(), "shared");
    }
}
