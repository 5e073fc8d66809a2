//! Deployer manifests
//!
//! A manifest lists deployers with the stage they belong to. Registration order
//! is the order of the list. YAML and JSON are both accepted; `.json` files are
//! read as JSON and everything else as YAML.
//!
//! ```yaml
//! deployers:
//!   - name: web-parser
//!     stage: parse
//!     outputs: [web-metadata]
//!   - name: web-deployer
//!     inputs: [web-metadata]
//!     relative_order: 10
//! ```

use crate::deployer::{DeployerDescriptor, DEFAULT_RELATIVE_ORDER};
use crate::sort::{DependencyGraph, TieBreak, TopologicalSorter};
use crate::stage;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployerManifest {
    #[serde(default)]
    pub deployers: Vec<DeployerEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployerEntry {
    pub name: String,

    #[serde(default = "default_stage")]
    pub stage: String,

    #[serde(default)]
    pub inputs: Vec<String>,

    #[serde(default)]
    pub outputs: Vec<String>,

    #[serde(default = "default_relative_order")]
    pub relative_order: i32,
}

fn default_stage() -> String {
    stage::DEFAULT_STAGE.to_string()
}

fn default_relative_order() -> i32 {
    DEFAULT_RELATIVE_ORDER
}

impl DeployerEntry {
    pub fn descriptor(&self) -> DeployerDescriptor {
        DeployerDescriptor::new(self.name.clone())
            .with_inputs(self.inputs.iter().cloned())
            .with_outputs(self.outputs.iter().cloned())
            .with_relative_order(self.relative_order)
    }
}

/// Processing order for every stage of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub stages: Vec<StagePlan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePlan {
    pub stage: String,
    pub deployers: Vec<String>,
}

impl DeploymentPlan {
    /// The undeploy plan: stages and deployers both reversed
    pub fn reversed(&self) -> Self {
        Self {
            stages: self
                .stages
                .iter()
                .rev()
                .map(|s| StagePlan {
                    stage: s.stage.clone(),
                    deployers: s.deployers.iter().rev().cloned().collect(),
                })
                .collect(),
        }
    }

    pub fn deployer_count(&self) -> usize {
        self.stages.iter().map(|s| s.deployers.len()).sum()
    }
}

impl DeployerManifest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let manifest = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;

        debug!(
            path = %path.display(),
            deployers = manifest.deployers.len(),
            "Loaded deployer manifest"
        );
        Ok(manifest)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid YAML manifest")
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid JSON manifest")
    }

    /// Checks every deployer names one of `stages`.
    pub fn check_stages(&self, stages: &[String]) -> Result<()> {
        for entry in &self.deployers {
            if !stages.iter().any(|s| s == &entry.stage) {
                bail!(
                    "Deployer '{}' declares unknown stage '{}' (known stages: {})",
                    entry.name,
                    entry.stage,
                    stages.join(", ")
                );
            }
        }
        Ok(())
    }

    /// Sorts each stage's deployers. Stages without deployers are omitted.
    pub fn plan(&self, stages: &[String], tie_break: TieBreak) -> Result<DeploymentPlan> {
        self.plan_with(stages, tie_break, false)
    }

    /// Like [`plan`](Self::plan), optionally re-checking every stage order
    /// against its graph edges.
    pub fn plan_with(
        &self,
        stages: &[String],
        tie_break: TieBreak,
        verify: bool,
    ) -> Result<DeploymentPlan> {
        self.check_stages(stages)?;

        let sorter = TopologicalSorter::new(tie_break);
        let mut plan = DeploymentPlan { stages: Vec::new() };
        for stage in stages {
            let descriptors: Vec<DeployerDescriptor> = self
                .deployers
                .iter()
                .filter(|e| &e.stage == stage)
                .map(DeployerEntry::descriptor)
                .collect();
            if descriptors.is_empty() {
                continue;
            }

            let graph = DependencyGraph::build(&descriptors)
                .with_context(|| format!("Invalid deployers in stage '{}'", stage))?;
            let order = sorter
                .sort(&graph)
                .with_context(|| format!("Cannot order deployers of stage '{}'", stage))?;
            if verify {
                graph
                    .verify(&order)
                    .with_context(|| format!("Order of stage '{}' failed verification", stage))?;
                debug!(stage = %stage, deployers = order.len(), "Verified stage order");
            }

            plan.stages.push(StagePlan {
                stage: stage.clone(),
                deployers: order
                    .into_iter()
                    .map(|idx| graph.node(idx).name.clone())
                    .collect(),
            });
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortError;

    const MANIFEST: &str = r#"
deployers:
  - name: consumer
    inputs: [meta]
  - name: producer
    outputs: [meta]
  - name: parser
    stage: parse
    relative_order: 1
"#;

    #[test]
    fn test_parse_yaml_defaults() {
        let manifest = DeployerManifest::from_yaml_str(MANIFEST).unwrap();
        assert_eq!(manifest.deployers.len(), 3);
        assert_eq!(manifest.deployers[0].stage, stage::REAL);
        assert_eq!(manifest.deployers[0].relative_order, DEFAULT_RELATIVE_ORDER);
        assert_eq!(manifest.deployers[2].relative_order, 1);
    }

    #[test]
    fn test_parse_json() {
        let manifest = DeployerManifest::from_json_str(
            r#"{"deployers": [{"name": "a", "stage": "parse", "outputs": ["x"]}]}"#,
        )
        .unwrap();
        assert_eq!(manifest.deployers[0].descriptor().outputs.len(), 1);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = DeployerManifest::from_yaml_str("deployers:\n  - name: a\n    input: [x]\n")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("input"));
    }

    #[test]
    fn test_plan_orders_each_stage() {
        let manifest = DeployerManifest::from_yaml_str(MANIFEST).unwrap();
        let plan = manifest
            .plan(&stage::standard_stages(), TieBreak::Registration)
            .unwrap();

        assert_eq!(plan.stages.len(), 2);
        assert_eq!(plan.stages[0].stage, "parse");
        assert_eq!(plan.stages[1].deployers, vec!["producer", "consumer"]);
        assert_eq!(plan.deployer_count(), 3);

        let reversed = plan.reversed();
        assert_eq!(reversed.stages[0].stage, "real");
        assert_eq!(reversed.stages[0].deployers, vec!["consumer", "producer"]);
    }

    #[test]
    fn test_verified_plan_matches_plain_plan() {
        let manifest = DeployerManifest::from_yaml_str(MANIFEST).unwrap();
        let stages = stage::standard_stages();

        let plain = manifest.plan(&stages, TieBreak::Registration).unwrap();
        let verified = manifest
            .plan_with(&stages, TieBreak::Registration, true)
            .unwrap();
        assert_eq!(plain, verified);
    }

    #[test]
    fn test_plan_rejects_unknown_stage() {
        let manifest =
            DeployerManifest::from_yaml_str("deployers:\n  - name: a\n    stage: nowhere\n").unwrap();
        let err = manifest
            .plan(&stage::standard_stages(), TieBreak::Registration)
            .unwrap_err();
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_plan_surfaces_cycle() {
        let manifest = DeployerManifest::from_yaml_str(
            "deployers:\n  - {name: a, inputs: [x], outputs: [y]}\n  - {name: b, inputs: [y], outputs: [x]}\n",
        )
        .unwrap();
        let err = manifest
            .plan(&stage::standard_stages(), TieBreak::Registration)
            .unwrap_err();

        let cause = err.downcast_ref::<SortError>().unwrap();
        assert!(cause.is_cycle());
    }
}
