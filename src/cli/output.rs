//! Output formatting for deployment plans
//!
//! Plans can be rendered as JSON, YAML or human-readable text. JSON and YAML
//! share the serde representation of [`DeploymentPlan`].
//!
//! # Example
//!
//! ```
//! use deployorder::cli::output::{OutputFormat, OutputFormatter};
//! use deployorder::manifest::DeployerManifest;
//! use deployorder::stage::standard_stages;
//! use deployorder::TieBreak;
//!
//! let manifest = DeployerManifest::from_yaml_str("deployers:\n  - name: web\n").unwrap();
//! let plan = manifest.plan(&standard_stages(), TieBreak::Registration).unwrap();
//!
//! let output = OutputFormatter::new(OutputFormat::Json).format_plan(&plan).unwrap();
//! assert!(output.contains("\"web\""));
//! ```

use anyhow::{Context, Result};

use crate::manifest::DeploymentPlan;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a deployment plan.
    pub fn format_plan(&self, plan: &DeploymentPlan) -> Result<String> {
        self.format_plan_titled(plan, "Deployment Plan")
    }

    pub fn format_undeploy_plan(&self, plan: &DeploymentPlan) -> Result<String> {
        self.format_plan_titled(plan, "Undeploy Plan")
    }

    fn format_plan_titled(&self, plan: &DeploymentPlan, title: &str) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(plan).context("Failed to serialize plan to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(plan).context("Failed to serialize plan to YAML")
            }
            OutputFormat::Human => Ok(format_human(plan, title)),
        }
    }
}

fn format_human(plan: &DeploymentPlan, title: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\u{2713} {} ({} deployers, {} stages)\n",
        title,
        plan.deployer_count(),
        plan.stages.len()
    ));
    output.push_str(RULE);
    output.push_str("\n\n");

    if plan.stages.is_empty() {
        output.push_str("(no deployers)\n");
        return output;
    }

    for stage in &plan.stages {
        output.push_str(&format!("{}:\n", stage.stage));
        for (i, deployer) in stage.deployers.iter().enumerate() {
            let is_last = i == stage.deployers.len() - 1;
            let connector = if is_last { "\u{2514}" } else { "\u{251C}" };
            output.push_str(&format!("{}\u{2500} {}. {}\n", connector, i + 1, deployer));
        }
        output.push('\n');
    }

    output
}
