//! Command handlers. Each returns the process exit code.

use super::commands::{CheckArgs, PlanArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::config::DeployOrderConfig;
use crate::manifest::{DeployerManifest, DeploymentPlan};
use crate::sort::TieBreak;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, error, info};

pub fn handle_plan(args: &PlanArgs) -> i32 {
    match run_plan(args) {
        Ok(output) => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            0
        }
        Err(e) => {
            error!("Planning failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

pub fn handle_check(args: &CheckArgs, quiet: bool) -> i32 {
    match load_plan(&args.manifest, None) {
        Ok(plan) => {
            info!(
                manifest = %args.manifest.display(),
                deployers = plan.deployer_count(),
                "Manifest is valid"
            );
            if !quiet {
                println!(
                    "\u{2713} {}: {} deployers across {} stages, no cycles",
                    args.manifest.display(),
                    plan.deployer_count(),
                    plan.stages.len()
                );
            }
            0
        }
        Err(e) => {
            error!("Check failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn run_plan(args: &PlanArgs) -> Result<String> {
    let plan = load_plan(&args.manifest, args.tie_break.map(Into::into))?;
    let formatter = OutputFormatter::new(OutputFormat::from(args.format));

    if args.reverse {
        formatter.format_undeploy_plan(&plan.reversed())
    } else {
        formatter.format_plan(&plan)
    }
}

fn load_plan(path: &Path, tie_break: Option<TieBreak>) -> Result<DeploymentPlan> {
    let config = DeployOrderConfig::from_env().context("Invalid environment configuration")?;
    config.validate()?;
    debug!("{}", config);

    let tie_break = tie_break.unwrap_or(config.tie_break);
    let manifest = DeployerManifest::from_path(path)?;
    manifest
        .plan_with(&config.stages, tie_break, config.verify_order)
        .with_context(|| format!("Manifest {} cannot be ordered", path.display()))
}
