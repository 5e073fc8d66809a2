//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::UnitStarted { unit } => {
                info!(unit = %unit, "Deploying unit");
            }
            ProgressEvent::StageEntered {
                unit,
                stage,
                deployers,
            } => {
                info!(unit = %unit, stage = %stage, deployers, "Entering stage");
            }
            ProgressEvent::DeployerCompleted {
                unit,
                stage,
                deployer,
                duration,
            } => {
                debug!(
                    unit = %unit,
                    stage = %stage,
                    deployer = %deployer,
                    duration_ms = duration.as_millis(),
                    "Deployer completed"
                );
            }
            ProgressEvent::RolledBack { unit, undeployed } => {
                warn!(unit = %unit, undeployed, "Rolled back unit");
            }
            ProgressEvent::UnitDeployed {
                unit,
                stage,
                total_time,
            } => {
                info!(
                    unit = %unit,
                    stage = %stage,
                    total_time_ms = total_time.as_millis(),
                    "Unit deployed"
                );
            }
            ProgressEvent::UnitUndeployed { unit, undeployed } => {
                info!(unit = %unit, undeployed, "Unit undeployed");
            }
            ProgressEvent::Failed { unit, error } => {
                warn!(unit = %unit, error = %error, "Deployment failed");
            }
        }
    }
}
