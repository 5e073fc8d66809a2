//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while a deployment unit moves through its stages
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A deploy pass started for a unit
    UnitStarted { unit: String },

    /// The unit entered a stage
    StageEntered { unit: String, stage: String, deployers: usize },

    /// One deployer finished deploying the unit
    DeployerCompleted {
        unit: String,
        stage: String,
        deployer: String,
        duration: Duration,
    },

    /// A failure was rolled back
    RolledBack { unit: String, undeployed: usize },

    /// The unit reached its target stage
    UnitDeployed { unit: String, stage: String, total_time: Duration },

    /// The unit was fully undeployed
    UnitUndeployed { unit: String, undeployed: usize },

    /// The deploy pass failed
    Failed { unit: String, error: String },
}

pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
