//! Deployment lifecycle
//!
//! Drives a [`DeploymentUnit`] through the configured stages, calling each
//! stage's deployers in their sorted order. A failure rolls the unit all the
//! way back; undeploy runs every stage, and every deployer within it, in
//! reverse.

mod error;
mod processor;
mod unit;

pub use error::LifecycleError;
pub use processor::DeployerProcessor;
pub use unit::DeploymentUnit;

use crate::deployer::Described;
use crate::stage;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Deployer: Described + Send + Sync {
    /// Stage this deployer is registered in
    fn stage(&self) -> &str {
        stage::DEFAULT_STAGE
    }

    async fn deploy(&self, unit: &mut DeploymentUnit) -> Result<()>;

    /// Reverses `deploy`. Undeploy cannot fail.
    async fn undeploy(&self, _unit: &mut DeploymentUnit) {}
}
