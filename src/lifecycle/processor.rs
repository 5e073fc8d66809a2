use super::{Deployer, DeploymentUnit, LifecycleError};
use crate::config::DeployOrderConfig;
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::stage::{StageOrders, StagedRegistry};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};

pub struct DeployerProcessor {
    registry: StagedRegistry<Arc<dyn Deployer>>,
    stages: Vec<String>,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl DeployerProcessor {
    pub fn new(stages: Vec<String>) -> Self {
        Self {
            registry: StagedRegistry::new(),
            stages,
            progress_handler: None,
        }
    }

    pub fn from_config(config: &DeployOrderConfig) -> Self {
        Self {
            registry: StagedRegistry::from_config(config),
            stages: config.stages.clone(),
            progress_handler: None,
        }
    }

    pub fn with_progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn registry(&self) -> &StagedRegistry<Arc<dyn Deployer>> {
        &self.registry
    }

    /// Registers a deployer in the stage it declares.
    ///
    /// Waits for any in-flight deploy or undeploy pass to finish.
    pub async fn add_deployer(&self, deployer: Arc<dyn Deployer>) -> Result<(), LifecycleError> {
        let stage = deployer.stage().to_string();
        self.stage_index(&stage)?;
        self.registry.add_deployer(&stage, deployer).await?;
        Ok(())
    }

    pub async fn remove_deployer(
        &self,
        stage: &str,
        name: &str,
    ) -> Result<Option<Arc<dyn Deployer>>, LifecycleError> {
        self.stage_index(stage)?;
        Ok(self.registry.remove_deployer(stage, name).await?)
    }

    /// Deploys the unit through every configured stage.
    pub async fn deploy(&self, unit: &mut DeploymentUnit) -> Result<(), LifecycleError> {
        match self.stages.last() {
            Some(last) => self.deploy_to(unit, last).await,
            None => Ok(()),
        }
    }

    /// Deploys the unit from its current stage up to and including `target`.
    ///
    /// If any deployer fails, everything deployed for this unit so far is
    /// undeployed in reverse order and the unit ends up not deployed.
    pub async fn deploy_to(
        &self,
        unit: &mut DeploymentUnit,
        target: &str,
    ) -> Result<(), LifecycleError> {
        let target_idx = self.stage_index(target)?;
        let current_idx = match unit.stage() {
            Some(stage) => Some(self.stage_index(stage)?),
            None => None,
        };

        if let Some(current) = current_idx {
            if current >= target_idx {
                return Err(LifecycleError::AlreadyDeployed {
                    unit: unit.name().to_string(),
                    stage: self.stages[current].clone(),
                });
            }
        }

        let start = Instant::now();
        self.emit(ProgressEvent::UnitStarted {
            unit: unit.name().to_string(),
        });

        let orders = self.registry.read().await;
        let mut ran: Vec<Arc<dyn Deployer>> = Vec::new();
        let first = current_idx.map_or(0, |c| c + 1);

        for stage in &self.stages[first..=target_idx] {
            let deployers = orders.ordered(stage);
            debug!(unit = %unit.name(), stage = %stage, deployers = deployers.len(), "Entering stage");
            self.emit(ProgressEvent::StageEntered {
                unit: unit.name().to_string(),
                stage: stage.clone(),
                deployers: deployers.len(),
            });

            for deployer in deployers {
                let deployer_start = Instant::now();
                if let Err(source) = deployer.deploy(unit).await {
                    let failed = deployer.name().to_string();
                    error!(
                        unit = %unit.name(),
                        stage = %stage,
                        deployer = %failed,
                        error = %source,
                        "Deployer failed, rolling back"
                    );

                    let undeployed = self.rollback(unit, &orders, &ran, current_idx).await;
                    unit.set_stage(None);
                    warn!(unit = %unit.name(), undeployed, "Rolled back deployment");

                    self.emit(ProgressEvent::RolledBack {
                        unit: unit.name().to_string(),
                        undeployed,
                    });
                    self.emit(ProgressEvent::Failed {
                        unit: unit.name().to_string(),
                        error: source.to_string(),
                    });

                    return Err(LifecycleError::DeployFailed {
                        unit: unit.name().to_string(),
                        stage: stage.clone(),
                        deployer: failed,
                        source,
                    });
                }

                ran.push(Arc::clone(deployer));
                self.emit(ProgressEvent::DeployerCompleted {
                    unit: unit.name().to_string(),
                    stage: stage.clone(),
                    deployer: deployer.name().to_string(),
                    duration: deployer_start.elapsed(),
                });
            }

            unit.set_stage(Some(stage.clone()));
        }

        self.emit(ProgressEvent::UnitDeployed {
            unit: unit.name().to_string(),
            stage: target.to_string(),
            total_time: start.elapsed(),
        });
        Ok(())
    }

    /// Undeploys the unit from every stage it reached, newest first.
    ///
    /// Returns the number of undeploy calls made.
    pub async fn undeploy(&self, unit: &mut DeploymentUnit) -> Result<usize, LifecycleError> {
        let reached = match unit.stage() {
            Some(stage) => self.stage_index(stage)?,
            None => return Err(LifecycleError::NotDeployed(unit.name().to_string())),
        };

        let orders = self.registry.read().await;
        let undeployed = self.undeploy_through(unit, &orders, reached).await;
        unit.set_stage(None);

        self.emit(ProgressEvent::UnitUndeployed {
            unit: unit.name().to_string(),
            undeployed,
        });
        Ok(undeployed)
    }

    async fn rollback(
        &self,
        unit: &mut DeploymentUnit,
        orders: &StageOrders<'_, Arc<dyn Deployer>>,
        ran: &[Arc<dyn Deployer>],
        previously_reached: Option<usize>,
    ) -> usize {
        let mut undeployed = 0;
        for deployer in ran.iter().rev() {
            deployer.undeploy(unit).await;
            undeployed += 1;
        }

        if let Some(reached) = previously_reached {
            undeployed += self.undeploy_through(unit, orders, reached).await;
        }
        undeployed
    }

    async fn undeploy_through(
        &self,
        unit: &mut DeploymentUnit,
        orders: &StageOrders<'_, Arc<dyn Deployer>>,
        reached: usize,
    ) -> usize {
        let mut undeployed = 0;
        for stage in self.stages[..=reached].iter().rev() {
            debug!(unit = %unit.name(), stage = %stage, "Undeploying stage");
            for deployer in orders.ordered(stage).iter().rev() {
                deployer.undeploy(unit).await;
                undeployed += 1;
            }
        }
        undeployed
    }

    fn stage_index(&self, stage: &str) -> Result<usize, LifecycleError> {
        self.stages
            .iter()
            .position(|s| s == stage)
            .ok_or_else(|| LifecycleError::UnknownStage(stage.to_string()))
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }
}
