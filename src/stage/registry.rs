//! Per-stage deployer registry
//!
//! One [`SortedDeployers`] per stage, created on the first registration and
//! dropped once the stage is empty. All mutations go through a single write
//! lock; deploy passes hold the read lock for their whole duration so the order
//! they iterate cannot change underneath them.

use crate::config::DeployOrderConfig;
use crate::deployer::Described;
use crate::sort::{SortError, SortedDeployers, TieBreak};
use std::collections::HashMap;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::debug;

pub struct StagedRegistry<T> {
    stages: RwLock<HashMap<String, SortedDeployers<T>>>,
    tie_break: TieBreak,
    verify_order: bool,
}

impl<T> Default for StagedRegistry<T>
where
    T: Described + Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StagedRegistry<T>
where
    T: Described + Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::with_tie_break(TieBreak::default())
    }

    pub fn with_tie_break(tie_break: TieBreak) -> Self {
        Self {
            stages: RwLock::new(HashMap::new()),
            tie_break,
            verify_order: false,
        }
    }

    pub fn from_config(config: &DeployOrderConfig) -> Self {
        Self {
            stages: RwLock::new(HashMap::new()),
            tie_break: config.tie_break,
            verify_order: config.verify_order,
        }
    }

    /// Registers a deployer in `stage` and re-sorts that stage.
    ///
    /// A rejected deployer leaves the stage as it was.
    pub async fn add_deployer(&self, stage: &str, deployer: T) -> Result<(), SortError> {
        let mut stages = self.stages.write().await;
        let (tie_break, verify) = (self.tie_break, self.verify_order);
        let sorted = stages
            .entry(stage.to_string())
            .or_insert_with(|| SortedDeployers::with_tie_break(tie_break).verify_order(verify));

        let name = deployer.name().to_string();
        let result = sorted.insert(deployer);
        if sorted.is_empty() {
            stages.remove(stage);
        }

        result?;
        debug!(stage = %stage, deployer = %name, "Registered deployer");
        Ok(())
    }

    /// Unregisters a deployer, dropping the stage when it becomes empty.
    pub async fn remove_deployer(&self, stage: &str, name: &str) -> Result<Option<T>, SortError> {
        let mut stages = self.stages.write().await;
        let Some(sorted) = stages.get_mut(stage) else {
            return Ok(None);
        };

        let removed = sorted.remove(name)?;
        if sorted.is_empty() {
            stages.remove(stage);
            debug!(stage = %stage, "Stage has no deployers left");
        }

        if removed.is_some() {
            debug!(stage = %stage, deployer = %name, "Unregistered deployer");
        }
        Ok(removed)
    }

    /// A copy of the stage's current order; empty for unknown stages.
    pub async fn ordered_deployers(&self, stage: &str) -> Vec<T> {
        self.stages
            .read()
            .await
            .get(stage)
            .map(|s| s.current_order().to_vec())
            .unwrap_or_default()
    }

    /// Stages that currently hold deployers, sorted by name
    pub async fn stages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stages.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn deployer_count(&self) -> usize {
        self.stages.read().await.values().map(|s| s.len()).sum()
    }

    /// Holds the read lock so the orders stay fixed while the guard lives.
    pub async fn read(&self) -> StageOrders<'_, T> {
        StageOrders {
            guard: self.stages.read().await,
        }
    }
}

/// Read access to every stage order under one lock acquisition
pub struct StageOrders<'a, T> {
    guard: RwLockReadGuard<'a, HashMap<String, SortedDeployers<T>>>,
}

impl<T> StageOrders<'_, T>
where
    T: Described + Clone,
{
    pub fn ordered(&self, stage: &str) -> &[T] {
        self.guard
            .get(stage)
            .map(|s| s.current_order())
            .unwrap_or(&[])
    }

    pub fn contains_stage(&self, stage: &str) -> bool {
        self.guard.contains_key(stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployer::DeployerDescriptor;
    use crate::stage::{PARSE, REAL};

    fn names(order: &[DeployerDescriptor]) -> Vec<String> {
        order.iter().map(|d| d.name.clone()).collect()
    }

    #[tokio::test]
    async fn test_unknown_stage_is_empty() {
        let registry: StagedRegistry<DeployerDescriptor> = StagedRegistry::new();
        assert!(registry.ordered_deployers("nowhere").await.is_empty());
        assert!(registry.read().await.ordered("nowhere").is_empty());
    }

    #[tokio::test]
    async fn test_stages_are_sorted_independently() {
        let registry = StagedRegistry::new();
        registry
            .add_deployer(REAL, DeployerDescriptor::new("consumer").with_input("x"))
            .await
            .unwrap();
        registry
            .add_deployer(PARSE, DeployerDescriptor::new("parser").with_output("x"))
            .await
            .unwrap();
        registry
            .add_deployer(REAL, DeployerDescriptor::new("producer").with_output("x"))
            .await
            .unwrap();

        assert_eq!(
            names(&registry.ordered_deployers(REAL).await),
            vec!["producer", "consumer"]
        );
        assert_eq!(names(&registry.ordered_deployers(PARSE).await), vec!["parser"]);
        assert_eq!(registry.stages().await, vec!["parse", "real"]);
        assert_eq!(registry.deployer_count().await, 3);
    }

    #[tokio::test]
    async fn test_stage_dropped_when_empty() {
        let registry = StagedRegistry::new();
        registry
            .add_deployer(PARSE, DeployerDescriptor::new("only"))
            .await
            .unwrap();
        let removed = registry.remove_deployer(PARSE, "only").await.unwrap();

        assert_eq!(removed.unwrap().name, "only");
        assert!(registry.stages().await.is_empty());
        assert!(!registry.read().await.contains_stage(PARSE));
    }

    #[tokio::test]
    async fn test_rejected_first_deployer_does_not_create_stage() {
        let registry = StagedRegistry::new();
        let err = registry
            .add_deployer(PARSE, DeployerDescriptor::new(""))
            .await
            .unwrap_err();

        assert!(matches!(err, SortError::InvalidDescriptor { .. }));
        assert!(registry.stages().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_from_unknown_stage() {
        let registry: StagedRegistry<DeployerDescriptor> = StagedRegistry::new();
        assert!(registry.remove_deployer(REAL, "x").await.unwrap().is_none());
    }
}
