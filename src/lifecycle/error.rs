use crate::sort::SortError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Deployer '{deployer}' failed in stage '{stage}' for unit '{unit}': {source}")]
    DeployFailed {
        unit: String,
        stage: String,
        deployer: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unknown stage '{0}'")]
    UnknownStage(String),

    #[error("Unit '{unit}' has already reached stage '{stage}'")]
    AlreadyDeployed { unit: String, stage: String },

    #[error("Unit '{0}' is not deployed")]
    NotDeployed(String),

    #[error(transparent)]
    Sort(#[from] SortError),
}
