pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod modules;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{
    artifacts::{FsArtifactResolver, InMemoryArtifacts},
    executor::DryRunExecutor,
    storage::LocalStorage,
};
pub use crate::config::toml_config::DeploymentConfig;
pub use crate::core::{
    context::DeploymentContext,
    engine::{DeploymentEngine, DeploymentReport},
    module::{Module, ModuleRegistry},
    plan::{ExecutionPlan, Planner},
};
pub use crate::domain::model::{
    ArgumentValue, Artifact, ContractHandle, ContractOptions, ModuleResult,
};
pub use crate::utils::error::{IgnitionError, Result};
