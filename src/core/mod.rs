pub mod context;
pub mod engine;
pub mod module;
pub mod plan;

pub use crate::domain::model::{ArgumentValue, ContractHandle, ModuleResult};
pub use crate::domain::ports::{ArtifactResolver, DeploymentExecutor, Storage};
pub use crate::utils::error::Result;
