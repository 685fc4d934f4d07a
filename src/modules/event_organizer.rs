use crate::core::context::DeploymentContext;
use crate::core::module::Module;
use crate::domain::model::{ArgumentValue, ModuleResult};
use crate::utils::error::Result;

pub const MODULE_NAME: &str = "EventOrganizerModule";
pub const CONTRACT_NAME: &str = "EventOrganizer";
pub const RESULT_NAME: &str = "eventManage";

/// 部署 `EventOrganizer`（無建構子參數），以 `eventManage` 回傳
pub fn declare(m: &mut DeploymentContext) -> Result<ModuleResult> {
    let event_manage = m.contract(CONTRACT_NAME, Vec::<ArgumentValue>::new())?;

    Ok(ModuleResult::new().with(RESULT_NAME, event_manage))
}

pub fn module() -> Result<Module> {
    Module::new(MODULE_NAME, declare)
}
