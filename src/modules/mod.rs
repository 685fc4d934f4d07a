//! 內建的部署模組描述

pub mod event_organizer;

use crate::core::module::ModuleRegistry;
use crate::utils::error::Result;

/// 註冊所有內建模組
pub fn register_builtin(registry: &mut ModuleRegistry) -> Result<()> {
    registry.register(event_organizer::module()?)?;
    Ok(())
}
