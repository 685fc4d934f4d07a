use crate::core::context::DeploymentContext;
use crate::domain::model::{ContextId, DeploymentAction, FutureId, ModuleResult};
use crate::utils::error::{IgnitionError, Result};
use crate::utils::validation::validate_identifier;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

type Declaration = dyn Fn(&mut DeploymentContext) -> Result<ModuleResult> + Send + Sync;

/// 具名的部署模組：名稱加上一個宣告函式
#[derive(Clone)]
pub struct Module {
    name: String,
    declaration: Arc<Declaration>,
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module").field("name", &self.name).finish()
    }
}

impl Module {
    pub fn new<F>(name: impl Into<String>, declaration: F) -> Result<Self>
    where
        F: Fn(&mut DeploymentContext) -> Result<ModuleResult> + Send + Sync + 'static,
    {
        let name = name.into();
        validate_identifier("module id", &name)?;
        Ok(Self {
            name,
            declaration: Arc::new(declaration),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 在呼叫端提供的上下文中執行宣告函式，並檢查回傳的 handle 都屬於該上下文
    pub fn declare_into(&self, ctx: &mut DeploymentContext) -> Result<ModuleResult> {
        let result = (self.declaration)(ctx)?;
        for (_, handle) in &result {
            ctx.check_owned(handle)?;
        }
        Ok(result)
    }

    /// 用全新的上下文宣告此模組
    pub fn declare(&self) -> Result<DeclaredModule> {
        let mut ctx = DeploymentContext::new(&self.name);
        let result = self.declare_into(&mut ctx)?;
        let context = ctx.id();

        tracing::debug!(
            "📦 Module {} declared {} action(s), {} result(s)",
            self.name,
            ctx.len(),
            result.len()
        );

        Ok(DeclaredModule {
            module_id: self.name.clone(),
            context,
            actions: ctx.into_actions(),
            result,
        })
    }
}

/// 宣告完成的模組：動作清單與結果對應
#[derive(Debug, Clone)]
pub struct DeclaredModule {
    pub module_id: String,
    pub context: ContextId,
    pub actions: Vec<DeploymentAction>,
    pub result: ModuleResult,
}

impl DeclaredModule {
    pub fn result_future_ids(&self) -> BTreeMap<String, FutureId> {
        self.result
            .iter()
            .map(|(name, handle)| (name.clone(), handle.future_id().clone()))
            .collect()
    }
}

/// 明確傳遞的模組註冊表，依註冊順序保存
#[derive(Debug, Default, Clone)]
pub struct ModuleRegistry {
    modules: Vec<Module>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Module) -> Result<()> {
        if self.get(module.name()).is_some() {
            return Err(IgnitionError::DuplicateModule {
                name: module.name().to_string(),
            });
        }
        tracing::debug!("Registered module {}", module.name());
        self.modules.push(module);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.name() == name)
    }

    pub fn require(&self, name: &str) -> Result<&Module> {
        self.get(name).ok_or_else(|| IgnitionError::UnknownModule {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(Module::name).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ArgumentValue;

    const NO_ARGS: [ArgumentValue; 0] = [];

    fn token_module(name: &str) -> Module {
        Module::new(name, |m: &mut DeploymentContext| {
            let token = m.contract("Token", NO_ARGS)?;
            Ok(ModuleResult::new().with("token", token))
        })
        .unwrap()
    }

    #[test]
    fn test_declare_collects_actions_and_results() {
        let declared = token_module("TokenModule").declare().unwrap();

        assert_eq!(declared.module_id, "TokenModule");
        assert_eq!(declared.actions.len(), 1);
        assert_eq!(declared.result.len(), 1);
        assert_eq!(
            declared.result_future_ids().get("token").unwrap().as_str(),
            "TokenModule#Token"
        );
    }

    #[test]
    fn test_each_declaration_uses_a_fresh_context() {
        let module = token_module("TokenModule");
        let first = module.declare().unwrap();
        let second = module.declare().unwrap();

        assert_ne!(first.context, second.context);
        assert_ne!(first.result.get("token"), second.result.get("token"));
    }

    #[test]
    fn test_invalid_module_name_rejected() {
        let result = Module::new("Token Module", |_m: &mut DeploymentContext| Ok(ModuleResult::new()));
        assert!(matches!(result, Err(IgnitionError::InvalidIdentifier { .. })));
    }

    #[test]
    fn test_declaration_error_propagates() {
        let module = Module::new("Broken", |m: &mut DeploymentContext| {
            m.contract("Token", NO_ARGS)?;
            m.contract("Token", NO_ARGS)?;
            Ok(ModuleResult::new())
        })
        .unwrap();

        assert!(matches!(
            module.declare(),
            Err(IgnitionError::DuplicateFutureId { .. })
        ));
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut registry = ModuleRegistry::new();
        registry.register(token_module("A")).unwrap();
        registry.register(token_module("B")).unwrap();

        let err = registry.register(token_module("A")).unwrap_err();
        assert!(matches!(err, IgnitionError::DuplicateModule { .. }));
        assert_eq!(registry.names(), vec!["A", "B"]);
        assert!(registry.require("C").is_err());
    }
}
