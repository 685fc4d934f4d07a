use crate::domain::model::{
    ArgumentValue, ContextId, ContractHandle, ContractOptions, DeploymentAction, FutureId,
};
use crate::utils::error::{IgnitionError, Result};
use crate::utils::validation::{validate_contract_name, validate_identifier};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// 模組宣告時注入的協調上下文。
///
/// 只記錄「要部署什麼」，不做任何 I/O；計畫是有序的動作清單，
/// 外加 future id 到索引的對應。
#[derive(Debug)]
pub struct DeploymentContext {
    id: ContextId,
    module_id: String,
    actions: Vec<DeploymentAction>,
    index_by_future: HashMap<FutureId, usize>,
}

impl DeploymentContext {
    pub fn new(module_id: impl Into<String>) -> Self {
        Self {
            id: ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)),
            module_id: module_id.into(),
            actions: Vec::new(),
            index_by_future: HashMap::new(),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// 宣告一個合約部署，回傳代表該部署的 handle
    pub fn contract<I, A>(&mut self, contract_name: &str, args: I) -> Result<ContractHandle>
    where
        I: IntoIterator<Item = A>,
        A: Into<ArgumentValue>,
    {
        self.contract_with(contract_name, args, ContractOptions::default())
    }

    pub fn contract_with<I, A>(
        &mut self,
        contract_name: &str,
        args: I,
        options: ContractOptions,
    ) -> Result<ContractHandle>
    where
        I: IntoIterator<Item = A>,
        A: Into<ArgumentValue>,
    {
        validate_contract_name(contract_name)?;

        let local_id = match &options.id {
            Some(id) => {
                validate_identifier("contract id", id)?;
                id.clone()
            }
            None => bare_contract_name(contract_name).to_string(),
        };
        let future_id = FutureId::new(&self.module_id, &local_id);

        if self.index_by_future.contains_key(&future_id) {
            return Err(IgnitionError::DuplicateFutureId {
                future_id: future_id.to_string(),
            });
        }

        let args: Vec<ArgumentValue> = args.into_iter().map(Into::into).collect();
        for arg in &args {
            if let ArgumentValue::Future(handle) = arg {
                self.check_owned(handle)?;
            }
        }

        let index = self.actions.len();
        self.actions.push(DeploymentAction {
            future_id: future_id.clone(),
            contract_name: contract_name.to_string(),
            args,
            value: options.value,
        });
        self.index_by_future.insert(future_id.clone(), index);

        tracing::debug!("📝 Declared {} ({})", future_id, contract_name);

        Ok(ContractHandle::new(
            self.id,
            index,
            future_id,
            contract_name.to_string(),
        ))
    }

    /// 確認 handle 來自本上下文
    pub fn check_owned(&self, handle: &ContractHandle) -> Result<()> {
        let owned = handle.context() == self.id
            && self
                .index_by_future
                .get(handle.future_id())
                .is_some_and(|index| *index == handle.index());

        if owned {
            Ok(())
        } else {
            Err(IgnitionError::ForeignHandle {
                future_id: handle.future_id().to_string(),
            })
        }
    }

    pub fn action(&self, handle: &ContractHandle) -> Result<&DeploymentAction> {
        self.check_owned(handle)?;
        Ok(&self.actions[handle.index()])
    }

    pub fn actions(&self) -> &[DeploymentAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn into_actions(self) -> Vec<DeploymentAction> {
        self.actions
    }
}

fn bare_contract_name(contract_name: &str) -> &str {
    contract_name
        .rsplit_once(':')
        .map(|(_, name)| name)
        .unwrap_or(contract_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NO_ARGS: [ArgumentValue; 0] = [];

    #[test]
    fn test_contract_records_single_action() {
        let mut ctx = DeploymentContext::new("EventOrganizerModule");
        let handle = ctx.contract("EventOrganizer", NO_ARGS).unwrap();

        assert_eq!(ctx.len(), 1);
        assert_eq!(handle.future_id().as_str(), "EventOrganizerModule#EventOrganizer");
        assert_eq!(handle.contract_name(), "EventOrganizer");
        assert_eq!(ctx.action(&handle).unwrap().args.len(), 0);
        assert_eq!(ctx.action(&handle).unwrap().value, 0);
    }

    #[test]
    fn test_duplicate_contract_requires_explicit_id() {
        let mut ctx = DeploymentContext::new("M");
        ctx.contract("Token", NO_ARGS).unwrap();

        let err = ctx.contract("Token", NO_ARGS).unwrap_err();
        assert!(matches!(err, IgnitionError::DuplicateFutureId { .. }));

        let second = ctx
            .contract_with("Token", NO_ARGS, ContractOptions::default().with_id("Token2"))
            .unwrap();
        assert_eq!(second.future_id().as_str(), "M#Token2");
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_fully_qualified_name_uses_bare_name_as_id() {
        let mut ctx = DeploymentContext::new("M");
        let handle = ctx
            .contract("contracts/Event.sol:EventOrganizer", NO_ARGS)
            .unwrap();
        assert_eq!(handle.future_id().as_str(), "M#EventOrganizer");
        assert_eq!(handle.contract_name(), "contracts/Event.sol:EventOrganizer");
    }

    #[test]
    fn test_invalid_names_are_rejected_without_recording() {
        let mut ctx = DeploymentContext::new("M");
        assert!(ctx.contract("Event Organizer", NO_ARGS).is_err());
        assert!(ctx
            .contract_with("Token", NO_ARGS, ContractOptions::default().with_id("bad-id"))
            .is_err());
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_handles_compose_within_context() {
        let mut ctx = DeploymentContext::new("M");
        let token = ctx.contract("Token", NO_ARGS).unwrap();
        let sale = ctx
            .contract("Sale", vec![ArgumentValue::from(&token), json!(100).into()])
            .unwrap();

        let action = ctx.action(&sale).unwrap();
        assert_eq!(action.dependencies(), vec![token.future_id().clone()]);
    }

    #[test]
    fn test_foreign_handle_is_rejected() {
        let mut first = DeploymentContext::new("M");
        let mut second = DeploymentContext::new("M");
        let token = first.contract("Token", NO_ARGS).unwrap();

        assert_ne!(first.id(), second.id());
        assert!(second.action(&token).is_err());

        let err = second
            .contract("Sale", vec![ArgumentValue::from(&token)])
            .unwrap_err();
        assert!(matches!(err, IgnitionError::ForeignHandle { .. }));
        assert!(second.is_empty());
    }
}
