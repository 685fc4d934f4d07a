use crate::domain::model::{DeployedContract, ResolvedDeployment};
use crate::domain::ports::DeploymentExecutor;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// 不連線的執行器：依呼叫順序產生固定的假地址，並記錄每次呼叫
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    calls: Mutex<Vec<ResolvedDeployment>>,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ResolvedDeployment> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl DeploymentExecutor for DryRunExecutor {
    async fn deploy_contract(&self, deployment: &ResolvedDeployment) -> Result<DeployedContract> {
        let nonce = {
            let mut calls = self
                .calls
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            calls.push(deployment.clone());
            calls.len() as u64
        };

        tracing::debug!(
            "🔍 Dry run: {} ({} arg(s), value {})",
            deployment.future_id,
            deployment.args.len(),
            deployment.value
        );

        Ok(DeployedContract {
            future_id: deployment.future_id.clone(),
            contract_name: deployment.contract_name.clone(),
            address: format!("0x{:040x}", nonce),
            transaction_hash: Some(format!("0x{:064x}", nonce)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FutureId;

    fn deployment(name: &str) -> ResolvedDeployment {
        ResolvedDeployment {
            future_id: FutureId::new("M", name),
            contract_name: name.to_string(),
            bytecode: "0x6080".to_string(),
            args: vec![],
            value: 0,
            chain_id: 31337,
        }
    }

    #[test]
    fn test_dry_run_addresses_are_sequential() {
        let executor = DryRunExecutor::new();

        let first = tokio_test::block_on(executor.deploy_contract(&deployment("A"))).unwrap();
        let second = tokio_test::block_on(executor.deploy_contract(&deployment("B"))).unwrap();

        assert_eq!(first.address, "0x0000000000000000000000000000000000000001");
        assert_eq!(second.address, "0x0000000000000000000000000000000000000002");
        assert_eq!(first.address.len(), 42);
        assert_eq!(second.transaction_hash.as_ref().map(String::len), Some(66));
        assert_eq!(executor.call_count(), 2);
        assert_eq!(executor.calls()[1].contract_name, "B");
    }
}
