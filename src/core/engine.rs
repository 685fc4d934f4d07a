use crate::core::plan::{ExecutionPlan, PlanStep};
use crate::domain::model::{ArgumentValue, DeployedContract, FutureId, ResolvedDeployment};
use crate::domain::ports::DeploymentExecutor;
use crate::utils::error::{IgnitionError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub const DEFAULT_CHAIN_ID: u64 = 31337;

/// 單一步驟的執行結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub future_id: FutureId,
    pub contract_name: String,
    pub address: String,
    pub transaction_hash: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub module_id: String,
    pub chain_id: u64,
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepReport>,
    /// 邏輯名稱 => 合約地址
    pub results: BTreeMap<String, String>,
}

impl DeploymentReport {
    /// future id => 地址，格式同 deployed_addresses.json
    pub fn deployed_addresses(&self) -> BTreeMap<String, String> {
        self.steps
            .iter()
            .map(|s| (s.future_id.to_string(), s.address.clone()))
            .collect()
    }

    pub fn total_duration(&self) -> Duration {
        self.steps
            .iter()
            .map(|s| Duration::from_millis(s.duration_ms))
            .sum()
    }
}

/// 依序執行計畫，並把 handle 解析成實際地址
pub struct DeploymentEngine<E: DeploymentExecutor> {
    executor: E,
    chain_id: u64,
}

impl<E: DeploymentExecutor> DeploymentEngine<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            chain_id: DEFAULT_CHAIN_ID,
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub async fn run(&self, plan: &ExecutionPlan) -> Result<DeploymentReport> {
        let started_at = Utc::now();
        tracing::info!(
            "🚀 Executing plan for {} on chain {} ({} step(s))",
            plan.module_id,
            self.chain_id,
            plan.len()
        );

        let mut addresses: BTreeMap<FutureId, String> = BTreeMap::new();
        let mut steps = Vec::with_capacity(plan.len());

        for step in &plan.steps {
            let start_time = Instant::now();
            let deployment = self.resolve_step(step, &addresses)?;

            let deployed = match self.executor.deploy_contract(&deployment).await {
                Ok(deployed) => deployed,
                Err(e) => {
                    tracing::error!("❌ Deployment of {} failed: {}", step.future_id, e);
                    return Err(IgnitionError::ExecutionFailed {
                        future_id: step.future_id.to_string(),
                        message: e.to_string(),
                    });
                }
            };

            let duration = start_time.elapsed();
            tracing::info!(
                "✅ {} deployed at {} ({:?})",
                deployed.future_id,
                deployed.address,
                duration
            );

            addresses.insert(step.future_id.clone(), deployed.address.clone());
            steps.push(step_report(deployed, duration));
        }

        let mut results = BTreeMap::new();
        for (name, future_id) in &plan.results {
            let address = addresses
                .get(future_id)
                .ok_or_else(|| IgnitionError::ExecutionFailed {
                    future_id: future_id.to_string(),
                    message: format!("result '{}' was never executed", name),
                })?;
            results.insert(name.clone(), address.clone());
        }

        Ok(DeploymentReport {
            module_id: plan.module_id.clone(),
            chain_id: self.chain_id,
            started_at,
            steps,
            results,
        })
    }

    fn resolve_step(
        &self,
        step: &PlanStep,
        addresses: &BTreeMap<FutureId, String>,
    ) -> Result<ResolvedDeployment> {
        let args = step
            .args
            .iter()
            .map(|arg| match arg {
                ArgumentValue::Literal(value) => Ok(value.clone()),
                ArgumentValue::Future(handle) => addresses
                    .get(handle.future_id())
                    .map(|address| serde_json::Value::String(address.clone()))
                    .ok_or_else(|| IgnitionError::ExecutionFailed {
                        future_id: step.future_id.to_string(),
                        message: format!("dependency {} has not been deployed", handle.future_id()),
                    }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ResolvedDeployment {
            future_id: step.future_id.clone(),
            contract_name: step.contract_name.clone(),
            bytecode: step.artifact.bytecode.clone(),
            args,
            value: step.value,
            chain_id: self.chain_id,
        })
    }
}

fn step_report(deployed: DeployedContract, duration: Duration) -> StepReport {
    StepReport {
        future_id: deployed.future_id,
        contract_name: deployed.contract_name,
        address: deployed.address,
        transaction_hash: deployed.transaction_hash,
        duration_ms: duration.as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::InMemoryArtifacts;
    use crate::adapters::executor::DryRunExecutor;
    use crate::core::module::Module;
    use crate::core::plan::Planner;
    use crate::domain::model::{Artifact, ModuleResult};
    use serde_json::json;

    const NO_ARGS: [ArgumentValue; 0] = [];

    fn plan_token_and_sale() -> ExecutionPlan {
        let mut store = InMemoryArtifacts::new();
        store.insert(Artifact {
            contract_name: "Token".to_string(),
            source_name: None,
            abi: vec![],
            bytecode: "0x6080".to_string(),
        });
        store.insert(Artifact {
            contract_name: "Sale".to_string(),
            source_name: None,
            abi: vec![json!({"type": "constructor",
                "inputs": [{"type": "address"}, {"type": "uint256"}]})],
            bytecode: "0x6081".to_string(),
        });

        let module = Module::new("SaleModule", |m| {
            let token = m.contract("Token", NO_ARGS)?;
            let sale = m.contract("Sale", vec![ArgumentValue::from(&token), json!(500).into()])?;
            Ok(ModuleResult::new().with("sale", sale))
        })
        .unwrap();

        Planner::new(store).plan(&module).unwrap()
    }

    struct FailingExecutor;

    #[async_trait::async_trait]
    impl DeploymentExecutor for FailingExecutor {
        async fn deploy_contract(&self, _deployment: &ResolvedDeployment) -> Result<DeployedContract> {
            Err(IgnitionError::ConfigError {
                message: "node unreachable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_run_substitutes_handle_arguments() {
        let plan = plan_token_and_sale();
        let engine = DeploymentEngine::new(DryRunExecutor::new()).with_chain_id(1337);

        let report = engine.run(&plan).await.unwrap();

        assert_eq!(report.chain_id, 1337);
        assert_eq!(report.steps.len(), 2);

        let calls = engine.executor().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].args[0], json!(report.steps[0].address));
        assert_eq!(calls[1].args[1], json!(500));

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results["sale"], report.steps[1].address);
        assert_eq!(
            report.deployed_addresses()["SaleModule#Token"],
            report.steps[0].address
        );
    }

    #[tokio::test]
    async fn test_run_wraps_executor_failures() {
        let plan = plan_token_and_sale();
        let engine = DeploymentEngine::new(FailingExecutor);

        let err = engine.run(&plan).await.unwrap_err();
        match err {
            IgnitionError::ExecutionFailed { future_id, message } => {
                assert_eq!(future_id, "SaleModule#Token");
                assert!(message.contains("node unreachable"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
