use crate::core::module::Module;
use crate::domain::model::{ArgumentValue, Artifact, DeploymentAction, FutureId};
use crate::domain::ports::ArtifactResolver;
use crate::utils::error::{IgnitionError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// 計畫中的一個步驟，已對應到編譯產物
#[derive(Debug, Clone, Serialize)]
pub struct PlanStep {
    pub future_id: FutureId,
    pub contract_name: String,
    pub source_name: Option<String>,
    pub args: Vec<ArgumentValue>,
    pub value: u128,
    pub dependencies: Vec<FutureId>,
    #[serde(skip)]
    pub artifact: Artifact,
}

/// 有序的執行計畫；宣告順序即執行順序
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionPlan {
    pub module_id: String,
    pub steps: Vec<PlanStep>,
    pub results: BTreeMap<String, FutureId>,
}

impl ExecutionPlan {
    pub fn step(&self, future_id: &FutureId) -> Option<&PlanStep> {
        self.steps.iter().find(|s| &s.future_id == future_id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 給人看的計畫摘要
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "📋 Deployment plan for {}", self.module_id);
        let _ = writeln!(out, "  Steps: {}", self.steps.len());

        for (position, step) in self.steps.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} -> deploy {}",
                position + 1,
                step.future_id,
                step.contract_name
            );
            if let Some(source) = &step.source_name {
                let _ = writeln!(out, "     source: {}", source);
            }
            if !step.args.is_empty() {
                let args: Vec<String> = step.args.iter().map(render_argument).collect();
                let _ = writeln!(out, "     args: [{}]", args.join(", "));
            }
            if step.value > 0 {
                let _ = writeln!(out, "     value: {} wei", step.value);
            }
            if !step.dependencies.is_empty() {
                let deps: Vec<&str> = step.dependencies.iter().map(FutureId::as_str).collect();
                let _ = writeln!(out, "     after: {}", deps.join(", "));
            }
        }

        let _ = writeln!(out, "  Results:");
        for (name, future_id) in &self.results {
            let _ = writeln!(out, "    {} => {}", name, future_id);
        }

        out
    }
}

fn render_argument(arg: &ArgumentValue) -> String {
    match arg {
        ArgumentValue::Literal(value) => value.to_string(),
        ArgumentValue::Future(handle) => format!("<{}>", handle.future_id()),
    }
}

/// 把模組宣告轉成執行計畫；只做查表與檢查，不執行任何動作
pub struct Planner<R: ArtifactResolver> {
    resolver: R,
}

impl<R: ArtifactResolver> Planner<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn plan(&self, module: &Module) -> Result<ExecutionPlan> {
        tracing::info!("🧭 Planning module {}", module.name());

        let declared = module.declare()?;
        let results = declared.result_future_ids();

        let steps = declared
            .actions
            .into_iter()
            .map(|action| self.plan_step(action))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "✅ Plan ready for {}: {} step(s), results: {}",
            declared.module_id,
            steps.len(),
            results.keys().cloned().collect::<Vec<_>>().join(", ")
        );

        Ok(ExecutionPlan {
            module_id: declared.module_id,
            steps,
            results,
        })
    }

    fn plan_step(&self, action: DeploymentAction) -> Result<PlanStep> {
        let artifact = self.resolver.resolve(&action.contract_name)?;

        if !artifact.has_bytecode() {
            return Err(IgnitionError::ArtifactInvalid {
                contract: action.contract_name,
                reason: "artifact has no bytecode (abstract contract or interface?)".to_string(),
            });
        }

        let expected = artifact.constructor_input_count();
        if expected != action.args.len() {
            return Err(IgnitionError::ConstructorArity {
                contract: action.contract_name,
                expected,
                given: action.args.len(),
            });
        }

        if action.value > 0 && !artifact.constructor_is_payable() {
            return Err(IgnitionError::NonPayableValue {
                contract: action.contract_name,
            });
        }

        tracing::debug!("🔗 {} resolved to artifact {}", action.future_id, artifact.contract_name);

        let dependencies = action.dependencies();
        Ok(PlanStep {
            future_id: action.future_id,
            contract_name: action.contract_name,
            source_name: artifact.source_name.clone(),
            args: action.args,
            value: action.value,
            dependencies,
            artifact,
        })
    }
}
