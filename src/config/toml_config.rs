use crate::core::context::DeploymentContext;
use crate::core::engine::DEFAULT_CHAIN_ID;
use crate::core::module::Module;
use crate::domain::model::{ContractOptions, ModuleResult};
use crate::utils::error::{IgnitionError, Result};
use crate::utils::validation::{
    validate_contract_name, validate_identifier, validate_non_empty_string, validate_path,
    validate_positive_number, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_ARTIFACTS_DIR: &str = "./artifacts";

/// `ignition.toml` 部署設定檔
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub deployment: DeploymentSection,
    #[serde(default)]
    pub modules: Vec<ModuleDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSection {
    pub name: String,
    pub artifacts_dir: Option<String>,
    pub chain_id: Option<u64>,
    pub output_path: Option<String>,
}

/// 以資料描述的部署模組
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub name: String,
    #[serde(default)]
    pub contracts: Vec<ContractDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractDefinition {
    /// 結果對應中的邏輯名稱
    pub result: String,
    pub contract: String,
    pub id: Option<String>,
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    pub value: Option<u64>,
}

impl DeploymentConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IgnitionError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| IgnitionError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OWNER_ADDRESS})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| IgnitionError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn artifacts_dir(&self) -> &str {
        self.deployment
            .artifacts_dir
            .as_deref()
            .unwrap_or(DEFAULT_ARTIFACTS_DIR)
    }

    pub fn chain_id(&self) -> u64 {
        self.deployment.chain_id.unwrap_or(DEFAULT_CHAIN_ID)
    }

    pub fn output_path(&self) -> Option<&str> {
        self.deployment.output_path.as_deref()
    }

    /// 把設定檔中的模組轉成可註冊的 `Module`
    pub fn modules(&self) -> Result<Vec<Module>> {
        self.modules.iter().map(ModuleDefinition::to_module).collect()
    }

    fn validate_module(&self, module: &ModuleDefinition) -> Result<()> {
        validate_identifier("module id", &module.name)?;

        let mut results = HashSet::new();
        let mut ids = HashSet::new();
        for contract in &module.contracts {
            let field = format!("modules.{}.contracts", module.name);
            validate_non_empty_string(&format!("{}.result", field), &contract.result)?;
            validate_contract_name(&contract.contract)?;
            if let Some(id) = &contract.id {
                validate_identifier("contract id", id)?;
            }

            if !results.insert(contract.result.as_str()) {
                return Err(IgnitionError::ConfigValidationError {
                    field,
                    message: format!("Duplicate result name '{}'", contract.result),
                });
            }

            let local_id = contract.id.clone().unwrap_or_else(|| {
                contract
                    .contract
                    .rsplit_once(':')
                    .map(|(_, name)| name.to_string())
                    .unwrap_or_else(|| contract.contract.clone())
            });
            if !ids.insert(local_id.clone()) {
                return Err(IgnitionError::ConfigValidationError {
                    field,
                    message: format!(
                        "Contract id '{}' is used twice; set a distinct 'id'",
                        local_id
                    ),
                });
            }
        }

        Ok(())
    }
}

impl ModuleDefinition {
    pub fn to_module(&self) -> Result<Module> {
        let contracts = Arc::new(self.contracts.clone());

        Module::new(self.name.clone(), move |m: &mut DeploymentContext| {
            let mut result = ModuleResult::new();
            for contract in contracts.iter() {
                let mut options = ContractOptions::default()
                    .with_value(u128::from(contract.value.unwrap_or(0)));
                if let Some(id) = &contract.id {
                    options = options.with_id(id.clone());
                }
                let handle = m.contract_with(&contract.contract, contract.args.clone(), options)?;
                result.insert(contract.result.clone(), handle);
            }
            Ok(result)
        })
    }
}

impl Validate for DeploymentConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("deployment.name", &self.deployment.name)?;
        validate_path("deployment.artifacts_dir", self.artifacts_dir())?;
        validate_positive_number("deployment.chain_id", self.chain_id(), 1)?;
        if let Some(output) = self.output_path() {
            validate_path("deployment.output_path", output)?;
        }

        let mut names = HashSet::new();
        for module in &self.modules {
            if !names.insert(module.name.as_str()) {
                return Err(IgnitionError::DuplicateModule {
                    name: module.name.clone(),
                });
            }
            self.validate_module(module)?;
        }

        Ok(())
    }
}
