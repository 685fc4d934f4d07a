use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// 部署上下文的識別碼，每個上下文在程序內唯一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub(crate) u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// `<ModuleName>#<id>` 形式的 future 識別字
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FutureId(String);

impl FutureId {
    pub fn new(module_id: &str, local_id: &str) -> Self {
        Self(format!("{}#{}", module_id, local_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn module_id(&self) -> &str {
        self.0.split_once('#').map(|(module, _)| module).unwrap_or(&self.0)
    }

    pub fn local_id(&self) -> &str {
        self.0.split_once('#').map(|(_, local)| local).unwrap_or(&self.0)
    }
}

impl fmt::Display for FutureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 指向「部署完成後的合約」的不透明參照。
///
/// Handle 只是上下文計畫中的索引，離開產生它的上下文後不可使用。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractHandle {
    context: ContextId,
    index: usize,
    future_id: FutureId,
    contract_name: String,
}

impl ContractHandle {
    pub(crate) fn new(
        context: ContextId,
        index: usize,
        future_id: FutureId,
        contract_name: String,
    ) -> Self {
        Self {
            context,
            index,
            future_id,
            contract_name,
        }
    }

    pub fn future_id(&self) -> &FutureId {
        &self.future_id
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

impl Serialize for ContractHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("future", &self.future_id)?;
        map.end()
    }
}

/// 建構子參數：JSON 字面值或另一個合約的 handle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Literal(serde_json::Value),
    Future(ContractHandle),
}

impl From<serde_json::Value> for ArgumentValue {
    fn from(value: serde_json::Value) -> Self {
        ArgumentValue::Literal(value)
    }
}

impl From<&ContractHandle> for ArgumentValue {
    fn from(handle: &ContractHandle) -> Self {
        ArgumentValue::Future(handle.clone())
    }
}

impl From<ContractHandle> for ArgumentValue {
    fn from(handle: ContractHandle) -> Self {
        ArgumentValue::Future(handle)
    }
}

/// `contract_with` 的選項
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractOptions {
    pub id: Option<String>,
    pub value: u128,
}

impl ContractOptions {
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }
}

/// 已宣告、尚未執行的部署動作
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentAction {
    pub future_id: FutureId,
    pub contract_name: String,
    pub args: Vec<ArgumentValue>,
    pub value: u128,
}

impl DeploymentAction {
    /// 參數中引用的其他 future
    pub fn dependencies(&self) -> Vec<FutureId> {
        let mut deps: Vec<FutureId> = self
            .args
            .iter()
            .filter_map(|arg| match arg {
                ArgumentValue::Future(handle) => Some(handle.future_id().clone()),
                ArgumentValue::Literal(_) => None,
            })
            .collect();
        deps.sort();
        deps.dedup();
        deps
    }
}

/// 模組宣告函式的回傳值：邏輯名稱到 handle 的對應
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleResult {
    entries: BTreeMap<String, ContractHandle>,
}

impl ModuleResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, handle: ContractHandle) -> Self {
        self.insert(name, handle);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, handle: ContractHandle) -> Option<ContractHandle> {
        self.entries.insert(name.into(), handle)
    }

    pub fn get(&self, name: &str) -> Option<&ContractHandle> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ContractHandle> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ModuleResult {
    type Item = (&'a String, &'a ContractHandle);
    type IntoIter = btree_map::Iter<'a, String, ContractHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Hardhat 格式的編譯產物
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub abi: Vec<serde_json::Value>,
    #[serde(default)]
    pub bytecode: String,
}

impl Artifact {
    pub fn constructor(&self) -> Option<&serde_json::Value> {
        self.abi
            .iter()
            .find(|entry| entry.get("type").and_then(|t| t.as_str()) == Some("constructor"))
    }

    /// 沒有 constructor 項目時視為零參數
    pub fn constructor_input_count(&self) -> usize {
        self.constructor()
            .and_then(|c| c.get("inputs"))
            .and_then(|inputs| inputs.as_array())
            .map(|inputs| inputs.len())
            .unwrap_or(0)
    }

    pub fn constructor_is_payable(&self) -> bool {
        match self.constructor() {
            Some(ctor) => {
                ctor.get("stateMutability").and_then(|m| m.as_str()) == Some("payable")
                    || ctor.get("payable").and_then(|p| p.as_bool()).unwrap_or(false)
            }
            None => false,
        }
    }

    pub fn has_bytecode(&self) -> bool {
        let code = self.bytecode.trim();
        !(code.is_empty() || code == "0x")
    }
}

/// 交給執行器的動作，handle 參數已換成實際地址
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDeployment {
    pub future_id: FutureId,
    pub contract_name: String,
    pub bytecode: String,
    pub args: Vec<serde_json::Value>,
    pub value: u128,
    pub chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub future_id: FutureId,
    pub contract_name: String,
    pub address: String,
    pub transaction_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artifact_with_abi(abi: serde_json::Value) -> Artifact {
        serde_json::from_value(json!({
            "contractName": "EventOrganizer",
            "sourceName": "contracts/EventOrganizer.sol",
            "abi": abi,
            "bytecode": "0x6080"
        }))
        .unwrap()
    }

    #[test]
    fn test_future_id_parts() {
        let id = FutureId::new("EventOrganizerModule", "EventOrganizer");
        assert_eq!(id.as_str(), "EventOrganizerModule#EventOrganizer");
        assert_eq!(id.module_id(), "EventOrganizerModule");
        assert_eq!(id.local_id(), "EventOrganizer");
    }

    #[test]
    fn test_artifact_without_constructor_has_no_inputs() {
        let artifact = artifact_with_abi(json!([
            {"type": "function", "name": "createEvent", "inputs": [{"type": "string"}]}
        ]));
        assert_eq!(artifact.constructor_input_count(), 0);
        assert!(!artifact.constructor_is_payable());
        assert!(artifact.has_bytecode());
    }

    #[test]
    fn test_artifact_constructor_inputs_and_payable() {
        let artifact = artifact_with_abi(json!([
            {"type": "constructor", "stateMutability": "payable",
             "inputs": [{"type": "address"}, {"type": "uint256"}]}
        ]));
        assert_eq!(artifact.constructor_input_count(), 2);
        assert!(artifact.constructor_is_payable());
    }

    #[test]
    fn test_artifact_empty_bytecode() {
        let mut artifact = artifact_with_abi(json!([]));
        artifact.bytecode = "0x".to_string();
        assert!(!artifact.has_bytecode());
    }

    #[test]
    fn test_handle_serializes_as_future_reference() {
        let handle = ContractHandle::new(
            ContextId(7),
            0,
            FutureId::new("M", "Token"),
            "Token".to_string(),
        );
        let arg = ArgumentValue::from(&handle);
        assert_eq!(serde_json::to_value(&arg).unwrap(), json!({"future": "M#Token"}));

        let literal = ArgumentValue::from(json!(42));
        assert_eq!(serde_json::to_value(&literal).unwrap(), json!(42));
    }
}
