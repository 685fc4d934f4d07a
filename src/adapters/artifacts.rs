use crate::domain::model::Artifact;
use crate::domain::ports::ArtifactResolver;
use crate::utils::error::{IgnitionError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// 從 Hardhat 的 artifacts 目錄讀取編譯產物
/// (`artifacts/contracts/<File>.sol/<Name>.json`)
#[derive(Debug, Clone)]
pub struct FsArtifactResolver {
    base_path: PathBuf,
}

impl FsArtifactResolver {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn find_candidates(&self, bare_name: &str) -> Result<Vec<PathBuf>> {
        let file_name = format!("{}.json", bare_name);
        let mut found = Vec::new();
        let mut pending = vec![self.base_path.clone()];

        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    // build-info 只有編譯器輸入輸出
                    if path.file_name().and_then(|n| n.to_str()) != Some("build-info") {
                        pending.push(path);
                    }
                } else if path.file_name().and_then(|n| n.to_str()) == Some(file_name.as_str()) {
                    found.push(path);
                }
            }
        }

        found.sort();
        Ok(found)
    }

    fn read_artifact(&self, contract_name: &str, path: &Path) -> Result<Artifact> {
        tracing::debug!("Reading artifact {}", path.display());
        let content = fs::read(path)?;
        serde_json::from_slice(&content).map_err(|e| IgnitionError::ArtifactInvalid {
            contract: contract_name.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })
    }
}

impl ArtifactResolver for FsArtifactResolver {
    fn resolve(&self, contract_name: &str) -> Result<Artifact> {
        if !self.base_path.is_dir() {
            return Err(IgnitionError::ArtifactNotFound {
                contract: contract_name.to_string(),
            });
        }

        let artifact = match contract_name.rsplit_once(':') {
            // 完整名稱直接對應到檔案路徑
            Some((source, bare)) => {
                let path = self.base_path.join(source).join(format!("{}.json", bare));
                if !path.is_file() {
                    return Err(IgnitionError::ArtifactNotFound {
                        contract: contract_name.to_string(),
                    });
                }
                self.read_artifact(contract_name, &path)?
            }
            None => {
                let candidates = self.find_candidates(contract_name)?;
                match candidates.as_slice() {
                    [] => {
                        return Err(IgnitionError::ArtifactNotFound {
                            contract: contract_name.to_string(),
                        })
                    }
                    [path] => self.read_artifact(contract_name, path)?,
                    many => {
                        let paths: Vec<String> =
                            many.iter().map(|p| p.display().to_string()).collect();
                        return Err(IgnitionError::ArtifactInvalid {
                            contract: contract_name.to_string(),
                            reason: format!(
                                "multiple artifacts match, use a fully qualified name: {}",
                                paths.join(", ")
                            ),
                        });
                    }
                }
            }
        };

        let bare = contract_name
            .rsplit_once(':')
            .map(|(_, name)| name)
            .unwrap_or(contract_name);
        if artifact.contract_name != bare {
            return Err(IgnitionError::ArtifactInvalid {
                contract: contract_name.to_string(),
                reason: format!("artifact declares contractName '{}'", artifact.contract_name),
            });
        }

        Ok(artifact)
    }
}

/// 以記憶體保存的產物，嵌入使用或測試用
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifacts {
    artifacts: HashMap<String, Artifact>,
}

impl InMemoryArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, artifact: Artifact) {
        self.artifacts
            .insert(artifact.contract_name.clone(), artifact);
    }

    pub fn with(mut self, artifact: Artifact) -> Self {
        self.insert(artifact);
        self
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactResolver for InMemoryArtifacts {
    fn resolve(&self, contract_name: &str) -> Result<Artifact> {
        let bare = contract_name
            .rsplit_once(':')
            .map(|(_, name)| name)
            .unwrap_or(contract_name);
        self.artifacts
            .get(bare)
            .cloned()
            .ok_or_else(|| IgnitionError::ArtifactNotFound {
                contract: contract_name.to_string(),
            })
    }
}

impl<R: ArtifactResolver + ?Sized> ArtifactResolver for &R {
    fn resolve(&self, contract_name: &str) -> Result<Artifact> {
        (**self).resolve(contract_name)
    }
}
