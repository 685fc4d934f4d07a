use crate::domain::model::{Artifact, DeployedContract, ResolvedDeployment};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 依合約名稱查找編譯產物
pub trait ArtifactResolver: Send + Sync {
    fn resolve(&self, contract_name: &str) -> Result<Artifact>;
}

/// 實際送出部署的一方（鏈上執行屬於外部協作者）
#[async_trait]
pub trait DeploymentExecutor: Send + Sync {
    async fn deploy_contract(&self, deployment: &ResolvedDeployment) -> Result<DeployedContract>;
}
