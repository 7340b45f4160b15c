use crate::domain::model::CostMode;
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

pub trait ConfigProvider: Send + Sync {
    fn parts_path(&self) -> &str;
    fn project_path(&self) -> &str;
    fn output_path(&self) -> &str;
    /// Overrides the project file's cost mode when set.
    fn cost_mode(&self) -> Option<CostMode>;
    /// Whether the console copy of the order shows prices.
    fn show_cost(&self) -> bool;
    fn dry_run(&self) -> bool;
}

/// Extract inputs, derive the order, persist the reports.
#[async_trait]
pub trait Pipeline: Send + Sync {
    type Input: Send;
    type Output: Send;

    async fn extract(&self) -> Result<Self::Input>;
    async fn transform(&self, input: Self::Input) -> Result<Self::Output>;
    async fn load(&self, output: Self::Output) -> Result<String>;
}
