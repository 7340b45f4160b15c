use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct OrderEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> OrderEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// 依序執行讀取、推導、輸出三個階段，回傳訂單檔案路徑。
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting order generation");

        tracing::debug!("Reading parts list and project");
        let input = self.pipeline.extract().await?;

        tracing::debug!("Deriving bill of materials");
        let output = self.pipeline.transform(input).await?;

        tracing::debug!("Writing order reports");
        let output_path = self.pipeline.load(output).await?;

        tracing::info!(
            "⏱️ Order generated in {:.2?}",
            started.elapsed()
        );
        Ok(output_path)
    }
}
