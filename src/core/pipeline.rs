use crate::config::parts::load_catalog;
use crate::config::project::ProjectConfig;
use crate::core::bom::{BomDeriver, DerivedTotals};
use crate::core::catalog::{OrderSummary, PartCatalog};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;
use crate::utils::format::format_label;
use crate::utils::validation::Validate;
use chrono::{DateTime, Local};

const LABEL_WIDTH: usize = 25;

/// Everything read from disk before derivation starts.
#[derive(Debug, Clone)]
pub struct OrderInput {
    pub project: ProjectConfig,
    pub catalog: PartCatalog,
}

/// 推導完成的訂單，包含含價格與不含價格兩份報告。
#[derive(Debug, Clone)]
pub struct OrderOutput {
    pub generated_at: DateTime<Local>,
    pub customer_name: String,
    pub customer_block: String,
    pub plain_report: String,
    pub priced_report: String,
    pub summary: OrderSummary,
    pub totals: DerivedTotals,
}

impl OrderOutput {
    /// `2026-10-19_14-03-22_Jane_Smith`
    pub fn file_stem(&self) -> String {
        let customer: String = self
            .customer_name
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '/' || c == '\\' { '_' } else { c })
            .collect();
        format!("{}_{}", self.generated_at.format("%Y-%m-%d_%H-%M-%S"), customer)
    }

    fn document(&self, report: &str) -> String {
        format!(
            "Solar Parts Order Generated on {}\n{}{}\n",
            self.generated_at.format("%Y/%m/%d %H:%M:%S"),
            self.customer_block,
            report
        )
    }
}

pub struct OrderPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> OrderPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

pub fn format_customer_block(project: &ProjectConfig) -> String {
    let info = &project.project;
    [
        format_label("Project Name:", &info.customer_name, LABEL_WIDTH),
        format_label("Lead Source:", &info.lead_source, LABEL_WIDTH),
        format_label("Estimated Delivery:", &info.delivery_date, LABEL_WIDTH),
        format_label("Address:", &info.address, LABEL_WIDTH),
    ]
    .iter()
    .map(|line| format!("{}\n", line))
    .collect()
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for OrderPipeline<S, C> {
    type Input = OrderInput;
    type Output = OrderOutput;

    async fn extract(&self) -> Result<OrderInput> {
        tracing::debug!("Reading project file: {}", self.config.project_path());
        let project_text = tokio::fs::read_to_string(self.config.project_path()).await?;
        let project = ProjectConfig::from_toml_str(&project_text)?;
        project.validate()?;

        let cost_mode = self
            .config
            .cost_mode()
            .unwrap_or_else(|| project.cost_mode());

        tracing::debug!("Reading parts list: {}", self.config.parts_path());
        let parts_data = tokio::fs::read(self.config.parts_path()).await?;
        let catalog = load_catalog(&parts_data, cost_mode)?;
        tracing::info!(
            "📦 Loaded {} parts in {} categories ({:?} costing)",
            catalog.len(),
            catalog.category_costs().len(),
            cost_mode
        );

        Ok(OrderInput { project, catalog })
    }

    async fn transform(&self, input: OrderInput) -> Result<OrderOutput> {
        let customer_block = format_customer_block(&input.project);
        let customer_name = input.project.project.customer_name.clone();

        let context = BomDeriver::new(input.project, input.catalog)?.derive();
        let wattage = context.totals.system_wattage;

        Ok(OrderOutput {
            generated_at: Local::now(),
            customer_name,
            customer_block,
            plain_report: context.catalog.report(false, wattage),
            priced_report: context.catalog.report(true, wattage),
            summary: context.catalog.summary(wattage),
            totals: context.totals,
        })
    }

    async fn load(&self, output: OrderOutput) -> Result<String> {
        let console_report = if self.config.show_cost() {
            &output.priced_report
        } else {
            &output.plain_report
        };
        println!("\n\n{}{}", output.customer_block, console_report);

        if self.config.dry_run() {
            tracing::info!("🔍 Dry run: no files written");
            return Ok(String::from("(dry run)"));
        }

        let stem = output.file_stem();
        let plain_name = format!("{}.txt", stem);
        let priced_name = format!("{}_Cost.txt", stem);
        let summary_name = format!("{}_order.json", stem);

        self.storage
            .write_file(&plain_name, output.document(&output.plain_report).as_bytes())
            .await?;
        self.storage
            .write_file(&priced_name, output.document(&output.priced_report).as_bytes())
            .await?;
        let json = serde_json::to_string_pretty(&output.summary)?;
        self.storage.write_file(&summary_name, json.as_bytes()).await?;

        tracing::debug!("Wrote {}, {} and {}", plain_name, priced_name, summary_name);
        Ok(format!("{}/{}", self.config.output_path(), plain_name))
    }
}
