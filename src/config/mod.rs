#[cfg(feature = "cli")]
pub mod cli;
pub mod parts;
pub mod project;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::CostMode;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "solar-order")]
#[command(about = "Derive, price and record the parts order for a solar project")]
pub struct CliConfig {
    /// Parts list exported from the ordering template
    #[arg(long, default_value = "Solar Ordering Template/Parts List.csv")]
    pub parts: String,

    /// Project file (TOML)
    #[arg(long, default_value = "project.toml")]
    pub project: String,

    #[arg(long, default_value = "Order_History")]
    pub output_path: String,

    #[arg(long, help = "Leave prices out of the console output")]
    pub no_cost: bool,

    #[arg(long, help = "legacy (matches historical reports) or incremental")]
    pub cost_mode: Option<CostMode>,

    #[arg(long, help = "Derive and print the order without writing files")]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn parts_path(&self) -> &str {
        &self.parts
    }

    fn project_path(&self) -> &str {
        &self.project
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn cost_mode(&self) -> Option<CostMode> {
        self.cost_mode
    }

    fn show_cost(&self) -> bool {
        !self.no_cost
    }

    fn dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        validation::validate_path("parts", &self.parts)?;
        validation::validate_file_extension("parts", &self.parts, &["csv"])?;
        validation::validate_path("project", &self.project)?;
        validation::validate_file_extension("project", &self.project, &["toml"])?;
        validation::validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}
