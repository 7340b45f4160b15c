pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use core::{
    bom::BomDeriver, catalog::PartCatalog, engine::OrderEngine, pipeline::OrderPipeline,
};
pub use utils::error::{OrderError, Result};
