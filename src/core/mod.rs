pub mod bom;
pub mod catalog;
pub mod engine;
pub mod grid;
pub mod hardware;
pub mod pipeline;

pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
