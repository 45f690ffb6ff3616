pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{InMemoryCatalog, LocalStorage};
pub use app::pipelines::ContributionPipeline;
pub use app::views::{ViewContext, ViewOutput, ViewRegistry, ViewRequest};
pub use crate::core::aggregate::{build_aggregate, ContributionAggregate};
pub use crate::core::cost::resolve_cost_basis;
pub use crate::core::engine::{aggregate_completed_orders, ReportEngine};
pub use utils::error::{ContributionError, Result};
