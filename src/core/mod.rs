pub mod aggregate;
pub mod cost;
pub mod engine;
pub mod report;

pub use crate::domain::model::{CatalogSnapshot, ContributionReport};
pub use crate::domain::ports::{Catalog, ConfigProvider, OrderSource, Pipeline, Storage};
pub use crate::utils::error::Result;
pub use aggregate::{build_aggregate, ContributionAggregate};
pub use cost::resolve_cost_basis;
