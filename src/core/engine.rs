use crate::core::aggregate::{build_aggregate, ContributionAggregate};
use crate::domain::ports::{Catalog, OrderSource, Pipeline};
use crate::utils::error::Result;
use std::time::Instant;

/// Fetches the completed orders from `source` and folds them against its
/// current catalog configuration.
pub fn aggregate_completed_orders<S>(source: &S, minor_units: u32) -> Result<ContributionAggregate>
where
    S: Catalog + OrderSource + ?Sized,
{
    let orders = source.fetch_completed_orders()?;
    build_aggregate(&orders, source, minor_units)
}

pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("🚀 Starting contribution report");

        // Extract
        tracing::info!("📥 Loading catalog snapshot...");
        let snapshot = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded {} products and {} orders",
            snapshot.products.len(),
            snapshot.orders.len()
        );

        // Transform
        tracing::info!("🧮 Aggregating contributions...");
        let report = self.pipeline.transform(snapshot).await?;
        tracing::info!(
            "Aggregated {} completed orders into {} rows, total {} {}",
            report.orders_considered,
            report.rows.len(),
            report.total,
            report.currency
        );

        // Load
        tracing::info!("💾 Writing report...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Report saved to: {} ({:?})", output_path, started.elapsed());

        Ok(output_path)
    }
}
