use crate::domain::model::{
    CatalogSnapshot, CategoryId, ContributionReport, Foundation, FoundationId, Order, Product,
    ProductId,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Read-only view of the store catalog. Lookups return `None` for unknown ids.
pub trait Catalog {
    fn get_product(&self, product_id: ProductId) -> Option<Product>;
    fn get_category_default_cost(&self, category_id: CategoryId) -> Option<Decimal>;
    fn get_product_category(&self, product_id: ProductId) -> Option<CategoryId>;

    fn get_foundation(&self, _foundation_id: FoundationId) -> Option<Foundation> {
        None
    }
}

pub trait OrderSource {
    /// Only orders in the completed state are returned.
    fn fetch_completed_orders(&self) -> Result<Vec<Order>>;
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn snapshot_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn currency(&self) -> &str;
    fn minor_units(&self) -> u32;
    fn include_unassigned(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<CatalogSnapshot>;
    async fn transform(&self, snapshot: CatalogSnapshot) -> Result<ContributionReport>;
    async fn load(&self, report: ContributionReport) -> Result<String>;
}
