use crate::core::aggregate::MAX_MINOR_UNITS;
use crate::core::ConfigProvider;
use crate::domain::model::{FoundationId, ProductId};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_output_formats, validate_path, validate_range, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "foundation-contributions")]
#[command(about = "Aggregate completed-order contributions per foundation and product")]
pub struct CliConfig {
    /// Store export (products, categories, foundations, orders) as JSON
    #[arg(long, default_value = "snapshot.json")]
    pub snapshot: String,

    #[arg(long, default_value = "./reports")]
    pub output_path: String,

    #[arg(long = "format", value_delimiter = ',', default_value = "csv,json")]
    pub output_formats: Vec<String>,

    #[arg(long, default_value = "EUR")]
    pub currency: String,

    #[arg(long, default_value = "2")]
    pub minor_units: u32,

    #[arg(long, help = "Leave products without a foundation out of the report")]
    pub exclude_unassigned: bool,

    #[arg(long, help = "Load settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, help = "Print a single view as JSON instead of writing reports")]
    pub view: Option<String>,

    #[arg(long, help = "Product id for product views")]
    pub product: Option<u64>,

    #[arg(long, allow_hyphen_values = true, help = "Foundation id for foundation views")]
    pub foundation: Option<i64>,

    #[arg(long, help = "Attribute name for the foundation_meta view")]
    pub key: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    pub fn product_id(&self) -> Option<ProductId> {
        self.product.map(ProductId)
    }

    pub fn foundation_id(&self) -> Option<FoundationId> {
        self.foundation.map(FoundationId)
    }
}

impl ConfigProvider for CliConfig {
    fn snapshot_path(&self) -> &str {
        &self.snapshot
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn currency(&self) -> &str {
        &self.currency
    }

    fn minor_units(&self) -> u32 {
        self.minor_units
    }

    fn include_unassigned(&self) -> bool {
        !self.exclude_unassigned
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("snapshot", &self.snapshot)?;
        validate_path("output_path", &self.output_path)?;
        validate_output_formats("format", &self.output_formats)?;
        validate_non_empty_string("currency", &self.currency)?;
        validate_range("minor_units", self.minor_units, 0, MAX_MINOR_UNITS)?;
        Ok(())
    }
}
