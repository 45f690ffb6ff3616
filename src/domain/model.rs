use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

/// Opaque beneficiary key. Products without an assigned foundation aggregate
/// under [`FoundationId::UNASSIGNED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoundationId(pub i64);

impl FoundationId {
    pub const UNASSIGNED: FoundationId = FoundationId(-1);

    pub fn is_unassigned(&self) -> bool {
        *self == Self::UNASSIGNED
    }
}

macro_rules! display_id {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        })*
    };
}

display_id!(ProductId, CategoryId, OrderId, FoundationId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    pub price: Decimal,
    /// 產品層級的成本設定，優先於分類預設值
    #[serde(default)]
    pub cost_basis: Option<Decimal>,
    #[serde(default)]
    pub contribute_all: bool,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub foundation: Option<FoundationId>,
}

impl Product {
    pub fn foundation_id(&self) -> FoundationId {
        self.foundation.unwrap_or(FoundationId::UNASSIGNED)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default_cost: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Foundation {
    pub id: FoundationId,
    pub name: String,
    /// Long-form description shown on the foundation's page.
    #[serde(default)]
    pub summary: Option<String>,
    /// Free-form attributes (website, registration number, ...).
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    /// Price actually paid per unit at checkout.
    pub unit_price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl Order {
    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

/// Everything the report pipeline needs, as exported by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub foundations: Vec<Foundation>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub foundation_id: FoundationId,
    pub foundation_name: String,
    pub product_id: ProductId,
    pub product_name: String,
    pub contribution: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundationSummary {
    pub foundation_id: FoundationId,
    pub foundation_name: String,
    pub products: usize,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionReport {
    pub generated_at: DateTime<Utc>,
    pub currency: String,
    pub orders_considered: usize,
    pub rows: Vec<ReportRow>,
    pub foundations: Vec<FoundationSummary>,
    pub unassigned_total: Decimal,
    pub total: Decimal,
}
