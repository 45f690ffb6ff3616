use crate::domain::model::{
    CatalogSnapshot, Category, CategoryId, Foundation, FoundationId, Order, Product, ProductId,
};
use crate::domain::ports::{Catalog, OrderSource};
use crate::utils::error::{ContributionError, Result};
use crate::utils::validation::{validate_unique_ids, Validate};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Catalog and order source backed by an exported store snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: HashMap<ProductId, Product>,
    categories: HashMap<CategoryId, Category>,
    foundations: HashMap<FoundationId, Foundation>,
    orders: Vec<Order>,
}

impl InMemoryCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        let CatalogSnapshot {
            products,
            categories,
            foundations,
            orders,
        } = snapshot;

        Self {
            products: products.into_iter().map(|p| (p.id, p)).collect(),
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
            foundations: foundations.into_iter().map(|f| (f.id, f)).collect(),
            orders,
        }
    }

    pub fn from_json_slice(data: &[u8]) -> Result<Self> {
        parse_snapshot(data).map(Self::new)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
}

impl Catalog for InMemoryCatalog {
    fn get_product(&self, product_id: ProductId) -> Option<Product> {
        self.products.get(&product_id).cloned()
    }

    fn get_category_default_cost(&self, category_id: CategoryId) -> Option<Decimal> {
        self.categories
            .get(&category_id)
            .and_then(|category| category.default_cost)
    }

    fn get_product_category(&self, product_id: ProductId) -> Option<CategoryId> {
        self.products
            .get(&product_id)
            .and_then(|product| product.category)
    }

    fn get_foundation(&self, foundation_id: FoundationId) -> Option<Foundation> {
        self.foundations.get(&foundation_id).cloned()
    }
}

impl OrderSource for InMemoryCatalog {
    fn fetch_completed_orders(&self) -> Result<Vec<Order>> {
        let completed: Vec<Order> = self
            .orders
            .iter()
            .filter(|order| order.is_completed())
            .cloned()
            .collect();

        tracing::debug!(
            "Selected {} completed orders out of {}",
            completed.len(),
            self.orders.len()
        );

        Ok(completed)
    }
}

/// 解析並驗證 JSON 快照
pub fn parse_snapshot(data: &[u8]) -> Result<CatalogSnapshot> {
    let snapshot: CatalogSnapshot = serde_json::from_slice(data)?;
    snapshot.validate()?;

    tracing::debug!(
        "Parsed snapshot: {} products, {} categories, {} foundations, {} orders",
        snapshot.products.len(),
        snapshot.categories.len(),
        snapshot.foundations.len(),
        snapshot.orders.len()
    );

    Ok(snapshot)
}

fn ensure_not_negative(what: &str, value: Decimal) -> Result<()> {
    if value < Decimal::ZERO {
        return Err(ContributionError::ValidationError {
            message: format!("{} cannot be negative (got {})", what, value),
        });
    }
    Ok(())
}

impl Validate for CatalogSnapshot {
    fn validate(&self) -> Result<()> {
        validate_unique_ids("products", self.products.iter().map(|p| p.id))?;
        validate_unique_ids("categories", self.categories.iter().map(|c| c.id))?;
        validate_unique_ids("foundations", self.foundations.iter().map(|f| f.id))?;
        validate_unique_ids("orders", self.orders.iter().map(|o| o.id))?;

        for product in &self.products {
            ensure_not_negative(&format!("price of product {}", product.id), product.price)?;
            if let Some(cost) = product.cost_basis {
                ensure_not_negative(&format!("cost basis of product {}", product.id), cost)?;
            }
        }

        for category in &self.categories {
            if let Some(cost) = category.default_cost {
                ensure_not_negative(&format!("default cost of category {}", category.id), cost)?;
            }
        }

        for order in &self.orders {
            for item in &order.items {
                if item.quantity == 0 {
                    return Err(ContributionError::ValidationError {
                        message: format!(
                            "order {} has a line for product {} with zero quantity",
                            order.id, item.product_id
                        ),
                    });
                }
                ensure_not_negative(
                    &format!("unit price in order {}", order.id),
                    item.unit_price,
                )?;
            }
        }

        Ok(())
    }
}
