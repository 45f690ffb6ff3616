//! Named read-only views over a built aggregate.
//!
//! Each view is registered under a tag and answers one reporting question
//! (how much did this product raise, what is the grand total, ...). Views
//! return structured values; turning them into currency strings is left to
//! whoever displays them. `None` means "nothing to show", e.g. a product that
//! has not raised anything yet.

use crate::core::aggregate::ContributionAggregate;
use crate::core::cost::unit_contribution;
use crate::domain::model::{Foundation, FoundationId, Product, ProductId};
use crate::domain::ports::Catalog;
use crate::utils::error::{ContributionError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

pub const PRODUCT_DETAIL: &str = "product_detail_contribution_text";
pub const PRODUCT_CONTRIBUTION: &str = "product_contribution";
pub const PRODUCT_CONTRIBUTED: &str = "product_contributed";
pub const PRODUCT_CONTRIBUTED_ALL: &str = "product_contributed_all";
pub const CONTRIBUTED_ALL: &str = "contributed_all";
pub const FOUNDATION_NAME: &str = "foundation_name";
pub const FOUNDATION_TEXT: &str = "foundation_text";
pub const FOUNDATION_META: &str = "foundation_meta";

pub struct ViewContext<'a> {
    pub aggregate: &'a ContributionAggregate,
    pub catalog: &'a dyn Catalog,
}

#[derive(Debug, Clone, Default)]
pub struct ViewRequest {
    pub product_id: Option<ProductId>,
    pub foundation_id: Option<FoundationId>,
    /// Attribute name, only read by `foundation_meta`.
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetail {
    pub foundation_id: FoundationId,
    pub foundation_name: String,
    /// What one unit sold at the current price passes on.
    pub unit_contribution: Decimal,
    pub product_total: Option<Decimal>,
    pub foundation_total: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewOutput {
    Amount { amount: Decimal },
    Text { text: String },
    ProductDetail(ProductDetail),
}

pub type ViewHandler =
    Box<dyn Fn(&ViewContext<'_>, &ViewRequest) -> Result<Option<ViewOutput>> + Send + Sync>;

pub struct ViewRegistry {
    handlers: HashMap<&'static str, ViewHandler>,
}

fn positive(amount: Decimal) -> Option<Decimal> {
    (amount > Decimal::ZERO).then_some(amount)
}

fn requested_product(ctx: &ViewContext<'_>, request: &ViewRequest, tag: &str) -> Result<Product> {
    let product_id = request
        .product_id
        .ok_or_else(|| ContributionError::ProcessingError {
            message: format!("View '{}' requires a product id", tag),
        })?;

    ctx.catalog
        .get_product(product_id)
        .ok_or_else(|| ContributionError::ProcessingError {
            message: format!("View '{}' asked for unknown product {}", tag, product_id),
        })
}

fn product_detail(ctx: &ViewContext<'_>, request: &ViewRequest) -> Result<Option<ViewOutput>> {
    let product = requested_product(ctx, request, PRODUCT_DETAIL)?;

    let Some(foundation) = product
        .foundation
        .and_then(|foundation_id| ctx.catalog.get_foundation(foundation_id))
    else {
        return Ok(None);
    };

    Ok(Some(ViewOutput::ProductDetail(ProductDetail {
        foundation_id: foundation.id,
        foundation_name: foundation.name,
        unit_contribution: unit_contribution(&product, product.price, ctx.catalog),
        product_total: positive(ctx.aggregate.product_contribution(foundation.id, product.id)),
        foundation_total: positive(ctx.aggregate.foundation_contribution(foundation.id)),
    })))
}

fn product_contribution(ctx: &ViewContext<'_>, request: &ViewRequest) -> Result<Option<ViewOutput>> {
    let product = requested_product(ctx, request, PRODUCT_CONTRIBUTION)?;

    Ok(product
        .cost_basis
        .and_then(positive)
        .map(|amount| ViewOutput::Amount { amount }))
}

fn product_contributed(ctx: &ViewContext<'_>, request: &ViewRequest) -> Result<Option<ViewOutput>> {
    let product = requested_product(ctx, request, PRODUCT_CONTRIBUTED)?;
    let amount = ctx
        .aggregate
        .product_contribution(product.foundation_id(), product.id);

    Ok(positive(amount).map(|amount| ViewOutput::Amount { amount }))
}

fn product_contributed_all(
    ctx: &ViewContext<'_>,
    request: &ViewRequest,
) -> Result<Option<ViewOutput>> {
    let product = requested_product(ctx, request, PRODUCT_CONTRIBUTED_ALL)?;

    let Some(foundation_id) = product.foundation else {
        return Ok(None);
    };

    Ok(positive(ctx.aggregate.foundation_contribution(foundation_id))
        .map(|amount| ViewOutput::Amount { amount }))
}

fn contributed_all(ctx: &ViewContext<'_>, _request: &ViewRequest) -> Result<Option<ViewOutput>> {
    Ok(positive(ctx.aggregate.total_contribution()).map(|amount| ViewOutput::Amount { amount }))
}

/// Explicit foundation id wins; otherwise the requested product's foundation.
fn requested_foundation(
    ctx: &ViewContext<'_>,
    request: &ViewRequest,
    tag: &str,
) -> Result<Option<Foundation>> {
    let foundation_id = match request.foundation_id {
        Some(id) => Some(id),
        None => requested_product(ctx, request, tag)?.foundation,
    };

    Ok(foundation_id.and_then(|id| ctx.catalog.get_foundation(id)))
}

fn foundation_name(ctx: &ViewContext<'_>, request: &ViewRequest) -> Result<Option<ViewOutput>> {
    Ok(requested_foundation(ctx, request, FOUNDATION_NAME)?.map(|foundation| ViewOutput::Text {
        text: foundation.name,
    }))
}

fn foundation_text(ctx: &ViewContext<'_>, request: &ViewRequest) -> Result<Option<ViewOutput>> {
    Ok(requested_foundation(ctx, request, FOUNDATION_TEXT)?
        .and_then(|foundation| foundation.summary)
        .filter(|summary| !summary.trim().is_empty())
        .map(|text| ViewOutput::Text { text }))
}

fn foundation_meta(ctx: &ViewContext<'_>, request: &ViewRequest) -> Result<Option<ViewOutput>> {
    let key = request
        .key
        .as_deref()
        .ok_or_else(|| ContributionError::ProcessingError {
            message: format!("View '{}' requires a key", FOUNDATION_META),
        })?;

    Ok(requested_foundation(ctx, request, FOUNDATION_META)?
        .and_then(|mut foundation| foundation.meta.remove(key))
        .filter(|value| !value.is_empty())
        .map(|text| ViewOutput::Text { text }))
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PRODUCT_DETAIL, Box::new(product_detail));
        registry.register(PRODUCT_CONTRIBUTION, Box::new(product_contribution));
        registry.register(PRODUCT_CONTRIBUTED, Box::new(product_contributed));
        registry.register(PRODUCT_CONTRIBUTED_ALL, Box::new(product_contributed_all));
        registry.register(CONTRIBUTED_ALL, Box::new(contributed_all));
        registry.register(FOUNDATION_NAME, Box::new(foundation_name));
        registry.register(FOUNDATION_TEXT, Box::new(foundation_text));
        registry.register(FOUNDATION_META, Box::new(foundation_meta));
        registry
    }

    pub fn register(&mut self, tag: &'static str, handler: ViewHandler) {
        if self.handlers.insert(tag, handler).is_some() {
            tracing::warn!("View '{}' was registered twice; keeping the latest", tag);
        }
    }

    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.handlers.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    pub fn render(
        &self,
        tag: &str,
        ctx: &ViewContext<'_>,
        request: &ViewRequest,
    ) -> Result<Option<ViewOutput>> {
        let handler = self
            .handlers
            .get(tag)
            .ok_or_else(|| ContributionError::ProcessingError {
                message: format!(
                    "Unknown view '{}'. Available views: {}",
                    tag,
                    self.tags().join(", ")
                ),
            })?;

        tracing::debug!("Rendering view '{}' for {:?}", tag, request);
        handler(ctx, request)
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::InMemoryCatalog;
    use crate::core::engine::aggregate_completed_orders;
    use rust_decimal_macros::dec;

    const SNAPSHOT: &str = r#"{
        "products": [
            {"id": 1, "name": "Tote bag", "price": "50.00", "cost_basis": "20.00", "foundation": 1},
            {"id": 2, "name": "Donation ticket", "price": "30.00", "contribute_all": true, "foundation": 1},
            {"id": 3, "name": "Sticker", "price": "4.00", "category": 9},
            {"id": 4, "name": "New mug", "price": "12.00", "cost_basis": "8.00", "foundation": 1},
            {"id": 5, "name": "Orphan", "price": "9.00", "foundation": 77}
        ],
        "categories": [{"id": 9, "default_cost": "1.50"}],
        "foundations": [
            {"id": 1, "name": "River Trust", "summary": "Keeps the river clean.",
             "meta": {"website": "https://river.example", "founded": ""}},
            {"id": 2, "name": "Quiet Fund"}
        ],
        "orders": [
            {"id": 1, "status": "completed", "items": [{"product_id": 1, "unit_price": "50.00", "quantity": 2}]},
            {"id": 2, "status": "completed", "items": [{"product_id": 1, "unit_price": "50.00", "quantity": 3}]},
            {"id": 3, "status": "completed", "items": [{"product_id": 2, "unit_price": "30.00", "quantity": 1}]}
        ]
    }"#;

    fn render(tag: &str, request: ViewRequest) -> Result<Option<ViewOutput>> {
        let catalog = InMemoryCatalog::from_json_slice(SNAPSHOT.as_bytes()).unwrap();
        let aggregate = aggregate_completed_orders(&catalog, 2).unwrap();
        let ctx = ViewContext {
            aggregate: &aggregate,
            catalog: &catalog,
        };
        ViewRegistry::with_defaults().render(tag, &ctx, &request)
    }

    fn for_product(id: u64) -> ViewRequest {
        ViewRequest {
            product_id: Some(ProductId(id)),
            ..ViewRequest::default()
        }
    }

    fn for_foundation(id: i64) -> ViewRequest {
        ViewRequest {
            foundation_id: Some(FoundationId(id)),
            ..ViewRequest::default()
        }
    }

    #[test]
    fn test_product_detail_reports_unit_and_totals() {
        let output = render(PRODUCT_DETAIL, for_product(1)).unwrap();

        assert_eq!(
            output,
            Some(ViewOutput::ProductDetail(ProductDetail {
                foundation_id: FoundationId(1),
                foundation_name: "River Trust".to_string(),
                unit_contribution: dec!(30.00),
                product_total: Some(dec!(150.00)),
                foundation_total: Some(dec!(180.00)),
            }))
        );
    }

    #[test]
    fn test_product_detail_without_sales_has_no_product_total() {
        let Some(ViewOutput::ProductDetail(detail)) = render(PRODUCT_DETAIL, for_product(4)).unwrap()
        else {
            panic!("expected product detail");
        };

        assert_eq!(detail.unit_contribution, dec!(4.00));
        assert_eq!(detail.product_total, None);
        assert_eq!(detail.foundation_total, Some(dec!(180.00)));
    }

    #[test]
    fn test_product_detail_needs_a_known_foundation() {
        assert_eq!(render(PRODUCT_DETAIL, for_product(3)).unwrap(), None);
        assert_eq!(render(PRODUCT_DETAIL, for_product(5)).unwrap(), None);
    }

    #[test]
    fn test_amount_views() {
        assert_eq!(
            render(PRODUCT_CONTRIBUTION, for_product(1)).unwrap(),
            Some(ViewOutput::Amount { amount: dec!(20.00) })
        );
        assert_eq!(render(PRODUCT_CONTRIBUTION, for_product(2)).unwrap(), None);

        assert_eq!(
            render(PRODUCT_CONTRIBUTED, for_product(2)).unwrap(),
            Some(ViewOutput::Amount { amount: dec!(30.00) })
        );
        assert_eq!(render(PRODUCT_CONTRIBUTED, for_product(4)).unwrap(), None);

        assert_eq!(
            render(PRODUCT_CONTRIBUTED_ALL, for_product(4)).unwrap(),
            Some(ViewOutput::Amount { amount: dec!(180.00) })
        );
        assert_eq!(render(PRODUCT_CONTRIBUTED_ALL, for_product(3)).unwrap(), None);

        assert_eq!(
            render(CONTRIBUTED_ALL, ViewRequest::default()).unwrap(),
            Some(ViewOutput::Amount { amount: dec!(180.00) })
        );
    }

    #[test]
    fn test_foundation_name_by_id_or_product() {
        let by_id = for_foundation(1);
        let expected = Some(ViewOutput::Text {
            text: "River Trust".to_string(),
        });

        assert_eq!(render(FOUNDATION_NAME, by_id).unwrap(), expected);
        assert_eq!(render(FOUNDATION_NAME, for_product(2)).unwrap(), expected);
        assert_eq!(render(FOUNDATION_NAME, for_product(3)).unwrap(), None);
    }

    #[test]
    fn test_foundation_text_by_id_or_product() {
        let expected = Some(ViewOutput::Text {
            text: "Keeps the river clean.".to_string(),
        });

        assert_eq!(render(FOUNDATION_TEXT, for_foundation(1)).unwrap(), expected);
        assert_eq!(render(FOUNDATION_TEXT, for_product(1)).unwrap(), expected);
        assert_eq!(render(FOUNDATION_TEXT, for_foundation(2)).unwrap(), None);
        assert_eq!(render(FOUNDATION_TEXT, for_product(3)).unwrap(), None);
    }

    #[test]
    fn test_foundation_meta_reads_one_attribute() {
        let website = |request: ViewRequest| ViewRequest {
            key: Some("website".to_string()),
            ..request
        };
        let expected = Some(ViewOutput::Text {
            text: "https://river.example".to_string(),
        });

        assert_eq!(render(FOUNDATION_META, website(for_foundation(1))).unwrap(), expected);
        assert_eq!(render(FOUNDATION_META, website(for_product(2))).unwrap(), expected);
        assert_eq!(render(FOUNDATION_META, website(for_foundation(2))).unwrap(), None);

        let founded = ViewRequest {
            key: Some("founded".to_string()),
            ..for_foundation(1)
        };
        assert_eq!(render(FOUNDATION_META, founded).unwrap(), None);

        let err = render(FOUNDATION_META, for_foundation(1)).unwrap_err();
        assert!(err.to_string().contains("requires a key"));
    }

    #[test]
    fn test_bad_requests_are_errors() {
        let err = render("nope", ViewRequest::default()).unwrap_err();
        assert!(err.to_string().contains("Unknown view 'nope'"));

        let err = render(PRODUCT_CONTRIBUTED, ViewRequest::default()).unwrap_err();
        assert!(err.to_string().contains("requires a product id"));

        let err = render(PRODUCT_CONTRIBUTED, for_product(404)).unwrap_err();
        assert!(err.to_string().contains("unknown product 404"));
    }

    #[test]
    fn test_custom_views_can_be_registered() {
        let mut registry = ViewRegistry::new();
        registry.register(
            "unassigned_total",
            Box::new(
                |ctx: &ViewContext<'_>, _: &ViewRequest| -> Result<Option<ViewOutput>> {
                    Ok(Some(ViewOutput::Amount {
                        amount: ctx.aggregate.foundation_contribution(FoundationId::UNASSIGNED),
                    }))
                },
            ),
        );

        assert_eq!(registry.tags(), vec!["unassigned_total"]);

        let catalog = InMemoryCatalog::from_json_slice(SNAPSHOT.as_bytes()).unwrap();
        let aggregate = aggregate_completed_orders(&catalog, 2).unwrap();
        let ctx = ViewContext {
            aggregate: &aggregate,
            catalog: &catalog,
        };
        assert_eq!(
            registry
                .render("unassigned_total", &ctx, &ViewRequest::default())
                .unwrap(),
            Some(ViewOutput::Amount {
                amount: Decimal::ZERO
            })
        );
    }
}
