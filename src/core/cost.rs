use crate::domain::model::Product;
use crate::domain::ports::Catalog;
use rust_decimal::Decimal;

/// Portion of a product's price that is not passed on to its foundation.
///
/// Product override first, then the default of the product's category, then
/// zero. A configured value of exactly zero counts as "not configured" and
/// falls through to the next step.
pub fn resolve_cost_basis<C: Catalog + ?Sized>(product: &Product, catalog: &C) -> Decimal {
    if let Some(cost) = product.cost_basis.filter(|c| !c.is_zero()) {
        tracing::trace!("Product {} uses its own cost basis {}", product.id, cost);
        return cost;
    }

    let category_cost = catalog
        .get_product_category(product.id)
        .and_then(|category_id| catalog.get_category_default_cost(category_id))
        .filter(|c| !c.is_zero());

    if let Some(cost) = category_cost {
        tracing::trace!("Product {} falls back to category cost {}", product.id, cost);
        return cost;
    }

    Decimal::ZERO
}

/// Contribution generated by one unit sold at `unit_price`.
pub fn unit_contribution<C: Catalog + ?Sized>(
    product: &Product,
    unit_price: Decimal,
    catalog: &C,
) -> Decimal {
    if product.contribute_all {
        unit_price
    } else {
        unit_price - resolve_cost_basis(product, catalog)
    }
}
