use crate::core::cost::unit_contribution;
use crate::domain::model::{FoundationId, Order, ProductId};
use crate::domain::ports::Catalog;
use crate::utils::error::{ContributionError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;

pub const DEFAULT_MINOR_UNITS: u32 = 2;
pub const MAX_MINOR_UNITS: u32 = 6;

/// Foundation -> product -> accumulated contribution.
///
/// Cells hold exact sums. Read views round to the currency's minor unit, and
/// the foundation and grand totals are sums of the rounded cells below them,
/// so every level adds up exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributionAggregate {
    cells: BTreeMap<FoundationId, BTreeMap<ProductId, Decimal>>,
    minor_units: u32,
}

impl Default for ContributionAggregate {
    fn default() -> Self {
        Self::new(DEFAULT_MINOR_UNITS)
    }
}

impl ContributionAggregate {
    pub fn new(minor_units: u32) -> Self {
        Self {
            cells: BTreeMap::new(),
            minor_units,
        }
    }

    pub fn minor_units(&self) -> u32 {
        self.minor_units
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns false when the cell would leave the `Decimal` range; the cell is
    /// left untouched in that case.
    fn add(&mut self, foundation_id: FoundationId, product_id: ProductId, amount: Decimal) -> bool {
        let cell = self
            .cells
            .entry(foundation_id)
            .or_default()
            .entry(product_id)
            .or_insert(Decimal::ZERO);

        match cell.checked_add(amount) {
            Some(sum) => {
                *cell = sum;
                true
            }
            None => false,
        }
    }

    fn round(&self, amount: Decimal) -> Decimal {
        let mut rounded =
            amount.round_dp_with_strategy(self.minor_units, RoundingStrategy::MidpointAwayFromZero);
        // 固定小數位數，輸出時一律為 "10.00" 而非 "10"
        rounded.rescale(self.minor_units);
        rounded
    }

    /// Unrounded cell value, if the product has recorded sales.
    pub fn exact_contribution(
        &self,
        foundation_id: FoundationId,
        product_id: ProductId,
    ) -> Option<Decimal> {
        self.cells
            .get(&foundation_id)
            .and_then(|products| products.get(&product_id))
            .copied()
    }

    pub fn product_contribution(&self, foundation_id: FoundationId, product_id: ProductId) -> Decimal {
        self.exact_contribution(foundation_id, product_id)
            .map(|amount| self.round(amount))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn foundation_contribution(&self, foundation_id: FoundationId) -> Decimal {
        self.cells
            .get(&foundation_id)
            .map(|products| {
                products
                    .values()
                    .map(|amount| self.round(*amount))
                    .sum::<Decimal>()
            })
            .unwrap_or(Decimal::ZERO)
    }

    /// Includes the unassigned bucket; filtering it is up to the caller.
    pub fn total_contribution(&self) -> Decimal {
        self.foundations()
            .map(|foundation_id| self.foundation_contribution(foundation_id))
            .sum()
    }

    pub fn foundations(&self) -> impl Iterator<Item = FoundationId> + '_ {
        self.cells.keys().copied()
    }

    pub fn products(&self, foundation_id: FoundationId) -> impl Iterator<Item = ProductId> + '_ {
        self.cells
            .get(&foundation_id)
            .into_iter()
            .flat_map(|products| products.keys().copied())
    }
}

/// Folds completed orders into a fresh aggregate.
///
/// Cost configuration is read from the catalog as it is now, not as it was when
/// the order was placed. Any line referencing a product the catalog does not
/// know aborts the whole build.
pub fn build_aggregate<C: Catalog + ?Sized>(
    orders: &[Order],
    catalog: &C,
    minor_units: u32,
) -> Result<ContributionAggregate> {
    let mut aggregate = ContributionAggregate::new(minor_units);

    for order in orders {
        tracing::trace!("Aggregating order {} ({} items)", order.id, order.items.len());

        for item in &order.items {
            let product = catalog.get_product(item.product_id).ok_or_else(|| {
                ContributionError::UnknownProduct {
                    order_id: order.id,
                    product_id: item.product_id,
                }
            })?;

            let overflow = || ContributionError::ContributionOverflow {
                order_id: order.id,
                product_id: product.id,
            };

            let contribution = unit_contribution(&product, item.unit_price, catalog)
                .checked_mul(Decimal::from(item.quantity))
                .ok_or_else(overflow)?;

            if contribution < Decimal::ZERO {
                tracing::debug!(
                    "Order {} line for product {} sold below cost basis: {}",
                    order.id,
                    product.id,
                    contribution
                );
            }

            if !aggregate.add(product.foundation_id(), product.id, contribution) {
                return Err(overflow());
            }
        }
    }

    tracing::debug!(
        "Built aggregate over {} orders covering {} foundations",
        orders.len(),
        aggregate.cells.len()
    );

    Ok(aggregate)
}
