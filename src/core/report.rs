use crate::core::aggregate::ContributionAggregate;
use crate::domain::model::{
    ContributionReport, FoundationId, FoundationSummary, ProductId, ReportRow,
};
use crate::domain::ports::Catalog;
use chrono::{DateTime, Utc};

pub const UNASSIGNED_LABEL: &str = "Unassigned";

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub currency: String,
    /// When false the unassigned bucket is left out of rows, summaries and the
    /// grand total. The aggregate itself is never filtered.
    pub include_unassigned: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            currency: "EUR".to_string(),
            include_unassigned: true,
        }
    }
}

pub fn foundation_label<C: Catalog + ?Sized>(catalog: &C, foundation_id: FoundationId) -> String {
    if foundation_id.is_unassigned() {
        return UNASSIGNED_LABEL.to_string();
    }
    catalog
        .get_foundation(foundation_id)
        .map(|foundation| foundation.name)
        .unwrap_or_else(|| format!("Foundation #{}", foundation_id))
}

fn product_label<C: Catalog + ?Sized>(catalog: &C, product_id: ProductId) -> String {
    catalog
        .get_product(product_id)
        .map(|product| product.name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("Product #{}", product_id))
}

pub fn build_report<C: Catalog + ?Sized>(
    aggregate: &ContributionAggregate,
    catalog: &C,
    options: &ReportOptions,
    orders_considered: usize,
    generated_at: DateTime<Utc>,
) -> ContributionReport {
    let mut rows = Vec::new();
    let mut foundations = Vec::new();

    for foundation_id in aggregate.foundations() {
        if foundation_id.is_unassigned() && !options.include_unassigned {
            tracing::debug!("Leaving unassigned contributions out of the report");
            continue;
        }

        let foundation_name = foundation_label(catalog, foundation_id);
        let mut products = 0;

        for product_id in aggregate.products(foundation_id) {
            products += 1;
            rows.push(ReportRow {
                foundation_id,
                foundation_name: foundation_name.clone(),
                product_id,
                product_name: product_label(catalog, product_id),
                contribution: aggregate.product_contribution(foundation_id, product_id),
            });
        }

        foundations.push(FoundationSummary {
            foundation_id,
            foundation_name,
            products,
            total: aggregate.foundation_contribution(foundation_id),
        });
    }

    let unassigned_total = aggregate.foundation_contribution(FoundationId::UNASSIGNED);
    let total = if options.include_unassigned {
        aggregate.total_contribution()
    } else {
        aggregate.total_contribution() - unassigned_total
    };

    ContributionReport {
        generated_at,
        currency: options.currency.clone(),
        orders_considered,
        rows,
        foundations,
        unassigned_total,
        total,
    }
}
