//! Frequency tables, summed breakdowns and the price/quantity relationship.

use std::{cmp::Ordering, collections::HashMap};

use itertools::Itertools;
use serde::Serialize;

use super::{Collector, MetricError, ProfitSummary, SalesAnalyzer};
use crate::mapping::SemanticField;

/// Entries kept for the product tables.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    Region,
    Category,
    TopProducts,
    PaymentMethod,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 4] = [
        DistributionKind::Region,
        DistributionKind::Category,
        DistributionKind::TopProducts,
        DistributionKind::PaymentMethod,
    ];

    pub fn field(&self) -> SemanticField {
        match self {
            DistributionKind::Region => SemanticField::Region,
            DistributionKind::Category => SemanticField::Category,
            DistributionKind::TopProducts => SemanticField::ProductName,
            DistributionKind::PaymentMethod => SemanticField::PaymentMethod,
        }
    }

    fn limit(&self) -> Option<usize> {
        match self {
            DistributionKind::TopProducts => Some(TOP_N),
            _ => None,
        }
    }

    fn metric_name(&self) -> &'static str {
        match self {
            DistributionKind::Region => "distribution.region",
            DistributionKind::Category => "distribution.category",
            DistributionKind::TopProducts => "distribution.top_products",
            DistributionKind::PaymentMethod => "distribution.payment_method",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: usize,
}

/// Value counts of one categorical column, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub kind: DistributionKind,
    pub column: String,
    pub entries: Vec<FrequencyEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakdownKind {
    SalesByRegion,
    SalesByCategory,
    TopSalespeople,
    TopProductsByQuantity,
}

impl BreakdownKind {
    pub const ALL: [BreakdownKind; 4] = [
        BreakdownKind::SalesByRegion,
        BreakdownKind::SalesByCategory,
        BreakdownKind::TopSalespeople,
        BreakdownKind::TopProductsByQuantity,
    ];

    /// Grouping field and summed field.
    pub fn fields(&self) -> (SemanticField, SemanticField) {
        match self {
            BreakdownKind::SalesByRegion => (SemanticField::Region, SemanticField::TotalAmount),
            BreakdownKind::SalesByCategory => (SemanticField::Category, SemanticField::TotalAmount),
            BreakdownKind::TopSalespeople => (SemanticField::Salesperson, SemanticField::TotalAmount),
            BreakdownKind::TopProductsByQuantity => {
                (SemanticField::ProductName, SemanticField::Quantity)
            }
        }
    }

    fn limit(&self) -> Option<usize> {
        match self {
            BreakdownKind::TopSalespeople | BreakdownKind::TopProductsByQuantity => Some(TOP_N),
            _ => None,
        }
    }

    fn metric_name(&self) -> &'static str {
        match self {
            BreakdownKind::SalesByRegion => "breakdown.sales_by_region",
            BreakdownKind::SalesByCategory => "breakdown.sales_by_category",
            BreakdownKind::TopSalespeople => "breakdown.top_salespeople",
            BreakdownKind::TopProductsByQuantity => "breakdown.top_products_by_quantity",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub key: String,
    pub total: f64,
}

/// Sums of one numeric field grouped by a categorical field, largest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub kind: BreakdownKind,
    pub entries: Vec<BreakdownEntry>,
}

impl SalesAnalyzer {
    pub(crate) fn value_counts(&self, field: SemanticField) -> Result<Vec<FrequencyEntry>, MetricError> {
        let column = self.column(field)?;
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut entries: Vec<FrequencyEntry> = Vec::new();
        for value in column.present_values() {
            match index.get(value) {
                Some(&slot) => entries[slot].count += 1,
                None => {
                    index.insert(value, entries.len());
                    entries.push(FrequencyEntry {
                        value: value.to_string(),
                        count: 1,
                    });
                }
            }
        }
        if entries.is_empty() {
            return Err(MetricError::NoGroups(column.name.clone()));
        }
        // stable: equal counts keep first-seen order
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(entries)
    }

    /// Sums `value` per distinct `group` over rows where both are present.
    pub(crate) fn ranked_sums(
        &self,
        group: SemanticField,
        value: SemanticField,
    ) -> Result<Vec<BreakdownEntry>, MetricError> {
        let keys = self.column(group)?;
        let values = self.numbers(value)?;
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut entries: Vec<BreakdownEntry> = Vec::new();
        for (key, amount) in keys.cells().zip(values) {
            let (Some(key), Some(amount)) = (key, amount) else {
                continue;
            };
            match index.get(key) {
                Some(&slot) => entries[slot].total += amount,
                None => {
                    index.insert(key, entries.len());
                    entries.push(BreakdownEntry {
                        key: key.to_string(),
                        total: amount,
                    });
                }
            }
        }
        if entries.is_empty() {
            return Err(MetricError::NoGroups(keys.name.clone()));
        }
        entries.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
        Ok(entries)
    }
}

pub(crate) fn distributions(analyzer: &SalesAnalyzer) -> Collector<Distribution> {
    let mut collected = Collector::new();
    for kind in DistributionKind::ALL {
        let distribution = analyzer.value_counts(kind.field()).and_then(|mut entries| {
            if let Some(limit) = kind.limit() {
                entries.truncate(limit);
            }
            let column = analyzer.column(kind.field())?.name.clone();
            Ok(Distribution {
                kind,
                column,
                entries,
            })
        });
        collected.record(kind.metric_name(), distribution);
    }
    collected
}

pub(crate) fn breakdowns(analyzer: &SalesAnalyzer) -> Collector<Breakdown> {
    let mut collected = Collector::new();
    for kind in BreakdownKind::ALL {
        let (group, value) = kind.fields();
        let breakdown = analyzer.ranked_sums(group, value).map(|mut entries| {
            if let Some(limit) = kind.limit() {
                entries.truncate(limit);
            }
            Breakdown { kind, entries }
        });
        collected.record(kind.metric_name(), breakdown);
    }
    collected
}

/// Pearson correlation of unit price and quantity over rows where both coerce.
pub(crate) fn price_quantity_correlation(analyzer: &SalesAnalyzer) -> Result<f64, MetricError> {
    let price = analyzer.column(SemanticField::Price)?;
    let pairs = price
        .numeric_values()
        .into_iter()
        .zip(analyzer.numbers(SemanticField::Quantity)?)
        .filter_map(|(p, q)| Some((p?, q?)))
        .collect_vec();
    if pairs.len() < 2 {
        return Err(MetricError::NoNumericValues(price.name.clone()));
    }
    let n = pairs.len() as f64;
    let mean_p = pairs.iter().map(|(p, _)| p).sum::<f64>() / n;
    let mean_q = pairs.iter().map(|(_, q)| q).sum::<f64>() / n;
    let (cov, var_p, var_q) = pairs.iter().fold((0.0, 0.0, 0.0), |(cov, vp, vq), (p, q)| {
        let dp = p - mean_p;
        let dq = q - mean_q;
        (cov + dp * dq, vp + dp * dp, vq + dq * dq)
    });
    let denominator = (var_p * var_q).sqrt();
    if denominator == 0.0 {
        return Err(MetricError::ZeroDenominator("price/quantity variance"));
    }
    Ok(cov / denominator)
}

pub(crate) fn profit_summary(analyzer: &SalesAnalyzer) -> Result<ProfitSummary, MetricError> {
    let column = analyzer.column(SemanticField::Profit)?;
    let values = column.numeric_values().into_iter().flatten().collect_vec();
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Err(MetricError::NoNumericValues(column.name.clone()));
    };
    Ok(ProfitSummary {
        count: values.len(),
        mean: values.iter().sum::<f64>() / values.len() as f64,
        min,
        max,
    })
}
