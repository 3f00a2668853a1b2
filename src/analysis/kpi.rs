use serde::Serialize;

use super::{Collector, MetricError, SalesAnalyzer};
use crate::{
    format::{format_count, format_currency, format_decimal, format_percent},
    mapping::SemanticField,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiKind {
    TotalTransactions,
    TotalSales,
    AvgTransaction,
    GrossProfit,
    GrossMargin,
    UniqueCustomers,
    UniqueProducts,
    AvgQuantity,
    DiscountRate,
}

impl KpiKind {
    pub fn icon(&self) -> &'static str {
        match self {
            KpiKind::TotalTransactions => "🛒",
            KpiKind::TotalSales => "💰",
            KpiKind::AvgTransaction => "📊",
            KpiKind::GrossProfit => "📈",
            KpiKind::GrossMargin => "📊",
            KpiKind::UniqueCustomers => "👥",
            KpiKind::UniqueProducts => "📦",
            KpiKind::AvgQuantity => "⚖️",
            KpiKind::DiscountRate => "🎯",
        }
    }

    fn metric_name(&self) -> &'static str {
        match self {
            KpiKind::TotalTransactions => "total_transactions",
            KpiKind::TotalSales => "total_sales",
            KpiKind::AvgTransaction => "avg_transaction",
            KpiKind::GrossProfit => "gross_profit",
            KpiKind::GrossMargin => "gross_margin",
            KpiKind::UniqueCustomers => "unique_customers",
            KpiKind::UniqueProducts => "unique_products",
            KpiKind::AvgQuantity => "avg_quantity",
            KpiKind::DiscountRate => "discount_rate",
        }
    }

    fn format(&self, value: f64) -> String {
        match self {
            KpiKind::TotalSales | KpiKind::AvgTransaction | KpiKind::GrossProfit => {
                format_currency(value)
            }
            KpiKind::GrossMargin | KpiKind::DiscountRate => format_percent(value),
            KpiKind::AvgQuantity => format_decimal(value),
            KpiKind::TotalTransactions | KpiKind::UniqueCustomers | KpiKind::UniqueProducts => {
                format_count(value as usize)
            }
        }
    }

    /// Qualitative reading of a value against the fixed dashboard thresholds.
    pub fn trend(&self, value: f64) -> KpiTrend {
        let positive_or = |positive: bool, otherwise: KpiTrend| {
            if positive { KpiTrend::Positive } else { otherwise }
        };
        match self {
            KpiKind::TotalTransactions => KpiTrend::Neutral,
            KpiKind::TotalSales | KpiKind::AvgTransaction | KpiKind::GrossProfit => {
                positive_or(value > 0.0, KpiTrend::Negative)
            }
            KpiKind::GrossMargin => positive_or(value > 15.0, KpiTrend::Neutral),
            KpiKind::UniqueCustomers | KpiKind::UniqueProducts => {
                positive_or(value > 0.0, KpiTrend::Neutral)
            }
            KpiKind::AvgQuantity => positive_or(value > 1.0, KpiTrend::Neutral),
            KpiKind::DiscountRate => positive_or(value < 10.0, KpiTrend::Neutral),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiTrend {
    Positive,
    Negative,
    Neutral,
}

/// A single KPI card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub kind: KpiKind,
    pub value: f64,
    pub formatted: String,
    pub label: String,
    pub icon: &'static str,
    pub trend: KpiTrend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<&'static str>,
    /// Derived from an assumed margin rather than measured profit or cost.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub estimated: bool,
}

struct Profit {
    amount: f64,
    estimated: bool,
}

impl SalesAnalyzer {
    fn kpi(&self, kind: KpiKind, value: f64, estimated: bool) -> Kpi {
        let language = self.options().language;
        let label = language.kpi_label(kind);
        let label = if estimated {
            format!("{label} {}", language.texts().estimated_suffix)
        } else {
            label.to_string()
        };
        Kpi {
            kind,
            value,
            formatted: kind.format(value),
            label,
            icon: kind.icon(),
            trend: kind.trend(value),
            definition: language.kpi_definition(kind),
            estimated,
        }
    }

    fn distinct(&self, field: SemanticField) -> Result<f64, MetricError> {
        Ok(self.column(field)?.distinct_count() as f64)
    }

    /// Profit from the profit column, else from cost, else from the assumed margin.
    /// A field that is unmapped or names an absent column falls through to the next source.
    fn gross_profit(&self, total_sales: f64) -> Result<Profit, MetricError> {
        match self.sum(SemanticField::Profit) {
            Err(reason) if reason.is_unavailable() => {}
            other => {
                return other.map(|amount| Profit {
                    amount,
                    estimated: false,
                });
            }
        }
        match self.cost_of_goods() {
            Err(reason) if reason.is_unavailable() => {}
            other => {
                return other.map(|cogs| Profit {
                    amount: total_sales - cogs,
                    estimated: false,
                });
            }
        }
        match self.options().estimated_margin {
            Some(margin) => Ok(Profit {
                amount: total_sales * margin,
                estimated: true,
            }),
            None => Err(MetricError::FieldNotMapped(SemanticField::Profit)),
        }
    }

    /// Cost × quantity per row when quantity is available, otherwise the plain cost sum.
    fn cost_of_goods(&self) -> Result<f64, MetricError> {
        let cost = self.column(SemanticField::Cost)?;
        let Ok(quantity) = self.numbers(SemanticField::Quantity) else {
            return self.sum(SemanticField::Cost);
        };
        let products = cost
            .numeric_values()
            .into_iter()
            .zip(quantity)
            .filter_map(|(cost, qty)| Some(cost? * qty?))
            .collect::<Vec<_>>();
        if products.is_empty() {
            return Err(MetricError::NoNumericValues(cost.name.clone()));
        }
        Ok(products.iter().sum())
    }
}

fn ratio(numerator: f64, denominator: f64, what: &'static str) -> Result<f64, MetricError> {
    if denominator > 0.0 {
        Ok(numerator / denominator * 100.0)
    } else {
        Err(MetricError::ZeroDenominator(what))
    }
}

pub(crate) fn compute(analyzer: &SalesAnalyzer) -> Collector<Kpi> {
    let mut kpis = Collector::new();
    let rows = analyzer.row_count();

    kpis.record(
        KpiKind::TotalTransactions.metric_name(),
        Ok(analyzer.kpi(KpiKind::TotalTransactions, rows as f64, false)),
    );

    let total_sales = analyzer.sum(SemanticField::TotalAmount);
    kpis.record(
        KpiKind::TotalSales.metric_name(),
        total_sales
            .clone()
            .map(|sales| analyzer.kpi(KpiKind::TotalSales, sales, false)),
    );

    kpis.record(
        KpiKind::AvgTransaction.metric_name(),
        total_sales.clone().and_then(|sales| {
            if rows == 0 {
                return Err(MetricError::ZeroDenominator("total transactions"));
            }
            Ok(analyzer.kpi(KpiKind::AvgTransaction, sales / rows as f64, false))
        }),
    );

    let profit = total_sales
        .clone()
        .and_then(|sales| analyzer.gross_profit(sales).map(|profit| (sales, profit)));
    kpis.record(
        KpiKind::GrossProfit.metric_name(),
        profit
            .as_ref()
            .map(|(_, profit)| analyzer.kpi(KpiKind::GrossProfit, profit.amount, profit.estimated))
            .map_err(Clone::clone),
    );
    kpis.record(
        KpiKind::GrossMargin.metric_name(),
        profit.and_then(|(sales, profit)| {
            let margin = ratio(profit.amount, sales, "total sales")?;
            Ok(analyzer.kpi(KpiKind::GrossMargin, margin, profit.estimated))
        }),
    );

    kpis.record(
        KpiKind::UniqueCustomers.metric_name(),
        analyzer
            .distinct(SemanticField::CustomerId)
            .map(|count| analyzer.kpi(KpiKind::UniqueCustomers, count, false)),
    );
    kpis.record(
        KpiKind::UniqueProducts.metric_name(),
        analyzer
            .distinct(SemanticField::ProductId)
            .map(|count| analyzer.kpi(KpiKind::UniqueProducts, count, false)),
    );
    kpis.record(
        KpiKind::AvgQuantity.metric_name(),
        analyzer
            .mean(SemanticField::Quantity)
            .map(|mean| analyzer.kpi(KpiKind::AvgQuantity, mean, false)),
    );

    kpis.record(
        KpiKind::DiscountRate.metric_name(),
        total_sales.and_then(|sales| {
            let discount = analyzer.sum(SemanticField::Discount)?;
            let rate = ratio(discount, sales, "total sales")?;
            Ok(analyzer.kpi(KpiKind::DiscountRate, rate, false))
        }),
    );

    kpis
}
