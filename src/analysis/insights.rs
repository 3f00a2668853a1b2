use std::collections::HashSet;

use serde::Serialize;

use super::{Collector, KpiKind, MetricError, SalesAnalyzer, kpi::Kpi};
use crate::mapping::SemanticField;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    TopRegion,
    TopProduct,
    TopSalesperson,
    ProfitabilityRate,
    RepeatCustomers,
    MarginCommentary,
}

/// A single sentence summarizing one computed fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    /// Winning group for the ranking insights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub value: f64,
    pub message: String,
}

impl SalesAnalyzer {
    fn top_of(
        &self,
        kind: InsightKind,
        group: SemanticField,
        value: SemanticField,
        describe: impl Fn(&str, f64) -> String,
    ) -> Result<Insight, MetricError> {
        let ranked = self.ranked_sums(group, value)?;
        let top = ranked
            .into_iter()
            .next()
            .ok_or_else(|| MetricError::NoGroups(group.key()))?;
        Ok(Insight {
            kind,
            message: describe(&top.key, top.total),
            subject: Some(top.key),
            value: top.total,
        })
    }

    /// Share of all rows whose profit is strictly positive.
    fn profitability_rate(&self) -> Result<f64, MetricError> {
        let column = self.column(SemanticField::Profit)?;
        if self.row_count() == 0 {
            return Err(MetricError::EmptyDataset);
        }
        let values = column.numeric_values();
        if values.iter().all(Option::is_none) {
            return Err(MetricError::NoNumericValues(column.name.clone()));
        }
        let profitable = values.iter().flatten().filter(|v| **v > 0.0).count();
        Ok(profitable as f64 / self.row_count() as f64 * 100.0)
    }

    /// Share of all rows whose customer id already appeared on an earlier row.
    fn repeat_customer_rate(&self) -> Result<f64, MetricError> {
        let column = self.column(SemanticField::CustomerId)?;
        if self.row_count() == 0 {
            return Err(MetricError::EmptyDataset);
        }
        let mut seen = HashSet::new();
        let repeats = column.present_values().filter(|id| !seen.insert(*id)).count();
        Ok(repeats as f64 / self.row_count() as f64 * 100.0)
    }
}

pub(crate) fn extract(analyzer: &SalesAnalyzer, kpis: &[Kpi]) -> Collector<Insight> {
    let language = analyzer.options().language;
    let mut insights = Collector::new();

    insights.record(
        "insight.top_region",
        analyzer.top_of(
            InsightKind::TopRegion,
            SemanticField::Region,
            SemanticField::TotalAmount,
            |region, sales| language.top_region(region, sales),
        ),
    );
    insights.record(
        "insight.top_product",
        analyzer.top_of(
            InsightKind::TopProduct,
            SemanticField::ProductName,
            SemanticField::Quantity,
            |product, units| language.top_product(product, units),
        ),
    );
    insights.record(
        "insight.top_salesperson",
        analyzer.top_of(
            InsightKind::TopSalesperson,
            SemanticField::Salesperson,
            SemanticField::TotalAmount,
            |name, sales| language.top_salesperson(name, sales),
        ),
    );
    insights.record(
        "insight.profitability_rate",
        analyzer.profitability_rate().map(|rate| Insight {
            kind: InsightKind::ProfitabilityRate,
            subject: None,
            value: rate,
            message: language.profitability_rate(rate),
        }),
    );
    insights.record(
        "insight.repeat_customers",
        analyzer.repeat_customer_rate().map(|rate| Insight {
            kind: InsightKind::RepeatCustomers,
            subject: None,
            value: rate,
            message: language.repeat_customers(rate),
        }),
    );
    // The margin KPI records its own skip reason.
    insights.record_optional(
        "insight.margin_commentary",
        Ok(kpis
            .iter()
            .find(|kpi| kpi.kind == KpiKind::GrossMargin)
            .map(|kpi| Insight {
                kind: InsightKind::MarginCommentary,
                subject: None,
                value: kpi.value,
                message: language.margin_insight(kpi.value),
            })),
    );

    insights
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        analysis::{AnalysisOptions, analyze_with},
        dataset::Dataset,
        locale::Language,
        mapping::FieldMapping,
    };

    fn options() -> AnalysisOptions {
        AnalysisOptions::at(
            NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    fn dataset() -> Dataset {
        Dataset::from_rows(
            ["customer", "region", "rep", "product", "qty", "amount", "profit"],
            vec![
                vec!["c1", "East", "Ann", "Pen", "3", "100", "20"],
                vec!["c2", "West", "Bob", "Ink", "5", "300", "-10"],
                vec!["c1", "East", "Ann", "Pen", "4", "250", "40"],
                vec!["", "West", "Bob", "Pad", "1", "10", "0"],
            ],
        )
    }

    fn mapping() -> FieldMapping {
        FieldMapping::default()
            .with(SemanticField::CustomerId, "customer")
            .with(SemanticField::Region, "region")
            .with(SemanticField::Salesperson, "rep")
            .with(SemanticField::ProductName, "product")
            .with(SemanticField::Quantity, "qty")
            .with(SemanticField::TotalAmount, "amount")
            .with(SemanticField::Profit, "profit")
    }

    #[test]
    fn ranking_insights_pick_the_largest_sum() {
        let result = analyze_with(&dataset(), &mapping(), &options());
        let region = result.insight(InsightKind::TopRegion).unwrap();
        assert_eq!(region.subject.as_deref(), Some("East"));
        assert_eq!(region.message, "🏆 Top Sales Region: East ($350)");
        let product = result.insight(InsightKind::TopProduct).unwrap();
        assert_eq!(product.subject.as_deref(), Some("Pen"));
        assert_eq!(product.value, 7.0);
        let rep = result.insight(InsightKind::TopSalesperson).unwrap();
        assert_eq!(rep.subject.as_deref(), Some("Ann"));
    }

    #[test]
    fn rates_use_every_row_as_denominator() {
        let result = analyze_with(&dataset(), &mapping(), &options());
        assert_eq!(result.insight(InsightKind::ProfitabilityRate).unwrap().value, 50.0);
        // one repeat of c1; the blank id is not a repeat
        assert_eq!(result.insight(InsightKind::RepeatCustomers).unwrap().value, 25.0);
    }

    #[test]
    fn margin_commentary_follows_the_kpi() {
        let result = analyze_with(&dataset(), &mapping(), &options());
        let margin = result.insight(InsightKind::MarginCommentary).unwrap();
        // 50 / 660
        assert!(margin.message.starts_with("❌ Low Profit Margin: 7.6%"));
    }

    #[test]
    fn insights_follow_the_requested_language_and_cap() {
        let mut options = options().with_language(Language::Arabic);
        options.max_insights = Some(2);
        let result = analyze_with(&dataset(), &mapping(), &options);
        assert_eq!(result.insights.len(), 2);
        assert!(result.insights[0].message.contains("أفضل منطقة مبيعات"));
    }
}
