//! Data-quality checks run alongside the analysis.

use serde::Serialize;

use super::{Collector, MetricError, SalesAnalyzer};
use crate::mapping::SemanticField;

/// Share of missing cells, in percent, above which a column is flagged.
pub const MISSING_THRESHOLD_PCT: f64 = 20.0;
/// Largest quantity accepted as plausible for a single order line.
pub const MAX_PLAUSIBLE_QUANTITY: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    HighMissing,
    DuplicateRows,
    NegativeAmounts,
    InvalidQuantities,
    FutureDates,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataWarning {
    pub kind: WarningKind,
    pub count: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
    pub message: String,
}

impl SalesAnalyzer {
    fn warning(&self, kind: WarningKind, count: usize, columns: Vec<String>) -> Option<DataWarning> {
        if count == 0 {
            return None;
        }
        let message = self.options().language.warning(kind, count, &columns);
        Some(DataWarning {
            kind,
            count,
            columns,
            message,
        })
    }

    fn high_missing(&self) -> Result<Option<DataWarning>, MetricError> {
        let rows = self.row_count();
        if rows == 0 {
            return Err(MetricError::EmptyDataset);
        }
        let columns = self
            .dataset()
            .columns()
            .iter()
            .filter(|c| c.missing_count() as f64 / rows as f64 * 100.0 > MISSING_THRESHOLD_PCT)
            .map(|c| c.name.clone())
            .collect::<Vec<_>>();
        Ok(self.warning(WarningKind::HighMissing, columns.len(), columns))
    }

    fn duplicate_rows(&self) -> Option<DataWarning> {
        self.warning(
            WarningKind::DuplicateRows,
            self.dataset().duplicate_row_count(),
            Vec::new(),
        )
    }

    fn count_numbers(
        &self,
        kind: WarningKind,
        field: SemanticField,
        flagged: impl Fn(f64) -> bool,
    ) -> Result<Option<DataWarning>, MetricError> {
        let column = self.column(field)?;
        let count = column
            .numeric_values()
            .into_iter()
            .flatten()
            .filter(|value| flagged(*value))
            .count();
        Ok(self.warning(kind, count, vec![column.name.clone()]))
    }

    fn future_dates(&self) -> Result<Option<DataWarning>, MetricError> {
        let column = self.column(SemanticField::OrderDate)?;
        let now = self.options().now;
        let count = column
            .timestamps()
            .into_iter()
            .flatten()
            .filter(|stamp| *stamp > now)
            .count();
        Ok(self.warning(WarningKind::FutureDates, count, vec![column.name.clone()]))
    }
}

pub(crate) fn check(analyzer: &SalesAnalyzer) -> Collector<DataWarning> {
    let mut warnings = Collector::new();
    warnings.record_optional("warning.high_missing", analyzer.high_missing());
    warnings.record_optional("warning.duplicate_rows", Ok(analyzer.duplicate_rows()));
    warnings.record_optional(
        "warning.negative_amounts",
        analyzer.count_numbers(WarningKind::NegativeAmounts, SemanticField::TotalAmount, |v| {
            v < 0.0
        }),
    );
    warnings.record_optional(
        "warning.invalid_quantities",
        analyzer.count_numbers(WarningKind::InvalidQuantities, SemanticField::Quantity, |v| {
            v <= 0.0 || v > MAX_PLAUSIBLE_QUANTITY
        }),
    );
    warnings.record_optional("warning.future_dates", analyzer.future_dates());
    warnings
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        analysis::{AnalysisOptions, analyze_with},
        dataset::Dataset,
        mapping::FieldMapping,
    };

    fn options() -> AnalysisOptions {
        AnalysisOptions::at(
            NaiveDate::from_ymd_opt(2024, 6, 30)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn flags_missing_columns_and_implausible_quantities() {
        let dataset = Dataset::from_rows(
            ["qty", "note"],
            vec![
                vec!["0", ""],
                vec!["5", ""],
                vec!["1001", "ok"],
                vec!["-2", ""],
                vec!["1000", "fine"],
            ],
        );
        let mapping = FieldMapping::default().with(SemanticField::Quantity, "qty");
        let result = analyze_with(&dataset, &mapping, &options());

        let missing = result.warning(WarningKind::HighMissing).unwrap();
        assert_eq!(missing.columns, vec!["note".to_string()]);
        assert_eq!(missing.message, "⚠️ Columns with missing values >20%: note");

        let quantities = result.warning(WarningKind::InvalidQuantities).unwrap();
        assert_eq!(quantities.count, 3);
    }

    #[test]
    fn exactly_twenty_percent_missing_is_not_flagged() {
        let dataset = Dataset::from_rows(
            ["a"],
            vec![vec!["1"], vec!["2"], vec!["3"], vec!["4"], vec![""]],
        );
        let result = analyze_with(&dataset, &FieldMapping::default(), &options());
        assert!(result.warning(WarningKind::HighMissing).is_none());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn future_dates_compare_against_processing_time() {
        let dataset = Dataset::from_rows(
            ["date"],
            vec![vec!["2024-06-30"], vec!["2024-06-30 13:00:00"], vec!["2025-01-01"]],
        );
        let mapping = FieldMapping::default().with(SemanticField::OrderDate, "date");
        let result = analyze_with(&dataset, &mapping, &options());
        assert_eq!(result.warning(WarningKind::FutureDates).unwrap().count, 2);
    }

    #[test]
    fn empty_dataset_skips_missing_check() {
        let dataset = Dataset::from_rows(["a"], Vec::<Vec<&str>>::new());
        let result = analyze_with(&dataset, &FieldMapping::default(), &options());
        assert!(result.warnings.is_empty());
        assert!(
            result
                .skipped
                .iter()
                .any(|s| s.metric == "warning.high_missing" && s.reason == MetricError::EmptyDataset)
        );
    }
}
