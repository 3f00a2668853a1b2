//! Sales analysis over a [`Dataset`] and a [`FieldMapping`].
//!
//! [`SalesAnalyzer`] owns a private copy of the table, coerces every mapped
//! numeric field once, and then computes each KPI, distribution, trend,
//! insight and data-quality warning independently. A metric whose inputs are
//! unmapped, absent or unusable is not an error for the pass as a whole: it is
//! left out of the result and listed in [`AnalysisResult::skipped`] with the
//! reason.

pub mod distribution;
pub mod insights;
pub mod kpi;
pub mod quality;
pub mod trend;

use chrono::{Local, NaiveDate, NaiveDateTime};
use log::{debug, info};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::{
    data::canonical_number,
    dataset::{Column, Dataset},
    locale::Language,
    mapping::{FieldMapping, SemanticField},
    schema::ColumnType,
};

pub use distribution::{
    Breakdown, BreakdownEntry, BreakdownKind, Distribution, DistributionKind, FrequencyEntry,
};
pub use insights::{Insight, InsightKind};
pub use kpi::{Kpi, KpiKind, KpiTrend};
pub use quality::{DataWarning, WarningKind};
pub use trend::MonthlyPoint;

/// Why a single metric could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("field '{0}' is not mapped")]
    FieldNotMapped(SemanticField),
    #[error("column '{column}' mapped to '{field}' is not in the dataset")]
    ColumnMissing { field: SemanticField, column: String },
    #[error("column '{0}' has no numeric values")]
    NoNumericValues(String),
    #[error("column '{0}' has no parseable dates")]
    NoDateValues(String),
    #[error("{0} is zero")]
    ZeroDenominator(&'static str),
    #[error("dataset has no rows")]
    EmptyDataset,
    #[error("column '{0}' has no values to rank")]
    NoGroups(String),
}

impl MetricError {
    /// True when the metric's inputs are simply not available, as opposed to unusable.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            MetricError::FieldNotMapped(_) | MetricError::ColumnMissing { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedMetric {
    pub metric: String,
    #[serde(serialize_with = "serialize_display")]
    pub reason: MetricError,
}

fn serialize_display<S: Serializer>(value: &MetricError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfitSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Everything one analysis pass produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub row_count: usize,
    pub kpis: Vec<Kpi>,
    pub distributions: Vec<Distribution>,
    pub breakdowns: Vec<Breakdown>,
    pub monthly_trend: Vec<MonthlyPoint>,
    pub insights: Vec<Insight>,
    pub warnings: Vec<DataWarning>,
    pub price_quantity_correlation: Option<f64>,
    pub profit_summary: Option<ProfitSummary>,
    pub period: Option<Period>,
    pub skipped: Vec<SkippedMetric>,
}

impl AnalysisResult {
    pub fn kpi(&self, kind: KpiKind) -> Option<&Kpi> {
        self.kpis.iter().find(|k| k.kind == kind)
    }

    pub fn distribution(&self, kind: DistributionKind) -> Option<&Distribution> {
        self.distributions.iter().find(|d| d.kind == kind)
    }

    pub fn breakdown(&self, kind: BreakdownKind) -> Option<&Breakdown> {
        self.breakdowns.iter().find(|b| b.kind == kind)
    }

    pub fn warning(&self, kind: WarningKind) -> Option<&DataWarning> {
        self.warnings.iter().find(|w| w.kind == kind)
    }

    pub fn insight(&self, kind: InsightKind) -> Option<&Insight> {
        self.insights.iter().find(|i| i.kind == kind)
    }
}

/// Explicit context for one pass: processing time, output language and the
/// optional flat-margin estimate used when no profit or cost column exists.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    pub now: NaiveDateTime,
    pub language: Language,
    pub estimated_margin: Option<f64>,
    pub max_insights: Option<usize>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::at(Local::now().naive_local())
    }
}

impl AnalysisOptions {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now,
            language: Language::default(),
            estimated_margin: None,
            max_insights: None,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_estimated_margin(mut self, margin: f64) -> Self {
        self.estimated_margin = Some(margin);
        self
    }
}

/// Gathers computed items and the metrics that were skipped along the way.
pub(crate) struct Collector<T> {
    pub(crate) items: Vec<T>,
    pub(crate) skipped: Vec<SkippedMetric>,
}

impl<T> Collector<T> {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, metric: &str, result: Result<T, MetricError>) {
        match result {
            Ok(item) => self.items.push(item),
            Err(reason) => self.skip(metric, reason),
        }
    }

    pub(crate) fn record_optional(&mut self, metric: &str, result: Result<Option<T>, MetricError>) {
        match result {
            Ok(Some(item)) => self.items.push(item),
            Ok(None) => {}
            Err(reason) => self.skip(metric, reason),
        }
    }

    pub(crate) fn skip(&mut self, metric: &str, reason: MetricError) {
        debug!("Skipping {metric}: {reason}");
        self.skipped.push(SkippedMetric {
            metric: metric.to_string(),
            reason,
        });
    }
}

pub struct SalesAnalyzer {
    data: Dataset,
    mapping: FieldMapping,
    options: AnalysisOptions,
}

impl SalesAnalyzer {
    pub fn new(dataset: &Dataset, mapping: &FieldMapping, options: AnalysisOptions) -> Self {
        let mut data = dataset.clone();
        normalize_numeric_fields(&mut data, mapping);
        Self {
            data,
            mapping: mapping.clone(),
            options,
        }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn row_count(&self) -> usize {
        self.data.row_count()
    }

    pub(crate) fn dataset(&self) -> &Dataset {
        &self.data
    }

    /// The analyzer's private copy with mapped numeric fields coerced.
    pub fn normalized_dataset(&self) -> &Dataset {
        &self.data
    }

    pub(crate) fn column(&self, field: SemanticField) -> Result<&Column, MetricError> {
        let name = self
            .mapping
            .get(field)
            .ok_or(MetricError::FieldNotMapped(field))?;
        self.data
            .column(name)
            .ok_or_else(|| MetricError::ColumnMissing {
                field,
                column: name.to_string(),
            })
    }

    pub(crate) fn numbers(&self, field: SemanticField) -> Result<Vec<Option<f64>>, MetricError> {
        Ok(self.column(field)?.numeric_values())
    }

    /// Sum of the coerced values; at least one value must coerce.
    pub(crate) fn sum(&self, field: SemanticField) -> Result<f64, MetricError> {
        let column = self.column(field)?;
        let values = column.numeric_values();
        let mut present = values.iter().flatten().peekable();
        if present.peek().is_none() {
            return Err(MetricError::NoNumericValues(column.name.clone()));
        }
        Ok(present.sum())
    }

    pub(crate) fn mean(&self, field: SemanticField) -> Result<f64, MetricError> {
        let column = self.column(field)?;
        let present = column.numeric_values().into_iter().flatten().collect::<Vec<_>>();
        if present.is_empty() {
            return Err(MetricError::NoNumericValues(column.name.clone()));
        }
        Ok(present.iter().sum::<f64>() / present.len() as f64)
    }

    pub(crate) fn timestamps(&self, field: SemanticField) -> Result<Vec<Option<NaiveDateTime>>, MetricError> {
        Ok(self.column(field)?.timestamps())
    }

    pub fn analyze_all(&self) -> AnalysisResult {
        let mut skipped = Vec::new();

        let kpis = kpi::compute(self);
        skipped.extend(kpis.skipped);

        let distributions = distribution::distributions(self);
        skipped.extend(distributions.skipped);

        let breakdowns = distribution::breakdowns(self);
        skipped.extend(breakdowns.skipped);

        let monthly_trend = match trend::monthly(self) {
            Ok(points) => points,
            Err(reason) => {
                let mut collector = Collector::<()>::new();
                collector.skip("monthly_trend", reason);
                skipped.extend(collector.skipped);
                Vec::new()
            }
        };

        let insights = insights::extract(self, &kpis.items);
        skipped.extend(insights.skipped);

        let warnings = quality::check(self);
        skipped.extend(warnings.skipped);

        let mut extras = Collector::<()>::new();
        let price_quantity_correlation = match distribution::price_quantity_correlation(self) {
            Ok(value) => Some(value),
            Err(reason) => {
                extras.skip("price_quantity_correlation", reason);
                None
            }
        };
        let profit_summary = match distribution::profit_summary(self) {
            Ok(summary) => Some(summary),
            Err(reason) => {
                extras.skip("profit_summary", reason);
                None
            }
        };
        let period = match trend::period(self) {
            Ok(period) => Some(period),
            Err(reason) => {
                extras.skip("period", reason);
                None
            }
        };
        skipped.extend(extras.skipped);

        let mut insights = insights.items;
        if let Some(limit) = self.options.max_insights {
            insights.truncate(limit);
        }

        let result = AnalysisResult {
            row_count: self.row_count(),
            kpis: kpis.items,
            distributions: distributions.items,
            breakdowns: breakdowns.items,
            monthly_trend,
            insights,
            warnings: warnings.items,
            price_quantity_correlation,
            profit_summary,
            period,
            skipped,
        };
        info!(
            "Analyzed {} row(s): {} KPI(s), {} insight(s), {} warning(s), {} skipped metric(s)",
            result.row_count,
            result.kpis.len(),
            result.insights.len(),
            result.warnings.len(),
            result.skipped.len()
        );
        result
    }
}

fn normalize_numeric_fields(data: &mut Dataset, mapping: &FieldMapping) {
    for (field, name) in mapping.iter().filter(|(field, _)| field.is_numeric()) {
        let Some(column) = data.column(name) else {
            continue;
        };
        let cells = column
            .numeric_values()
            .into_iter()
            .map(|value| value.map(canonical_number))
            .collect::<Vec<_>>();
        let canonical = cells
            .iter()
            .enumerate()
            .all(|(row, cell)| cell.as_deref() == column.get(row));
        if canonical && column.datatype.is_numeric() {
            continue;
        }
        debug!("Coerced column '{name}' mapped to {field} to numbers");
        data.replace_cells(name, cells, ColumnType::Float);
    }
}

/// Analyzes `dataset` with the default options (current local time, English).
pub fn analyze(dataset: &Dataset, mapping: &FieldMapping) -> AnalysisResult {
    analyze_with(dataset, mapping, &AnalysisOptions::default())
}

pub fn analyze_with(
    dataset: &Dataset,
    mapping: &FieldMapping,
    options: &AnalysisOptions,
) -> AnalysisResult {
    SalesAnalyzer::new(dataset, mapping, options.clone()).analyze_all()
}
