use std::collections::BTreeMap;

use chrono::Datelike;
use itertools::Itertools;
use serde::Serialize;

use super::{MetricError, Period, SalesAnalyzer};
use crate::mapping::SemanticField;

/// One calendar month of sales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub period: String,
    pub total: f64,
    pub count: usize,
    /// Change against the previous month in percent; `None` for the first
    /// month and whenever the previous month summed to zero.
    pub growth_pct: Option<f64>,
}

pub(crate) fn monthly(analyzer: &SalesAnalyzer) -> Result<Vec<MonthlyPoint>, MetricError> {
    let dates = analyzer.column(SemanticField::OrderDate)?;
    let stamps = dates.timestamps();
    let amounts = analyzer.column(SemanticField::TotalAmount)?;
    if stamps.iter().all(Option::is_none) {
        return Err(MetricError::NoDateValues(dates.name.clone()));
    }

    let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for (stamp, amount) in stamps.into_iter().zip(amounts.numeric_values()) {
        let (Some(stamp), Some(amount)) = (stamp, amount) else {
            continue;
        };
        let bucket = buckets.entry((stamp.year(), stamp.month())).or_insert((0.0, 0));
        bucket.0 += amount;
        bucket.1 += 1;
    }
    if buckets.is_empty() {
        return Err(MetricError::NoNumericValues(amounts.name.clone()));
    }

    let mut previous: Option<f64> = None;
    let points = buckets
        .into_iter()
        .map(|((year, month), (total, count))| {
            let growth_pct = previous
                .filter(|prev| *prev != 0.0)
                .map(|prev| (total - prev) / prev * 100.0);
            previous = Some(total);
            MonthlyPoint {
                period: format!("{year:04}-{month:02}"),
                total,
                count,
                growth_pct,
            }
        })
        .collect();
    Ok(points)
}

/// First and last parsed order date.
pub(crate) fn period(analyzer: &SalesAnalyzer) -> Result<Period, MetricError> {
    let dates = analyzer.column(SemanticField::OrderDate)?;
    let (start, end) = dates
        .timestamps()
        .into_iter()
        .flatten()
        .minmax()
        .into_option()
        .ok_or_else(|| MetricError::NoDateValues(dates.name.clone()))?;
    Ok(Period {
        start: start.date(),
        end: end.date(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        analysis::{AnalysisOptions, analyze_with},
        dataset::Dataset,
        mapping::{FieldMapping, SemanticField},
    };

    fn run(rows: Vec<Vec<&str>>) -> crate::analysis::AnalysisResult {
        let dataset = Dataset::from_rows(["date", "amount"], rows);
        let mapping = FieldMapping::default()
            .with(SemanticField::OrderDate, "date")
            .with(SemanticField::TotalAmount, "amount");
        let now = NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        analyze_with(&dataset, &mapping, &AnalysisOptions::at(now))
    }

    #[test]
    fn months_are_ordered_with_growth() {
        let result = run(vec![
            vec!["2024-02-10", "150"],
            vec!["2024-01-05", "100"],
            vec!["2024-01-20", "not a number"],
            vec!["garbage", "500"],
            vec!["2024-03-01", "0"],
            vec!["2024-04-01", "80"],
        ]);
        let trend = &result.monthly_trend;
        let periods = trend.iter().map(|p| p.period.as_str()).collect::<Vec<_>>();
        assert_eq!(periods, vec!["2024-01", "2024-02", "2024-03", "2024-04"]);
        assert_eq!(trend[0].count, 1);
        assert_eq!(trend[0].growth_pct, None);
        assert_eq!(trend[1].growth_pct, Some(50.0));
        assert_eq!(trend[2].growth_pct, Some(-100.0));
        assert_eq!(trend[3].growth_pct, None);

        let period = result.period.unwrap();
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(period.end, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
    }

    #[test]
    fn unparseable_dates_skip_the_trend() {
        let result = run(vec![vec!["soon", "10"], vec!["later", "20"]]);
        assert!(result.monthly_trend.is_empty());
        assert!(result.period.is_none());
        assert!(result.skipped.iter().any(|s| s.metric == "monthly_trend"));
    }
}
