mod common;

use common::as_of;
use proptest::prelude::*;
use sales_insights::{
    AnalysisOptions, Dataset, SemanticField, analysis::KpiKind, analyze_with, detect_mapping,
};

const HEADERS: [&str; 8] = [
    "order id",
    "customer id",
    "order date",
    "region",
    "quantity",
    "unit price",
    "total amount",
    "discount",
];

fn options() -> AnalysisOptions {
    AnalysisOptions::at(as_of(2024, 6, 30))
}

fn sales_row() -> impl Strategy<Value = Vec<String>> {
    (
        1u32..10_000,
        prop::sample::select(vec!["C1", "C2", "C3", ""]),
        (2023i32..2026, 1u32..13, 1u32..29),
        prop::sample::select(vec!["East", "West", "North", "N/A"]),
        -5i64..50,
        -100_000i64..1_000_000,
    )
        .prop_map(|(id, customer, (y, m, d), region, qty, cents)| {
            vec![
                id.to_string(),
                customer.to_string(),
                format!("{y:04}-{m:02}-{d:02}"),
                region.to_string(),
                qty.to_string(),
                "2.50".to_string(),
                format!("{:.2}", cents as f64 / 100.0),
                "0".to_string(),
            ]
        })
}

fn mixed_case(header: &str, mask: &[bool]) -> String {
    header
        .chars()
        .zip(mask.iter().cycle())
        .map(|(ch, upper)| if *upper { ch.to_ascii_uppercase() } else { ch })
        .collect()
}

proptest! {
    #[test]
    fn arbitrary_cells_never_abort_the_pass(
        rows in prop::collection::vec(prop::collection::vec("\\PC{0,12}", 8), 0..40)
    ) {
        let dataset = Dataset::from_rows(HEADERS, rows.clone());
        let mapping = detect_mapping(&dataset);
        let result = analyze_with(&dataset, &mapping, &options());
        prop_assert_eq!(result.row_count, rows.len());
        let transactions = result.kpi(KpiKind::TotalTransactions).map(|k| k.value);
        prop_assert_eq!(transactions, Some(rows.len() as f64));
    }

    #[test]
    fn repeated_analysis_gives_identical_results(
        rows in prop::collection::vec(sales_row(), 0..60)
    ) {
        let dataset = Dataset::from_rows(HEADERS, rows);
        let mapping = detect_mapping(&dataset);
        let first = analyze_with(&dataset, &mapping, &options());
        let second = analyze_with(&dataset, &mapping, &options());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn average_transaction_is_total_over_rows(
        rows in prop::collection::vec(sales_row(), 1..60)
    ) {
        let dataset = Dataset::from_rows(HEADERS, rows);
        let result = analyze_with(&dataset, &detect_mapping(&dataset), &options());
        let total = result.kpi(KpiKind::TotalSales).map(|k| k.value).unwrap_or_default();
        let avg = result.kpi(KpiKind::AvgTransaction).map(|k| k.value).unwrap_or_default();
        prop_assert!((avg - total / result.row_count as f64).abs() < 1e-6);
    }

    #[test]
    fn header_case_does_not_change_detection(
        mask in prop::collection::vec(any::<bool>(), 1..16)
    ) {
        let lower = Dataset::from_rows(HEADERS, Vec::<Vec<&str>>::new());
        let shouted = Dataset::from_rows(
            HEADERS.iter().map(|h| mixed_case(h, &mask)),
            Vec::<Vec<&str>>::new(),
        );
        let fields = |dataset: &Dataset| {
            detect_mapping(dataset)
                .iter()
                .map(|(field, column)| (field, column.to_lowercase()))
                .collect::<Vec<(SemanticField, String)>>()
        };
        prop_assert_eq!(fields(&lower), fields(&shouted));
    }
}
