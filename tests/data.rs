use chrono::NaiveDateTime;
use sales_insights::data::{coerce_numeric, normalize_cell, parse_naive_datetime};
use sales_insights::schema::{ColumnType, infer_column_type};

#[test]
fn parse_naive_datetime_supports_multiple_formats() {
    let expected = NaiveDateTime::parse_from_str("2024-05-06 14:30:00", "%Y-%m-%d %H:%M:%S")
        .unwrap();
    assert_eq!(parse_naive_datetime("2024-05-06T14:30:00").unwrap(), expected);
    assert_eq!(parse_naive_datetime("05/06/2024 14:30:00").unwrap(), expected);
    assert_eq!(parse_naive_datetime("2024-05-06 14:30").unwrap(), expected);
}

#[test]
fn numeric_coercion_handles_exported_amounts() {
    assert_eq!(coerce_numeric("$1,234.50"), Some(1234.5));
    assert_eq!(coerce_numeric("(75.25)"), Some(-75.25));
    assert_eq!(coerce_numeric("-$20"), Some(-20.0));
    assert_eq!(coerce_numeric("1,23"), None);
    assert_eq!(coerce_numeric("twelve"), None);
}

#[test]
fn placeholders_become_missing_cells() {
    for token in ["", "   ", "NA", "n/a", "NULL", "#N/A", "--"] {
        assert_eq!(normalize_cell(token), None, "{token:?}");
    }
    assert_eq!(normalize_cell("0"), Some("0".to_string()));
}

#[test]
fn column_types_follow_the_values() {
    assert_eq!(
        infer_column_type([Some("1"), None, Some("3")]),
        ColumnType::Integer
    );
    assert_eq!(infer_column_type([Some("1.5"), Some("$2")]), ColumnType::Float);
    assert_eq!(
        infer_column_type([Some("2024-01-01"), Some("2024-02-01")]),
        ColumnType::Date
    );
    assert_eq!(
        infer_column_type([Some("2024-01-01"), Some("2024-02-01 10:00:00")]),
        ColumnType::DateTime
    );
    assert_eq!(infer_column_type([Some("East"), Some("2")]), ColumnType::String);
    assert_eq!(infer_column_type([None, None]), ColumnType::String);
}
