//! Declared column types and the UI column-kind classification.
//!
//! A [`ColumnType`] is inferred once when a table is loaded, by sampling its
//! non-missing cells the same way for every column. [`ColumnKind`] is the
//! coarser hint surfaced next to the mapping form: `numeric`, `date`,
//! `categorical` or `text`.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    data::{coerce_numeric, parse_naive_date, parse_naive_datetime},
    dataset::Column,
};

/// Ratio of distinct to non-missing values at or below which a column counts as categorical.
pub const CATEGORICAL_MAX_UNIQUE_RATIO: f64 = 0.3;
/// Categorical columns must also have fewer distinct values than this.
pub const CATEGORICAL_MAX_DISTINCT: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::DateTime)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Date,
    Categorical,
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Date => "date",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Text => "text",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Default)]
struct TypeCandidate {
    non_empty: usize,
    boolean_matches: usize,
    integer_matches: usize,
    float_matches: usize,
    date_matches: usize,
    datetime_matches: usize,
}

impl TypeCandidate {
    fn update(&mut self, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        self.non_empty += 1;

        let lowered = trimmed.to_ascii_lowercase();
        if matches!(lowered.as_str(), "true" | "false" | "yes" | "no") {
            self.boolean_matches += 1;
            return;
        }
        if trimmed.parse::<i64>().is_ok() {
            self.integer_matches += 1;
            self.float_matches += 1;
            return;
        }
        if coerce_numeric(trimmed).is_some() {
            self.float_matches += 1;
            return;
        }
        if parse_naive_date(trimmed).is_ok() {
            self.date_matches += 1;
        } else if parse_naive_datetime(trimmed).is_ok() {
            self.datetime_matches += 1;
        }
    }

    fn decide(&self) -> ColumnType {
        if self.non_empty == 0 {
            return ColumnType::String;
        }
        if self.boolean_matches == self.non_empty {
            ColumnType::Boolean
        } else if self.integer_matches == self.non_empty {
            ColumnType::Integer
        } else if self.float_matches == self.non_empty {
            ColumnType::Float
        } else if self.date_matches == self.non_empty {
            ColumnType::Date
        } else if self.date_matches + self.datetime_matches == self.non_empty {
            ColumnType::DateTime
        } else {
            ColumnType::String
        }
    }
}

/// Infers a declared type from every non-missing cell of a column.
pub fn infer_column_type<'a, I>(cells: I) -> ColumnType
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut candidate = TypeCandidate::default();
    for cell in cells.into_iter().flatten() {
        candidate.update(cell);
    }
    candidate.decide()
}

pub fn classify_column(column: &Column) -> ColumnKind {
    if column.datatype.is_numeric() {
        return ColumnKind::Numeric;
    }
    if column.datatype.is_temporal() {
        return ColumnKind::Date;
    }
    if is_categorical(column) {
        ColumnKind::Categorical
    } else {
        ColumnKind::Text
    }
}

fn is_categorical(column: &Column) -> bool {
    let present = column.present_values().collect::<Vec<_>>();
    if present.is_empty() {
        return false;
    }
    let distinct = present.iter().collect::<HashSet<_>>().len();
    let ratio = distinct as f64 / present.len() as f64;
    ratio <= CATEGORICAL_MAX_UNIQUE_RATIO && distinct < CATEGORICAL_MAX_DISTINCT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(values: &[&str]) -> ColumnType {
        infer_column_type(values.iter().map(|v| Some(*v)))
    }

    #[test]
    fn infers_numeric_and_temporal_types() {
        assert_eq!(infer(&["1", "2", "30"]), ColumnType::Integer);
        assert_eq!(infer(&["1", "2.5", "$3"]), ColumnType::Float);
        assert_eq!(infer(&["2024-01-01", "2024-02-03"]), ColumnType::Date);
        assert_eq!(
            infer(&["2024-01-01", "2024-02-03 10:00:00"]),
            ColumnType::DateTime
        );
        assert_eq!(infer(&["yes", "No"]), ColumnType::Boolean);
        assert_eq!(infer(&["East", "1"]), ColumnType::String);
    }

    #[test]
    fn empty_columns_default_to_string() {
        assert_eq!(infer_column_type(vec![None, None]), ColumnType::String);
    }
}
