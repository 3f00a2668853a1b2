//! In-memory sales table.
//!
//! A [`Dataset`] is an ordered list of named [`Column`]s holding optional text
//! cells plus the column's declared [`ColumnType`]. It is loaded once and then
//! only read; the analyzer clones it when it needs to normalize values.

use std::{
    collections::{HashMap, HashSet},
    io::Write,
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    data::{coerce_numeric, normalize_cell, parse_timestamp},
    io_utils,
    schema::{ColumnType, infer_column_type},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub datatype: ColumnType,
    cells: Vec<Option<String>>,
}

impl Column {
    /// Builds a column from already-normalized cells and infers its declared type.
    pub fn new(name: impl Into<String>, cells: Vec<Option<String>>) -> Self {
        let datatype = infer_column_type(cells.iter().map(|c| c.as_deref()));
        Self {
            name: name.into(),
            datatype,
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.cells.get(row).and_then(|cell| cell.as_deref())
    }

    pub fn cells(&self) -> impl Iterator<Item = Option<&str>> {
        self.cells.iter().map(|cell| cell.as_deref())
    }

    pub fn present_values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().filter_map(|cell| cell.as_deref())
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    pub fn distinct_count(&self) -> usize {
        self.present_values().collect::<HashSet<_>>().len()
    }

    /// Coerces every cell to a number; unparseable cells become `None`.
    pub fn numeric_values(&self) -> Vec<Option<f64>> {
        self.cells
            .iter()
            .map(|cell| cell.as_deref().and_then(coerce_numeric))
            .collect()
    }

    /// Parses every cell as a date or datetime; unparseable cells become `None`.
    pub fn timestamps(&self) -> Vec<Option<NaiveDateTime>> {
        self.cells
            .iter()
            .map(|cell| cell.as_deref().and_then(parse_timestamp))
            .collect()
    }

    fn resize(&mut self, rows: usize) {
        self.cells.resize(rows, None);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Builds a dataset from columns; shorter columns are padded with missing cells.
    pub fn from_columns(mut columns: Vec<Column>) -> Self {
        let rows = columns.iter().map(Column::len).max().unwrap_or(0);
        for column in &mut columns {
            column.resize(rows);
        }
        Self { columns, rows }
    }

    /// Builds a dataset from a header row and raw text rows.
    ///
    /// Ragged rows are tolerated: missing trailing cells are treated as missing
    /// values and surplus cells are dropped.
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: AsRef<str>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let names = unique_headers(headers);
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
        for row in rows {
            let mut row = row.into_iter();
            for column in cells.iter_mut() {
                let cell = row.next().and_then(|raw| normalize_cell(raw.as_ref()));
                column.push(cell);
            }
        }
        let columns = names
            .into_iter()
            .zip(cells)
            .map(|(name, cells)| Column::new(name, cells))
            .collect();
        Self::from_columns(columns)
    }

    pub fn from_csv_text(text: &str, delimiter: u8) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader(text.as_bytes(), delimiter);
        let headers = reader
            .headers()
            .context("Reading header row")?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();
        let mut rows = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
            rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        }
        Ok(Self::from_rows(headers, rows))
    }

    pub fn from_csv_path(
        path: &Path,
        delimiter: u8,
        encoding: Option<&'static Encoding>,
    ) -> Result<Self> {
        let bytes = io_utils::read_input_bytes(path)?;
        let text = io_utils::decode_input(&bytes, encoding)
            .with_context(|| format!("Decoding {path:?}"))?;
        let dataset = Self::from_csv_text(&text, delimiter)
            .with_context(|| format!("Parsing CSV from {path:?}"))?;
        info!(
            "Loaded {} row(s) across {} column(s) from {:?}",
            dataset.row_count(),
            dataset.column_count(),
            path
        );
        Ok(dataset)
    }

    /// Stacks several tables; columns are the union of all headers in first-seen order.
    pub fn merge(tables: Vec<Dataset>) -> Result<Self> {
        if tables.is_empty() {
            return Err(anyhow!("At least one table is required to merge"));
        }
        let mut order: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for table in &tables {
            for column in &table.columns {
                if seen.insert(column.name.clone()) {
                    order.push(column.name.clone());
                }
            }
        }

        let mut merged: HashMap<&str, Vec<Option<String>>> = HashMap::new();
        for table in &tables {
            for name in &order {
                let target = merged.entry(name.as_str()).or_default();
                match table.column(name) {
                    Some(column) => target.extend(column.cells.iter().cloned()),
                    None => target.extend(std::iter::repeat_n(None, table.rows)),
                }
            }
            debug!(
                "Merged table with {} row(s) and {} column(s)",
                table.rows,
                table.columns.len()
            );
        }

        let columns = order
            .iter()
            .map(|name| Column::new(name.clone(), merged.remove(name.as_str()).unwrap_or_default()))
            .collect();
        Ok(Self::from_columns(columns))
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub(crate) fn replace_cells(&mut self, name: &str, cells: Vec<Option<String>>, datatype: ColumnType) {
        if let Some(column) = self.columns.iter_mut().find(|c| c.name == name) {
            column.cells = cells;
            column.cells.resize(self.rows, None);
            column.datatype = datatype;
        }
    }

    pub fn row(&self, index: usize) -> Vec<Option<&str>> {
        self.columns.iter().map(|c| c.get(index)).collect()
    }

    /// Number of rows equal in every column to some earlier row.
    pub fn duplicate_row_count(&self) -> usize {
        let mut seen = HashSet::with_capacity(self.rows);
        (0..self.rows).filter(|&idx| !seen.insert(self.row(idx))).count()
    }

    pub fn write_csv<W: Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        writer
            .write_record(self.column_names())
            .context("Writing output headers")?;
        for idx in 0..self.rows {
            let row = self.row(idx);
            writer
                .write_record(row.iter().map(|cell| cell.unwrap_or("")))
                .with_context(|| format!("Writing row {}", idx + 2))?;
        }
        writer.flush().context("Flushing CSV output")?;
        Ok(())
    }
}

fn unique_headers<H>(headers: H) -> Vec<String>
where
    H: IntoIterator,
    H::Item: AsRef<str>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            let trimmed = raw.as_ref().trim();
            let base = if trimmed.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                trimmed.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}
