//! Semantic field vocabulary, the typed field mapping, and header auto-detection.
//!
//! [`ColumnMapper`] walks the headers of a [`Dataset`] in order and proposes a
//! column for each [`SemanticField`]. Every field owns two recognition aids:
//! case-insensitive regular expressions (English and Arabic spellings) and a
//! list of bare keywords tried as substrings when no pattern matched. The first
//! header that satisfies a field claims it for good; a single header may
//! satisfy several unrelated fields. Columns nothing else claimed are sampled
//! for dates and, if `order_date` is still open, assigned to it.

use std::{fmt, str::FromStr, sync::OnceLock};

use anyhow::{Result, anyhow};
use heck::ToSnakeCase;
use log::{debug, info, warn};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::{
    data::parse_timestamp,
    dataset::{Column, Dataset},
    schema::{ColumnKind, classify_column},
};

/// Number of non-missing cells sampled when sniffing a column for dates.
pub const DATE_SAMPLE_SIZE: usize = 10;
/// Minimum share of sampled cells that must parse for a column to count as a date.
pub const DATE_SUCCESS_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticField {
    OrderId,
    CustomerId,
    CustomerName,
    ProductId,
    ProductName,
    Category,
    Quantity,
    Price,
    TotalAmount,
    OrderDate,
    Region,
    City,
    Country,
    Salesperson,
    PaymentMethod,
    Discount,
    Profit,
    Cost,
    Status,
}

impl SemanticField {
    pub const ALL: [SemanticField; 19] = [
        SemanticField::OrderId,
        SemanticField::CustomerId,
        SemanticField::CustomerName,
        SemanticField::ProductId,
        SemanticField::ProductName,
        SemanticField::Category,
        SemanticField::Quantity,
        SemanticField::Price,
        SemanticField::TotalAmount,
        SemanticField::OrderDate,
        SemanticField::Region,
        SemanticField::City,
        SemanticField::Country,
        SemanticField::Salesperson,
        SemanticField::PaymentMethod,
        SemanticField::Discount,
        SemanticField::Profit,
        SemanticField::Cost,
        SemanticField::Status,
    ];

    /// The snake_case key used in settings files and on the command line.
    pub fn key(&self) -> String {
        format!("{self:?}").to_snake_case()
    }

    /// Fields whose columns are coerced to numbers before analysis.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticField::Quantity
                | SemanticField::Price
                | SemanticField::TotalAmount
                | SemanticField::Discount
                | SemanticField::Profit
                | SemanticField::Cost
        )
    }
}

impl fmt::Display for SemanticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for SemanticField {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let key = value.trim().to_snake_case();
        let key = match key.as_str() {
            "unit_price" | "unit_cost" => "price",
            "amount" | "sales" | "revenue" => "total_amount",
            "date" => "order_date",
            other => other,
        };
        SemanticField::ALL
            .into_iter()
            .find(|field| field.key() == key)
            .ok_or_else(|| anyhow!("Unknown field '{value}'"))
    }
}

/// Correspondence between semantic fields and column names of one dataset.
///
/// An absent field is `None`; a present field names the column chosen for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "unit_price")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salesperson: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl FieldMapping {
    fn slot(&self, field: SemanticField) -> &Option<String> {
        match field {
            SemanticField::OrderId => &self.order_id,
            SemanticField::CustomerId => &self.customer_id,
            SemanticField::CustomerName => &self.customer_name,
            SemanticField::ProductId => &self.product_id,
            SemanticField::ProductName => &self.product_name,
            SemanticField::Category => &self.category,
            SemanticField::Quantity => &self.quantity,
            SemanticField::Price => &self.price,
            SemanticField::TotalAmount => &self.total_amount,
            SemanticField::OrderDate => &self.order_date,
            SemanticField::Region => &self.region,
            SemanticField::City => &self.city,
            SemanticField::Country => &self.country,
            SemanticField::Salesperson => &self.salesperson,
            SemanticField::PaymentMethod => &self.payment_method,
            SemanticField::Discount => &self.discount,
            SemanticField::Profit => &self.profit,
            SemanticField::Cost => &self.cost,
            SemanticField::Status => &self.status,
        }
    }

    fn slot_mut(&mut self, field: SemanticField) -> &mut Option<String> {
        match field {
            SemanticField::OrderId => &mut self.order_id,
            SemanticField::CustomerId => &mut self.customer_id,
            SemanticField::CustomerName => &mut self.customer_name,
            SemanticField::ProductId => &mut self.product_id,
            SemanticField::ProductName => &mut self.product_name,
            SemanticField::Category => &mut self.category,
            SemanticField::Quantity => &mut self.quantity,
            SemanticField::Price => &mut self.price,
            SemanticField::TotalAmount => &mut self.total_amount,
            SemanticField::OrderDate => &mut self.order_date,
            SemanticField::Region => &mut self.region,
            SemanticField::City => &mut self.city,
            SemanticField::Country => &mut self.country,
            SemanticField::Salesperson => &mut self.salesperson,
            SemanticField::PaymentMethod => &mut self.payment_method,
            SemanticField::Discount => &mut self.discount,
            SemanticField::Profit => &mut self.profit,
            SemanticField::Cost => &mut self.cost,
            SemanticField::Status => &mut self.status,
        }
    }

    pub fn get(&self, field: SemanticField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: SemanticField, column: impl Into<String>) {
        *self.slot_mut(field) = Some(column.into());
    }

    pub fn clear(&mut self, field: SemanticField) {
        *self.slot_mut(field) = None;
    }

    pub fn with(mut self, field: SemanticField, column: impl Into<String>) -> Self {
        self.set(field, column);
        self
    }

    pub fn contains(&self, field: SemanticField) -> bool {
        self.slot(field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Assigned fields in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (SemanticField, &str)> {
        SemanticField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|column| (field, column)))
    }

    pub fn claims_column(&self, column: &str) -> bool {
        self.iter().any(|(_, assigned)| assigned == column)
    }

    /// Drops entries that do not name a column of `dataset`.
    pub fn retain_existing(&self, dataset: &Dataset) -> FieldMapping {
        let mut retained = FieldMapping::default();
        for (field, column) in self.iter() {
            if dataset.has_column(column) {
                retained.set(field, column);
            } else {
                debug!("Dropping mapping {field} -> '{column}': column not present");
            }
        }
        retained
    }

    /// Applies a `field=column` assignment; an empty column clears the field.
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<()> {
        let (field, column) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Expected 'field=column', got '{assignment}'"))?;
        let field: SemanticField = field.parse()?;
        let column = column.trim();
        if column.is_empty() {
            self.clear(field);
        } else {
            self.set(field, column);
        }
        Ok(())
    }
}

struct FieldRule {
    field: SemanticField,
    patterns: Vec<Regex>,
    keywords: Vec<String>,
}

impl FieldRule {
    fn new(field: SemanticField, patterns: &[&str], keywords: &[&str]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|pattern| {
                match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(regex) => Some(regex),
                    Err(err) => {
                        warn!("Skipping invalid pattern '{pattern}' for {field}: {err}");
                        None
                    }
                }
            })
            .collect();
        let keywords = keywords.iter().map(|k| k.to_lowercase()).collect();
        Self {
            field,
            patterns,
            keywords,
        }
    }

    fn matches(&self, header_lower: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(header_lower))
            || self.keywords.iter().any(|k| header_lower.contains(k.as_str()))
    }
}

pub struct ColumnMapper {
    rules: Vec<FieldRule>,
}

impl Default for ColumnMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnMapper {
    pub fn new() -> Self {
        use SemanticField::*;
        let rules = vec![
            FieldRule::new(
                OrderId,
                &[
                    r"order.*id",
                    r"order.*no",
                    r"order.*num",
                    r"transaction.*id",
                    r"invoice.*(id|no|num)",
                    r"رقم.*الطلب",
                    r"معرف.*الطلب",
                    r"رقم.*الفاتورة",
                ],
                &["invoice", "receipt", "فاتورة"],
            ),
            FieldRule::new(
                CustomerId,
                &[
                    r"customer.*id",
                    r"client.*id",
                    r"cust.*id",
                    r"customer.*(no|num|code)",
                    r"رقم.*العميل",
                    r"معرف.*العميل",
                    r"كود.*العميل",
                ],
                &["cust_no", "client_no", "account_id"],
            ),
            FieldRule::new(
                CustomerName,
                &[
                    r"customer.*name",
                    r"client.*name",
                    r"^customer$",
                    r"^client$",
                    r"اسم.*العميل",
                    r"^العميل$",
                    r"^الزبون$",
                ],
                &["buyer", "purchaser", "مشتري"],
            ),
            FieldRule::new(
                ProductId,
                &[
                    r"product.*id",
                    r"item.*id",
                    r"sku",
                    r"product.*code",
                    r"item.*code",
                    r"barcode",
                    r"رقم.*المنتج",
                    r"معرف.*المنتج",
                    r"كود.*المنتج",
                ],
                &["upc", "gtin", "باركود"],
            ),
            FieldRule::new(
                ProductName,
                &[
                    r"product.*name",
                    r"item.*name",
                    r"^product$",
                    r"^item$",
                    r"اسم.*المنتج",
                    r"^المنتج$",
                    r"^الصنف$",
                ],
                &["goods", "merchandise", "سلعة", "بضاعة"],
            ),
            FieldRule::new(
                Category,
                &[
                    r"category",
                    r"product.*type",
                    r"^type$",
                    r"segment",
                    r"فئة",
                    r"تصنيف",
                ],
                &["class", "genre", "قسم"],
            ),
            FieldRule::new(
                Quantity,
                &[r"quantity", r"qty", r"units", r"كمية", r"الكمية", r"^عدد"],
                &["pieces", "pcs", "volume", "عدد"],
            ),
            FieldRule::new(
                Price,
                &[r"unit.*price", r"price", r"سعر", r"السعر"],
                &["msrp", "tariff", "ثمن"],
            ),
            FieldRule::new(
                TotalAmount,
                &[
                    r"total",
                    r"amount",
                    r"revenue",
                    r"^sales$",
                    r"المبلغ",
                    r"الإجمالي",
                    r"الإيراد",
                    r"المبيعات",
                ],
                &["turnover", "value", "إجمالي", "مبلغ"],
            ),
            FieldRule::new(
                OrderDate,
                &[
                    r"order.*date",
                    r"transaction.*date",
                    r"date",
                    r"تاريخ.*الطلب",
                    r"التاريخ",
                    r"تاريخ",
                ],
                &["timestamp", "period", "يوم"],
            ),
            FieldRule::new(
                Region,
                &[
                    r"region",
                    r"area",
                    r"zone",
                    r"territory",
                    r"منطقة",
                    r"المنطقة",
                    r"الفرع",
                ],
                &["branch", "district", "إقليم"],
            ),
            FieldRule::new(
                City,
                &[r"city", r"town", r"مدينة", r"المدينة"],
                &["municipality", "locality", "بلدة"],
            ),
            FieldRule::new(
                Country,
                &[r"country", r"nation", r"البلد", r"الدولة"],
                &["province", "دولة", "بلد"],
            ),
            FieldRule::new(
                Salesperson,
                &[
                    r"sales.*person",
                    r"sales.*rep",
                    r"seller",
                    r"agent",
                    r"مندوب",
                    r"البائع",
                    r"الموظف",
                ],
                &["employee", "staff", "بائع"],
            ),
            FieldRule::new(
                PaymentMethod,
                &[
                    r"payment.*method",
                    r"payment.*type",
                    r"payment.*mode",
                    r"طريقة.*الدفع",
                    r"نوع.*الدفع",
                ],
                &["payment", "tender", "دفع"],
            ),
            FieldRule::new(
                Discount,
                &[r"discount", r"rebate", r"خصم", r"التخفيض"],
                &["promo", "تخفيض"],
            ),
            FieldRule::new(
                Profit,
                &[r"profit", r"margin", r"ربح", r"الربح", r"هامش"],
                &["earnings", "gain", "أرباح"],
            ),
            FieldRule::new(
                Cost,
                &[r"cost", r"cogs", r"تكلفة", r"التكلفة"],
                &["expense", "كلفة"],
            ),
            FieldRule::new(
                Status,
                &[r"status", r"condition", r"حالة", r"الحالة"],
                &["state", "stage"],
            ),
        ];
        Self { rules }
    }

    /// Proposes a mapping for `dataset`. Never fails; unmatched fields stay `None`.
    pub fn detect(&self, dataset: &Dataset) -> FieldMapping {
        let mut mapping = FieldMapping::default();
        for column in dataset.columns() {
            let header_lower = normalize_header(&column.name);
            for rule in &self.rules {
                if mapping.contains(rule.field) {
                    continue;
                }
                if rule.matches(&header_lower) {
                    debug!("Header '{}' matched {}", column.name, rule.field);
                    mapping.set(rule.field, column.name.clone());
                }
            }

            if !mapping.contains(SemanticField::OrderDate)
                && !mapping.claims_column(&column.name)
                && is_date_column(column)
            {
                debug!("Header '{}' sampled as a date column", column.name);
                mapping.set(SemanticField::OrderDate, column.name.clone());
            }
        }
        info!(
            "Detected {} of {} field(s) across {} column(s)",
            mapping.iter().count(),
            SemanticField::ALL.len(),
            dataset.column_count()
        );
        mapping
    }
}

/// Lower-cases a header and strips leading and trailing punctuation, so
/// `Sales:` and `Product #` match like `sales` and `product`.
fn normalize_header(header: &str) -> String {
    header
        .to_lowercase()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

/// Shared mapper; the pattern table is compiled once per process.
pub fn default_mapper() -> &'static ColumnMapper {
    static MAPPER: OnceLock<ColumnMapper> = OnceLock::new();
    MAPPER.get_or_init(ColumnMapper::new)
}

/// Samples up to [`DATE_SAMPLE_SIZE`] non-missing cells and reports whether the column holds dates.
pub fn is_date_column(column: &Column) -> bool {
    let sample = column
        .present_values()
        .take(DATE_SAMPLE_SIZE)
        .collect::<Vec<_>>();
    if sample.is_empty() {
        return false;
    }
    if column.datatype.is_temporal() {
        return true;
    }
    let parsed = sample
        .iter()
        .filter(|value| parse_timestamp(value).is_some())
        .count();
    parsed as f64 / sample.len() as f64 >= DATE_SUCCESS_RATIO
}

/// Classifies every column as numeric, date, categorical or text, in header order.
pub fn suggest_column_kinds(dataset: &Dataset) -> Vec<(String, ColumnKind)> {
    dataset
        .columns()
        .iter()
        .map(|column| (column.name.clone(), classify_column(column)))
        .collect()
}
