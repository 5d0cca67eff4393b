//! Column schema detection and cell value parsing.
//!
//! Source exports name their columns inconsistently ("Sales Rep",
//! "sales_rep", trailing whitespace) and mix formatted values ("$1,200.50")
//! with bare numbers. This module maps raw headers onto semantic fields and
//! parses individual cells leniently: an unparseable cell becomes an absent
//! value, never a load failure.

use chrono::NaiveDate;
use sales_core::models::{Field, Record};
use tracing::debug;

// ── SchemaMap ─────────────────────────────────────────────────────────────────

/// Positional mapping from source columns to semantic fields.
///
/// A column that matches no known field maps to `None` and is carried through
/// to the dataset headers untouched. When two columns match the same field the
/// first wins.
#[derive(Debug, Clone)]
pub struct SchemaMap {
    columns: Vec<Option<Field>>,
}

impl SchemaMap {
    /// Detect the schema from a header row.
    pub fn detect(headers: &[String]) -> Self {
        let mut seen: Vec<Field> = Vec::new();
        let columns = headers
            .iter()
            .map(|h| match Field::match_header(h) {
                Some(field) if !seen.contains(&field) => {
                    seen.push(field);
                    Some(field)
                }
                Some(field) => {
                    debug!("duplicate column for {:?}: {:?}", field, h);
                    None
                }
                None => None,
            })
            .collect();
        SchemaMap { columns }
    }

    /// The semantic field mapped to column `index`, if any.
    pub fn field_at(&self, index: usize) -> Option<Field> {
        self.columns.get(index).copied().flatten()
    }

    /// `true` when at least one column maps to a semantic field.
    pub fn has_known_columns(&self) -> bool {
        self.columns.iter().any(Option::is_some)
    }

    /// Build a [`Record`] from one row of raw string cells.
    ///
    /// Cells that fail to parse for their field type are logged at debug level
    /// and left absent. Rows shorter than the header are padded with absent
    /// values; extra trailing cells are ignored.
    pub fn record_from_strings(&self, cells: &[String]) -> Record {
        let mut record = Record::default();
        for (index, cell) in cells.iter().enumerate() {
            let Some(field) = self.field_at(index) else {
                continue;
            };
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            match field {
                Field::Date => match parse_date(cell) {
                    Some(d) => record.date = Some(d),
                    None => debug!("unparseable date cell: {:?}", cell),
                },
                Field::Revenue => match parse_decimal(cell) {
                    Some(v) if v >= 0.0 => record.revenue = Some(v),
                    Some(_) => debug!("negative revenue dropped: {:?}", cell),
                    None => debug!("unparseable revenue cell: {:?}", cell),
                },
                Field::Conversions => match parse_count(cell) {
                    Some(n) => record.conversions = Some(n),
                    None => debug!("unparseable conversions cell: {:?}", cell),
                },
                Field::AverageOrderSize => match parse_decimal(cell) {
                    Some(v) if v >= 0.0 => record.average_order_size = Some(v),
                    _ => debug!("unparseable average order size cell: {:?}", cell),
                },
                Field::Channel => record.channel = Some(cell.to_string()),
                Field::SalesRep => record.sales_rep = Some(cell.to_string()),
                Field::CustomerType => record.customer_type = Some(cell.to_string()),
                Field::TimeOfDay => record.time_of_day = Some(cell.to_string()),
                Field::Business => record.business = Some(cell.to_string()),
            }
        }
        record
    }
}

// ── Cell parsers ──────────────────────────────────────────────────────────────

/// Parse a decimal cell, tolerating currency symbols and thousands separators.
pub fn parse_decimal(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    let value: f64 = cleaned.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a non-negative integer count. Accepts decimal renderings that Excel
/// produces for integer cells ("3.0").
pub fn parse_count(cell: &str) -> Option<u64> {
    if let Ok(n) = cell.parse::<u64>() {
        return Some(n);
    }
    let value = parse_decimal(cell)?;
    if value >= 0.0 && value.fract() == 0.0 {
        Some(value as u64)
    } else {
        None
    }
}

/// Formats accepted for date cells, tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y"];

/// Formats accepted for datetime cells whose time portion is discarded.
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a date cell against the accepted formats.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(cell, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(cell, fmt) {
            return Some(dt.date());
        }
    }
    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
