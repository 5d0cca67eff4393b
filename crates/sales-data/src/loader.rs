//! File loading for CSV and XLSX sales exports.
//!
//! Loading is all-or-nothing at the file level and lenient at the row level:
//! an unreadable file or a missing header row fails the load, while an
//! individual malformed row is skipped with a debug log and never poisons the
//! rest of the dataset.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::{ReaderBuilder, Trim};
use tracing::{debug, warn};

use sales_core::error::{DashboardError, Result};
use sales_core::models::Dataset;

use crate::schema::SchemaMap;

// ── FileFormat ────────────────────────────────────────────────────────────────

/// Supported source file formats.
///
/// `Excel` covers both the zip-based `.xlsx` container and the legacy binary
/// `.xls`; the workbook reader sniffs which one it was actually given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
}

impl FileFormat {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Result<FileFormat> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" | "xls" => Ok(FileFormat::Excel),
            other => Err(DashboardError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Parse a user-supplied format name, e.g. the `--format` flag.
    pub fn from_name(name: &str) -> Result<FileFormat> {
        match name.to_lowercase().as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" | "xls" => Ok(FileFormat::Excel),
            other => Err(DashboardError::UnsupportedFormat(other.to_string())),
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load a dataset from a file path, inferring the format from the extension
/// unless `format` overrides it.
pub fn load_path(path: &Path, format: Option<FileFormat>) -> Result<Dataset> {
    let format = match format {
        Some(f) => f,
        None => FileFormat::from_path(path)?,
    };
    let bytes = std::fs::read(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let source_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    load_bytes(&bytes, format, source_name)
}

/// Load a dataset from an in-memory byte buffer.
pub fn load_bytes(bytes: &[u8], format: FileFormat, source_name: String) -> Result<Dataset> {
    let dataset = match format {
        FileFormat::Csv => load_csv(bytes, source_name)?,
        FileFormat::Excel => load_excel(bytes, source_name)?,
    };
    if !SchemaMap::detect(&dataset.headers).has_known_columns() {
        warn!(
            "no recognised columns in {:?}: {:?}",
            dataset.source_name, dataset.headers
        );
    }
    debug!(
        "loaded {} records from {:?}",
        dataset.records.len(),
        dataset.source_name
    );
    Ok(dataset)
}

// ── CSV ───────────────────────────────────────────────────────────────────────

fn load_csv(bytes: &[u8], source_name: String) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DashboardError::MalformedTable(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(DashboardError::MissingHeader);
    }

    let schema = SchemaMap::detect(&headers);
    let mut records = Vec::new();
    for (row_index, row) in reader.records().enumerate() {
        match row {
            Ok(row) => {
                let cells: Vec<String> = row.iter().map(str::to_string).collect();
                records.push(schema.record_from_strings(&cells));
            }
            Err(e) => {
                // 0-based data row; the header occupies line 1.
                debug!("skipping malformed row {}: {}", row_index + 2, e);
            }
        }
    }

    Ok(Dataset {
        records,
        headers,
        source_name,
    })
}

// ── Excel ─────────────────────────────────────────────────────────────────────

fn load_excel(bytes: &[u8], source_name: String) -> Result<Dataset> {
    // Sniffs the container magic, so an .xls renamed to .xlsx (or vice versa)
    // still opens with the right backend.
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| DashboardError::MalformedTable(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DashboardError::MalformedTable("workbook has no sheets".to_string()))?
        .map_err(|e| DashboardError::MalformedTable(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(DashboardError::MissingHeader)?;
    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(DashboardError::MissingHeader);
    }

    let schema = SchemaMap::detect(&headers);
    let records = rows
        .map(|row| {
            let cells: Vec<String> = row.iter().map(cell_to_string).collect();
            schema.record_from_strings(&cells)
        })
        .collect();

    Ok(Dataset {
        records,
        headers,
        source_name,
    })
}

/// Render a workbook cell to the string form the schema parsers understand.
///
/// Native date cells become ISO dates; integral floats drop the trailing
/// `.0` Excel adds to whole numbers.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(dt) => dt.date().format("%Y-%m-%d").to_string(),
            None => String::new(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => {
            debug!("error cell in sheet: {:?}", e);
            String::new()
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
