//! # caltrack-core
//!
//! Core data model and status pipeline for the caltrack calibration tracker.
//!
//! This crate provides:
//! - Domain types: `CellValue`, `Row`, `Table`, `SheetCollection`
//! - Date classification and the tri-state calibration `Status`
//! - The filter → sort → renumber pipeline producing a disposable `View`
//! - `Session`, the single owner of a loaded workbook and its edit entry point
//! - The `WorkbookCodec` trait implemented by spreadsheet backends
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use caltrack_core::{CellValue, PeriodFilter, Session, Settings, SheetCollection, Status, Table};
//!
//! let mut table = Table::new(vec![
//!     "EQUIPMENT_NAME".into(),
//!     "PLAN_DATE".into(),
//!     "EXPECTED_DATE".into(),
//!     "REALIZATION_DATE".into(),
//! ]);
//! table.push_row(vec![
//!     CellValue::text("Oven thermometer"),
//!     CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
//!     CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()),
//!     CellValue::Empty,
//! ]);
//!
//! let mut sheets = SheetCollection::new();
//! sheets.insert("BAKING", table);
//!
//! let session = Session::new(sheets, Settings::default());
//! let view = session.view("BAKING", &PeriodFilter::all()).unwrap();
//! assert_eq!(view.rows[0].no, 1);
//! assert_eq!(view.rows[0].status, Status::Pending);
//! ```

pub mod classify;
pub mod config;
pub mod filter;
pub mod session;
pub mod status;
pub mod view;

pub use classify::{classify, month_year_of, parse_date, MonthYear};
pub use config::{ColumnBindings, Grouping, Settings};
pub use filter::{available_periods, filter, PeriodFilter, PeriodOptions};
pub use session::Session;
pub use status::{Status, StatusSummary};
pub use view::{GroupSummary, View, ViewRow};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// Cells
// ============================================================================

/// A single spreadsheet cell value.
///
/// Columns are not typed; any cell may hold any variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

static EMPTY: CellValue = CellValue::Empty;

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// True for empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{s}"),
            // Whole numbers print without a trailing ".0"
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Bool(true) => write!(f, "TRUE"),
            CellValue::Bool(false) => write!(f, "FALSE"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

// ============================================================================
// Rows and Tables
// ============================================================================

/// Immutable identity of a row, assigned when the row enters its table.
///
/// Unlike the display `NO`, the origin index never changes when the table is
/// filtered or sorted, so it is the only key used to correlate edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OriginIndex(usize);

impl OriginIndex {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for OriginIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One spreadsheet row: column name to value
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    origin: OriginIndex,
    cells: HashMap<String, CellValue>,
}

impl Row {
    pub fn origin(&self) -> OriginIndex {
        self.origin
    }

    /// Value of `column`, `Empty` when the column is missing
    pub fn get(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY)
    }

    fn set(&mut self, column: &str, value: CellValue) {
        self.cells.insert(column.to_string(), value);
    }
}

/// An ordered table of rows with an ordered header
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row whose values line up with `columns`.
    ///
    /// Missing trailing values read as `Empty`; surplus values are ignored.
    pub fn push_row(&mut self, values: Vec<CellValue>) -> OriginIndex {
        let origin = OriginIndex(self.rows.len());
        let cells = self
            .columns
            .iter()
            .cloned()
            .zip(values)
            .filter(|(_, value)| *value != CellValue::Empty)
            .collect();
        self.rows.push(Row { origin, cells });
        origin
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Look up a row by origin index
    pub fn row(&self, origin: OriginIndex) -> Option<&Row> {
        self.rows
            .binary_search_by_key(&origin, |r| r.origin)
            .ok()
            .map(|i| &self.rows[i])
    }

    fn row_mut(&mut self, origin: OriginIndex) -> Option<&mut Row> {
        // Rows are only ever appended, so they stay ordered by origin
        let i = self.rows.binary_search_by_key(&origin, |r| r.origin).ok()?;
        Some(&mut self.rows[i])
    }

    fn ensure_column(&mut self, name: &str) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
    }
}

// ============================================================================
// Sheet Collection
// ============================================================================

/// Named tables in workbook order, one per equipment category
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SheetCollection {
    sheets: Vec<(String, Table)>,
}

impl SheetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, replacing any sheet with the same name in place
    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        let name = name.into();
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = table,
            None => self.sheets.push((name, table)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(n, t)| (n.as_str(), t))
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Record `date` in `column` of the row identified by `origin`.
    ///
    /// Exactly one row changes on success; nothing changes on error. The
    /// column is appended to the header if the sheet did not have it yet.
    pub fn set_realization_date(
        &mut self,
        sheet: &str,
        origin: OriginIndex,
        column: &str,
        date: NaiveDate,
    ) -> Result<(), UpdateError> {
        let table = self
            .sheets
            .iter_mut()
            .find(|(n, _)| n == sheet)
            .map(|(_, t)| t)
            .ok_or_else(|| UpdateError::SheetNotFound(sheet.to_string()))?;

        if table.row(origin).is_none() {
            return Err(UpdateError::RowNotFound {
                sheet: sheet.to_string(),
                origin,
            });
        }

        table.ensure_column(column);
        if let Some(row) = table.row_mut(origin) {
            row.set(column, CellValue::Date(date));
        }
        Ok(())
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Spreadsheet backend: turns workbook bytes into sheets and back
pub trait WorkbookCodec {
    fn load(&self, bytes: &[u8]) -> Result<SheetCollection, CodecError>;

    fn save(&self, sheets: &SheetCollection) -> Result<Vec<u8>, CodecError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Rejected realization-date edit
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpdateError {
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Row NO {no} is not in the current view")]
    NotInView { no: usize },

    #[error("No row with origin {origin} in sheet {sheet}")]
    RowNotFound { sheet: String, origin: OriginIndex },

    #[error("No row matches label: {0}")]
    UnknownLabel(String),
}

/// Invalid month/year filter input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown month: {0}")]
    UnknownMonth(String),

    #[error("Invalid year: {0}")]
    InvalidYear(String),
}

/// Workbook read/write failure
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read workbook: {0}")]
    Read(String),

    #[error("Failed to write workbook: {0}")]
    Write(String),

    #[error("Workbook contains no sheets")]
    NoSheets,
}

// ============================================================================
// Tests
// ============================================================================
