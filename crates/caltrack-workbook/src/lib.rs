//! # caltrack-workbook
//!
//! XLSX backend for caltrack sheet collections.
//!
//! This crate provides:
//! - `XlsxCodec`, the `WorkbookCodec` used by the CLI
//! - Import through calamine (xlsx, xls, xlsb, ods)
//! - Export through rust_xlsxwriter with typed date cells
//!
//! ## Example
//!
//! ```rust,ignore
//! use caltrack_core::WorkbookCodec;
//! use caltrack_workbook::XlsxCodec;
//!
//! let codec = XlsxCodec::new().exclude_column("STATUS");
//! let sheets = codec.load_path("kalibrasi.xlsx")?;
//! let bytes = codec.save(&sheets)?;
//! std::fs::write("kalibrasi_update.xlsx", bytes)?;
//! ```

pub mod reader;
pub mod serial;
pub mod writer;

use caltrack_core::{CodecError, ColumnBindings, SheetCollection, WorkbookCodec};
use chrono::NaiveDateTime;
use std::path::Path;

/// Default number format for date cells
pub const DEFAULT_DATE_FORMAT: &str = "yyyy-mm-dd";

/// XLSX workbook codec
#[derive(Clone, Debug)]
pub struct XlsxCodec {
    /// Columns dropped on export (computed values)
    pub excluded_columns: Vec<String>,
    /// Excel number format for date cells
    pub date_format: String,
}

impl Default for XlsxCodec {
    fn default() -> Self {
        Self {
            excluded_columns: Vec::new(),
            date_format: DEFAULT_DATE_FORMAT.into(),
        }
    }
}

impl XlsxCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec that drops the bindings' derived columns on export
    pub fn from_bindings(bindings: &ColumnBindings) -> Self {
        bindings
            .derived
            .iter()
            .fold(Self::new(), |codec, column| codec.exclude_column(column.as_str()))
    }

    /// Drop `column` from exported sheets
    pub fn exclude_column(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if !self.excluded_columns.contains(&column) {
            self.excluded_columns.push(column);
        }
        self
    }

    /// Set the number format used for date cells
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<SheetCollection, CodecError> {
        let bytes = std::fs::read(path.as_ref())?;
        self.load(&bytes)
    }

    pub fn save_path(&self, path: impl AsRef<Path>, sheets: &SheetCollection) -> Result<(), CodecError> {
        let bytes = self.save(sheets)?;
        std::fs::write(path.as_ref(), bytes)?;
        tracing::debug!(path = %path.as_ref().display(), "workbook written");
        Ok(())
    }
}

impl WorkbookCodec for XlsxCodec {
    fn load(&self, bytes: &[u8]) -> Result<SheetCollection, CodecError> {
        reader::read_workbook(bytes)
    }

    fn save(&self, sheets: &SheetCollection) -> Result<Vec<u8>, CodecError> {
        writer::write_workbook(sheets, &self.excluded_columns, &self.date_format)
    }
}

/// Export file name stamped with `now` (e.g., calibration_update_20240131_142500.xlsx)
pub fn export_file_name(now: NaiveDateTime) -> String {
    format!("calibration_update_{}.xlsx", now.format("%Y%m%d_%H%M%S"))
}
