//! Workbook import via calamine
//!
//! The first row of each sheet's used range is the header. Data rows that are
//! entirely empty are skipped; every other row keeps its position as its
//! origin index.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use caltrack_core::{CellValue, CodecError, SheetCollection, Table};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::collections::HashMap;
use std::io::Cursor;

/// Decode every sheet of an xlsx/xls/ods workbook, preserving sheet order
pub fn read_workbook(bytes: &[u8]) -> Result<SheetCollection, CodecError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| CodecError::Read(e.to_string()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(CodecError::NoSheets);
    }

    let mut sheets = SheetCollection::new();
    for name in &sheet_names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| CodecError::Read(format!("sheet '{name}': {e}")))?;
        let table = table_from_range(&range);
        tracing::debug!(sheet = %name, rows = table.len(), columns = table.columns().len(), "read sheet");
        sheets.insert(name.clone(), table);
    }
    Ok(sheets)
}

fn table_from_range(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    let mut table = Table::new(header_names(header));
    for row in rows {
        let values: Vec<CellValue> = row.iter().map(cell_value).collect();
        if values.iter().all(|v| *v == CellValue::Empty) {
            continue;
        }
        table.push_row(values);
    }
    table
}

/// Header names with blanks filled in and duplicates suffixed
pub(crate) fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = match cell_value(cell) {
                v if v.is_blank() => format!("Unnamed: {i}"),
                v => v.to_string().trim().to_string(),
            };
            let count = seen.entry(name.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                name
            } else {
                format!("{name}.{}", *count - 1)
            }
        })
        .collect()
}

pub(crate) fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // as_datetime honours the workbook's 1904 flag
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .map(datetime_cell)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        // Durations ([h]:mm:ss) stay numeric: a fraction of a day
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => parse_iso(s).unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn parse_iso(text: &str) -> Option<CellValue> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(CellValue::Date(date));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(datetime_cell)
}

/// `Date` at midnight, `DateTime` otherwise, truncated to whole seconds
fn datetime_cell(dt: NaiveDateTime) -> CellValue {
    if dt.time() == NaiveTime::MIN {
        return CellValue::Date(dt.date());
    }
    match dt.with_nanosecond(0) {
        Some(whole) => CellValue::DateTime(whole),
        None => CellValue::DateTime(dt),
    }
}
