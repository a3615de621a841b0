//! Workbook export via rust_xlsxwriter

use caltrack_core::{CellValue, CodecError, SheetCollection, Table};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::serial::{date_to_serial, datetime_to_serial};

/// Reusable cell formats
struct WorkbookFormats {
    header: Format,
    date: Format,
    datetime: Format,
}

fn create_formats(date_format: &str) -> WorkbookFormats {
    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(0x4472C4)
        .set_font_color(0xFFFFFF)
        .set_border(FormatBorder::Thin);

    let date = Format::new().set_num_format(date_format);

    let datetime = Format::new().set_num_format(format!("{date_format} hh:mm:ss"));

    WorkbookFormats {
        header,
        date,
        datetime,
    }
}

fn write_error(e: XlsxError) -> CodecError {
    CodecError::Write(e.to_string())
}

/// Encode every sheet, leaving out `excluded` columns
pub fn write_workbook(
    sheets: &SheetCollection,
    excluded: &[String],
    date_format: &str,
) -> Result<Vec<u8>, CodecError> {
    let mut workbook = Workbook::new();
    let formats = create_formats(date_format);

    for (name, table) in sheets.iter() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).map_err(write_error)?;
        write_table(sheet, table, excluded, &formats)?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| CodecError::Write(format!("Failed to create Excel: {e}")))
}

fn write_table(
    sheet: &mut Worksheet,
    table: &Table,
    excluded: &[String],
    formats: &WorkbookFormats,
) -> Result<(), CodecError> {
    let columns: Vec<&String> = table
        .columns()
        .iter()
        .filter(|c| !excluded.contains(c))
        .collect();

    for (col, header) in columns.iter().enumerate() {
        let col = col as u16;
        sheet
            .write_string_with_format(0, col, header.as_str(), &formats.header)
            .map_err(write_error)?;

        let widest = table
            .rows()
            .iter()
            .map(|r| r.get(header).to_string().chars().count())
            .chain(std::iter::once(header.chars().count()))
            .max()
            .unwrap_or(0);
        sheet.set_column_width(col, (widest + 2).clamp(8, 50) as f64).ok();
    }

    if !columns.is_empty() {
        sheet.set_freeze_panes(1, 0).map_err(write_error)?;
    }

    for (i, row) in table.rows().iter().enumerate() {
        let r = i as u32 + 1;
        for (col, column) in columns.iter().enumerate() {
            write_cell(sheet, r, col as u16, row.get(column), formats)?;
        }
    }
    Ok(())
}

fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    formats: &WorkbookFormats,
) -> Result<(), CodecError> {
    let written = match value {
        CellValue::Empty => return Ok(()),
        CellValue::Text(s) if s.is_empty() => return Ok(()),
        CellValue::Text(s) => sheet.write_string(row, col, s.as_str()),
        CellValue::Number(n) => sheet.write_number(row, col, *n),
        CellValue::Bool(b) => sheet.write_boolean(row, col, *b),
        CellValue::Date(d) => {
            sheet.write_number_with_format(row, col, date_to_serial(*d), &formats.date)
        }
        CellValue::DateTime(dt) => {
            sheet.write_number_with_format(row, col, datetime_to_serial(*dt), &formats.datetime)
        }
    };
    written.map_err(write_error)?;
    Ok(())
}
