//! Save/load tests against real xlsx bytes

use caltrack_core::{
    CellValue, CodecError, PeriodFilter, Session, Settings, SheetCollection, Status, Table, WorkbookCodec,
};
use caltrack_workbook::XlsxCodec;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::{Cursor, Read, Write};
use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn calibration_sheets() -> SheetCollection {
    let mut mixing = Table::new(columns(&[
        "NO",
        "EQUIPMENT_NAME",
        "NO MESIN",
        "PLANT",
        "PLAN_DATE",
        "EXPECTED_DATE",
        "REALIZATION_DATE",
        "STATUS",
    ]));
    mixing.push_row(vec![
        1.0.into(),
        "Mixer scale".into(),
        "MX-01".into(),
        "P1".into(),
        date(2024, 1, 2).into(),
        date(2024, 1, 10).into(),
        date(2024, 1, 9).into(),
        "On Time".into(),
    ]);
    mixing.push_row(vec![
        2.0.into(),
        "Thermo sensor".into(),
        "MX-02".into(),
        "P2".into(),
        date(2024, 1, 3).into(),
        date(2024, 1, 12).into(),
        "-".into(),
        "Pending".into(),
    ]);

    let mut packing = Table::new(columns(&["EQUIPMENT_NAME", "PLAN_DATE", "LAST_CHECK", "SEALED"]));
    packing.push_row(vec![
        "Checkweigher".into(),
        "2024-02-01".into(),
        CellValue::DateTime(date(2024, 1, 31).and_hms_opt(16, 30, 0).unwrap()),
        CellValue::Bool(true),
    ]);

    let mut sheets = SheetCollection::new();
    sheets.insert("MIXING", mixing);
    sheets.insert("PACKING", packing);
    sheets
}

fn codec() -> XlsxCodec {
    XlsxCodec::from_bindings(&Settings::default().columns)
}

#[test]
fn save_then_load_keeps_values() {
    let codec = codec();
    let bytes = codec.save(&calibration_sheets()).unwrap();
    let loaded = codec.load(&bytes).unwrap();

    let mixing = loaded.get("MIXING").unwrap();
    assert_eq!(
        mixing.columns(),
        &columns(&["NO", "EQUIPMENT_NAME", "NO MESIN", "PLANT", "PLAN_DATE", "EXPECTED_DATE", "REALIZATION_DATE"])
    );
    assert_eq!(mixing.len(), 2);

    let first = &mixing.rows()[0];
    assert_eq!(first.get("NO"), &CellValue::Number(1.0));
    assert_eq!(first.get("EQUIPMENT_NAME"), &CellValue::text("Mixer scale"));
    assert_eq!(first.get("PLAN_DATE"), &CellValue::Date(date(2024, 1, 2)));
    assert_eq!(first.get("REALIZATION_DATE"), &CellValue::Date(date(2024, 1, 9)));
    assert_eq!(mixing.rows()[1].get("REALIZATION_DATE"), &CellValue::text("-"));

    let packing = loaded.get("PACKING").unwrap();
    let row = &packing.rows()[0];
    assert_eq!(row.get("PLAN_DATE"), &CellValue::text("2024-02-01"));
    assert_eq!(
        row.get("LAST_CHECK"),
        &CellValue::DateTime(date(2024, 1, 31).and_hms_opt(16, 30, 0).unwrap())
    );
    assert_eq!(row.get("SEALED"), &CellValue::Bool(true));
}

#[test]
fn derived_status_column_is_not_saved() {
    let codec = codec();
    let bytes = codec.save(&calibration_sheets()).unwrap();
    let loaded = codec.load(&bytes).unwrap();

    for (_, table) in loaded.iter() {
        assert!(!table.has_column("STATUS"));
    }
}

#[test]
fn sheet_order_is_preserved() {
    let mut sheets = SheetCollection::new();
    for name in ["ZETA", "ALPHA", "MIDDLE"] {
        sheets.insert(name, Table::new(columns(&["EQUIPMENT_NAME"])));
    }

    let codec = XlsxCodec::new();
    let loaded = codec.load(&codec.save(&sheets).unwrap()).unwrap();
    assert_eq!(loaded.names().collect::<Vec<_>>(), vec!["ZETA", "ALPHA", "MIDDLE"]);
}

#[test]
fn edited_date_survives_export() {
    let codec = codec();
    let bytes = codec.save(&calibration_sheets()).unwrap();
    let mut session = Session::load(&codec, &bytes, Settings::default()).unwrap();

    // "Thermo sensor" is the only pending row, shown first
    let all = PeriodFilter::all();
    session.apply_edit("MIXING", &all, 1, date(2024, 1, 20)).unwrap();

    let reloaded = Session::load(&codec, &session.export(&codec).unwrap(), Settings::default()).unwrap();
    let view = reloaded.view("MIXING", &all).unwrap();
    let statuses: Vec<_> = view
        .rows
        .iter()
        .map(|r| (r.row.get("EQUIPMENT_NAME").to_string(), r.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("Thermo sensor".to_string(), Status::Late),
            ("Mixer scale".to_string(), Status::OnTime),
        ]
    );
}

#[test]
fn file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kalibrasi.xlsx");
    let codec = codec();

    codec.save_path(&path, &calibration_sheets()).unwrap();
    let loaded = codec.load_path(&path).unwrap();
    assert_eq!(loaded.len(), 2);
}

#[test]
fn empty_sheet_round_trips() {
    let mut sheets = SheetCollection::new();
    sheets.insert("BLANK", Table::default());

    let codec = XlsxCodec::new();
    let loaded = codec.load(&codec.save(&sheets).unwrap()).unwrap();
    let table = loaded.get("BLANK").unwrap();
    assert!(table.is_empty());
    assert!(table.columns().is_empty());
}

/// Copy of an xlsx package with the workbook switched to the 1904 date system
fn with_1904_dates(xlsx: &[u8]) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(xlsx)).unwrap();
    let mut out = ZipWriter::new(Cursor::new(Vec::new()));

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let name = entry.name().to_string();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();

        if name == "xl/workbook.xml" {
            let xml = String::from_utf8(content).unwrap();
            assert!(xml.contains("<workbookPr "));
            content = xml.replacen("<workbookPr ", "<workbookPr date1904=\"1\" ", 1).into_bytes();
        }

        out.start_file(name, SimpleFileOptions::default()).unwrap();
        out.write_all(&content).unwrap();
    }
    out.finish().unwrap().into_inner()
}

#[test]
fn dates_in_1904_workbooks_use_the_1904_epoch() {
    let mut table = Table::new(columns(&["EQUIPMENT_NAME", "PLAN_DATE"]));
    table.push_row(vec!["Hygrometer".into(), date(2024, 3, 5).into()]);
    let mut sheets = SheetCollection::new();
    sheets.insert("LAB", table);

    let codec = XlsxCodec::new();
    let bytes = with_1904_dates(&codec.save(&sheets).unwrap());
    let loaded = codec.load(&bytes).unwrap();

    // The stored serial counts days from 1904-01-01 in this workbook
    assert_eq!(
        loaded.get("LAB").unwrap().rows()[0].get("PLAN_DATE"),
        &CellValue::Date(date(2028, 3, 6))
    );
}

#[test]
fn garbage_bytes_are_a_read_error() {
    let err = XlsxCodec::new().load(b"not a spreadsheet").unwrap_err();
    assert!(matches!(err, CodecError::Read(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = XlsxCodec::new().load_path(dir.path().join("missing.xlsx")).unwrap_err();
    assert!(matches!(err, CodecError::Io(_)));
}
