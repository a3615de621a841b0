//! Text and JSON rendering of a sheet view

use caltrack_core::{CellValue, GroupSummary, PeriodFilter, Status, StatusSummary, Table, View};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Header of the computed status column in rendered tables
const STATUS_HEADER: &str = "STATUS";

/// Widest a text cell is allowed to render
const MAX_CELL_WIDTH: usize = 40;

#[derive(Debug, Serialize)]
pub struct ShowReport<'a> {
    pub sheet: &'a str,
    pub filter: Vec<String>,
    pub summary: StatusSummary,
    pub columns: &'a [String],
    pub rows: Vec<ReportRow>,
    pub group_column: &'a str,
    /// Absent when the sheet has no such column
    pub groups: Option<BTreeMap<String, GroupSummary>>,
}

#[derive(Debug, Serialize)]
pub struct ReportRow {
    pub no: usize,
    pub status: Status,
    pub label: String,
    pub values: BTreeMap<String, CellValue>,
}

impl<'a> ShowReport<'a> {
    pub fn new(view: &'a View<'_>, period: &PeriodFilter, group_column: &'a str) -> Self {
        let rows = view
            .rows
            .iter()
            .map(|r| ReportRow {
                no: r.no,
                status: r.status,
                label: view.label(r),
                values: view
                    .columns
                    .iter()
                    .map(|c| (c.clone(), r.value(c)))
                    .filter(|(_, v)| !v.is_blank())
                    .collect(),
            })
            .collect();

        Self {
            sheet: &view.sheet,
            filter: period.describe(),
            summary: view.summary(),
            columns: &view.columns,
            rows,
            group_column,
            groups: view.group_summary(group_column),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Sheet: {}", self.sheet);
        if self.filter.is_empty() {
            let _ = writeln!(out, "Filter: none");
        } else {
            let _ = writeln!(out, "Filter: {}", self.filter.join(", "));
        }
        out.push('\n');

        out.push_str(&metrics_line(&self.summary));
        out.push_str("\n\n");

        if self.rows.is_empty() {
            out.push_str("No calibrations planned for this period.\n");
        } else {
            out.push_str(&self.table_text());
        }
        out.push('\n');

        match &self.groups {
            Some(groups) => out.push_str(&groups_text(self.group_column, groups)),
            None => {
                let _ = writeln!(out, "Column '{}' not found, no group summary.", self.group_column);
            }
        }
        out
    }

    fn table_text(&self) -> String {
        let headers: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(STATUS_HEADER))
            .collect();

        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| row.values.get(c).map(cell_text).unwrap_or_default())
                    .chain(std::iter::once(row.status.label().to_string()))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        push_line(&mut out, headers.iter().copied(), &widths);
        push_line(
            &mut out,
            widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().iter().map(String::as_str),
            &widths,
        );
        for row in &cells {
            push_line(&mut out, row.iter().map(String::as_str), &widths);
        }
        out
    }
}

fn cell_text(value: &CellValue) -> String {
    let text = value.to_string();
    if text.chars().count() <= MAX_CELL_WIDTH {
        return text;
    }
    let mut cut: String = text.chars().take(MAX_CELL_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}

fn push_line<'s>(out: &mut String, cells: impl Iterator<Item = &'s str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn metrics_line(summary: &StatusSummary) -> String {
    format!(
        "Total: {}  On Time: {} ({})  Late: {} ({})  Pending: {} ({})",
        summary.total,
        summary.on_time,
        summary.percent_label(summary.on_time),
        summary.late,
        summary.percent_label(summary.late),
        summary.pending,
        summary.percent_label(summary.pending),
    )
}

fn groups_text(column: &str, groups: &BTreeMap<String, GroupSummary>) -> String {
    let mut out = format!("Completion by {column}:\n");
    if groups.is_empty() {
        out.push_str("  (no groups)\n");
        return out;
    }

    let key_width = groups.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    for (key, g) in groups {
        let _ = writeln!(
            out,
            "  {key:<key_width$}  total {}  on time {}  not done {}  {}%",
            g.total, g.on_time, g.not_done, g.percent_complete
        );
    }
    out
}

/// One line per sheet: name and row count
pub fn sheets_text<'a>(sheets: impl Iterator<Item = (&'a str, &'a Table)>) -> String {
    let mut out = String::new();
    for (name, table) in sheets {
        let _ = writeln!(out, "{name}\t{} rows", table.len());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use caltrack_core::ColumnBindings;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn d(year: i32, month: u32, day: u32) -> CellValue {
        CellValue::Date(NaiveDate::from_ymd_opt(year, month, day).unwrap())
    }

    fn table() -> Table {
        let mut table = Table::new(
            ["NO", "EQUIPMENT_NAME", "PLANT", "PLAN_DATE", "EXPECTED_DATE", "REALIZATION_DATE"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        table.push_row(vec![1.0.into(), "A".into(), "P1".into(), d(2024, 1, 2), d(2024, 1, 10), d(2024, 1, 9)]);
        table.push_row(vec![2.0.into(), "B".into(), "P1".into(), d(2024, 1, 2), d(2024, 1, 10), d(2024, 1, 15)]);
        table.push_row(vec![3.0.into(), "C".into(), "P2".into(), d(2024, 1, 2), d(2024, 1, 10)]);
        table
    }

    #[test]
    fn metrics_line_formats_percentages() {
        let summary = StatusSummary { total: 3, on_time: 1, late: 1, pending: 1 };
        assert_eq!(
            metrics_line(&summary),
            "Total: 3  On Time: 1 (33.3%)  Late: 1 (33.3%)  Pending: 1 (33.3%)"
        );
        assert_eq!(
            metrics_line(&StatusSummary::default()),
            "Total: 0  On Time: 0 (0%)  Late: 0 (0%)  Pending: 0 (0%)"
        );
    }

    #[test]
    fn text_report_lists_rows_in_status_order() {
        let table = table();
        let period = PeriodFilter::all();
        let view = View::build("MIXING", &table, &period, &ColumnBindings::default());
        let text = ShowReport::new(&view, &period, "PLANT").to_text();

        let rows: Vec<&str> = text
            .lines()
            .filter(|l| l.ends_with("Late") || l.ends_with("Pending") || l.ends_with("On Time"))
            .collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("1 ") && rows[0].contains(" B ") && rows[0].ends_with("Late"));
        assert!(rows[1].starts_with("2 ") && rows[1].contains(" C ") && rows[1].ends_with("Pending"));
        assert!(rows[2].starts_with("3 ") && rows[2].contains(" A ") && rows[2].ends_with("On Time"));
        assert!(text.contains("Filter: none"));
        assert!(text.contains("Completion by PLANT:"));
        assert!(text.contains("P1  total 2  on time 1  not done 1  50.0%"));
    }

    #[test]
    fn missing_group_column_is_reported() {
        let table = table();
        let period = PeriodFilter::all();
        let view = View::build("MIXING", &table, &period, &ColumnBindings::default());
        let report = ShowReport::new(&view, &period, "LINE");

        assert!(report.groups.is_none());
        assert!(report.to_text().contains("Column 'LINE' not found"));
    }

    #[test]
    fn json_report_carries_status_and_display_number() {
        let table = table();
        let period = PeriodFilter::all();
        let view = View::build("MIXING", &table, &period, &ColumnBindings::default());
        let json: serde_json::Value =
            serde_json::from_str(&ShowReport::new(&view, &period, "PLANT").to_json().unwrap()).unwrap();

        assert_eq!(json["rows"][0]["no"], 1);
        assert_eq!(json["rows"][0]["status"], "LATE");
        assert_eq!(json["rows"][0]["values"]["EQUIPMENT_NAME"], "B");
        assert_eq!(json["rows"][0]["values"]["NO"], 1.0);
        assert_eq!(json["summary"]["total"], 3);
        assert_eq!(json["groups"]["P1"]["on_time"], 1);
    }

    #[test]
    fn stored_status_column_gives_one_status_header() {
        let mut table = Table::new(
            ["EQUIPMENT_NAME", "PLAN_DATE", "EXPECTED_DATE", "REALIZATION_DATE", "STATUS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        table.push_row(vec!["A".into(), d(2024, 1, 2), d(2024, 1, 10), d(2024, 1, 9), "Late (stale)".into()]);
        let period = PeriodFilter::all();
        let view = View::build("MIXING", &table, &period, &ColumnBindings::default());
        let text = ShowReport::new(&view, &period, "PLANT").to_text();

        let header = text.lines().find(|l| l.starts_with("NO ")).unwrap();
        assert_eq!(header.matches("STATUS").count(), 1);
        assert!(!text.contains("Late (stale)"));
        assert!(text.lines().any(|l| l.starts_with("1 ") && l.ends_with("On Time")));
    }

    #[test]
    fn long_cells_are_truncated() {
        let long = CellValue::text("x".repeat(60));
        assert_eq!(cell_text(&long).chars().count(), MAX_CELL_WIDTH);
        assert!(cell_text(&long).ends_with("..."));
    }
}
