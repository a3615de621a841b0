//! Display views: status ordering, renumbering and per-group summaries
//!
//! A `View` borrows rows from the backing table and pairs each with its
//! computed status and a display number. It is rebuilt for every render and
//! dropped afterwards; nothing in it is ever written back.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::classify::classify;
use crate::filter::{filter, PeriodFilter};
use crate::{CellValue, ColumnBindings, OriginIndex, Row, Status, StatusSummary, Table};

/// Header of the display sequence column
pub const NO_COLUMN: &str = "NO";

/// A row paired with its computed status, before numbering
#[derive(Clone, Copy, Debug)]
pub struct StatusRow<'a> {
    pub row: &'a Row,
    pub status: Status,
}

/// One displayed row
#[derive(Clone, Copy, Debug)]
pub struct ViewRow<'a> {
    /// 1-based display number, only meaningful within this view
    pub no: usize,
    pub status: Status,
    pub row: &'a Row,
}

impl<'a> ViewRow<'a> {
    pub fn origin(&self) -> OriginIndex {
        self.row.origin()
    }

    /// Cell for a view column; `NO` yields the display number
    pub fn value(&self, column: &str) -> CellValue {
        if column == NO_COLUMN {
            CellValue::Number(self.no as f64)
        } else {
            self.row.get(column).clone()
        }
    }
}

/// Per-group completion counts
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub total: usize,
    pub on_time: usize,
    /// Late plus pending
    pub not_done: usize,
    /// On-time share rounded to one decimal
    pub percent_complete: Decimal,
}

impl GroupSummary {
    fn from_counts(total: usize, on_time: usize) -> Self {
        let mut percent_complete = if total == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(on_time) * Decimal::ONE_HUNDRED / Decimal::from(total)).round_dp(1)
        };
        // Always one decimal place, so 50 prints as "50.0"
        percent_complete.rescale(1);
        Self {
            total,
            on_time,
            not_done: total - on_time,
            percent_complete,
        }
    }
}

/// Pair each row with its status
pub fn classify_rows<'a>(rows: Vec<&'a Row>, columns: &ColumnBindings) -> Vec<StatusRow<'a>> {
    rows.into_iter()
        .map(|row| StatusRow {
            row,
            status: classify(
                row.get(&columns.plan),
                row.get(&columns.expected),
                row.get(&columns.realized),
            ),
        })
        .collect()
}

/// Order late rows first, then pending, then on time.
///
/// The sort is stable: rows with equal status keep their relative order.
pub fn sort_by_status(rows: &mut [StatusRow<'_>]) {
    rows.sort_by_key(|r| r.status.priority());
}

/// Number rows 1..=N in their current order
pub fn renumber<'a>(rows: Vec<StatusRow<'a>>) -> Vec<ViewRow<'a>> {
    rows.into_iter()
        .enumerate()
        .map(|(i, r)| ViewRow {
            no: i + 1,
            status: r.status,
            row: r.row,
        })
        .collect()
}

/// A filtered, status-ordered, renumbered projection of one sheet
#[derive(Clone, Debug)]
pub struct View<'a> {
    pub sheet: String,
    /// `NO` followed by the source columns minus identifier and derived columns
    pub columns: Vec<String>,
    pub rows: Vec<ViewRow<'a>>,
    /// Header of the backing table, every column included
    source_columns: &'a [String],
    name_column: String,
    code_column: Option<String>,
}

impl<'a> View<'a> {
    /// Run the full pipeline: filter → classify → sort → renumber
    pub fn build(
        sheet: &str,
        table: &'a Table,
        period: &PeriodFilter,
        columns: &ColumnBindings,
    ) -> Self {
        let kept = filter(table, &columns.plan, period);
        let mut rows = classify_rows(kept, columns);
        sort_by_status(&mut rows);

        let view_columns = std::iter::once(NO_COLUMN.to_string())
            .chain(
                table
                    .columns()
                    .iter()
                    .filter(|c| {
                        !columns.is_identity(c) && !columns.is_derived(c) && c.as_str() != NO_COLUMN
                    })
                    .cloned(),
            )
            .collect();

        tracing::debug!(
            sheet,
            total = table.len(),
            shown = rows.len(),
            "built view"
        );

        Self {
            sheet: sheet.to_string(),
            columns: view_columns,
            rows: renumber(rows),
            source_columns: table.columns(),
            name_column: columns.name.clone(),
            code_column: columns.code_column(table.columns()).map(str::to_string),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, no: usize) -> Option<&ViewRow<'a>> {
        // NO is 1..=N in row order
        no.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    /// Origin index of the row displayed as `no`
    pub fn origin_of(&self, no: usize) -> Option<OriginIndex> {
        self.get(no).map(ViewRow::origin)
    }

    pub fn summary(&self) -> StatusSummary {
        StatusSummary::from_statuses(self.rows.iter().map(|r| r.status))
    }

    /// Completion counts per value of `column`, keys ascending.
    ///
    /// Returns `None` when the sheet has no such column. Rows with a blank
    /// group value are left out.
    pub fn group_summary(&self, column: &str) -> Option<BTreeMap<String, GroupSummary>> {
        if !self.source_columns.iter().any(|c| c == column) {
            return None;
        }

        let mut counts: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for row in &self.rows {
            let key = row.row.get(column);
            if key.is_blank() {
                continue;
            }
            let entry = counts.entry(key.to_string()).or_default();
            entry.0 += 1;
            if row.status == Status::OnTime {
                entry.1 += 1;
            }
        }

        Some(
            counts
                .into_iter()
                .map(|(key, (total, on_time))| (key, GroupSummary::from_counts(total, on_time)))
                .collect(),
        )
    }

    /// Edit label: "[NO] name - code"
    pub fn label(&self, row: &ViewRow<'_>) -> String {
        let code = self
            .code_column
            .as_deref()
            .map(|c| row.row.get(c).to_string())
            .unwrap_or_default();
        format!("[{}] {} - {}", row.no, row.row.get(&self.name_column), code)
    }

    /// Edit labels in display order
    pub fn labels(&self) -> Vec<String> {
        self.rows.iter().map(|r| self.label(r)).collect()
    }

    /// Display number of the row carrying `label`
    pub fn resolve_label(&self, label: &str) -> Option<usize> {
        // Labels without a code end in "- "; match with or without the space
        let label = label.trim();
        self.rows.iter().find(|r| self.label(r).trim_end() == label).map(|r| r.no)
    }
}
