//! Date parsing and status classification
//!
//! Spreadsheet dates arrive as native date cells or as free text typed by
//! people. Anything that does not parse is treated as "no date": a bad cell
//! never aborts a view, it only makes its row pending or unfilterable.

use chrono::{Datelike, Month, NaiveDate, NaiveDateTime};

use crate::{CellValue, Status};

/// Months in calendar order
pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Sentinel typed into the realization column for "not done"
pub const NOT_DONE: &str = "-";

// Month-first before day-first for ambiguous numeric dates; the day-first
// forms still catch dates whose first field exceeds 12.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Calendar month and year of a date cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthYear {
    pub month: Month,
    pub year: i32,
}

impl MonthYear {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: MONTHS[date.month0() as usize],
            year: date.year(),
        }
    }

    /// Upper-case English month name (e.g., "MARCH")
    pub fn month_name(&self) -> String {
        self.month.name().to_uppercase()
    }

    /// Four-digit year (e.g., "2024")
    pub fn year_label(&self) -> String {
        format!("{:04}", self.year)
    }
}

/// Parse a date-like cell, ignoring any time of day.
///
/// Numbers are not treated as dates: spreadsheet date cells are already
/// decoded by the workbook codec, so a bare number is a quantity.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Empty | CellValue::Number(_) | CellValue::Bool(_) => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Month and year of a date-like cell, `None` when it does not parse
pub fn month_year_of(value: &CellValue) -> Option<MonthYear> {
    parse_date(value).map(MonthYear::of)
}

/// Look up a month by English name or three-letter abbreviation, any case
pub fn month_from_name(name: &str) -> Option<Month> {
    let name = name.trim();
    MONTHS.iter().copied().find(|m| {
        m.name().eq_ignore_ascii_case(name)
            || (name.len() == 3 && m.name()[..3].eq_ignore_ascii_case(name))
    })
}

/// Derive the calibration status from the plan, expected and realized dates.
///
/// - no realization (empty, blank, or "-") → `Pending`
/// - realization or expectation unparseable → `Pending`
/// - realized on or before the expected day → `OnTime`
/// - otherwise → `Late`
///
/// The plan date does not affect the outcome.
pub fn classify(_plan: &CellValue, expected: &CellValue, realized: &CellValue) -> Status {
    if realized.is_blank() || matches!(realized, CellValue::Text(s) if s.trim() == NOT_DONE) {
        return Status::Pending;
    }

    match (parse_date(realized), parse_date(expected)) {
        (Some(real), Some(exp)) if real <= exp => Status::OnTime,
        (Some(_), Some(_)) => Status::Late,
        _ => Status::Pending,
    }
}
