//! Month/year filtering on the plan date

use chrono::Month;
use std::collections::BTreeSet;

use crate::classify::{month_from_name, month_year_of, MonthYear, MONTHS};
use crate::{FilterError, Row, Table};

/// Filter value meaning "do not filter on this field"
pub const ALL: &str = "ALL";

/// Optional month and year restriction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeriodFilter {
    pub month: Option<Month>,
    pub year: Option<i32>,
}

impl PeriodFilter {
    /// Filter that keeps every row
    pub const fn all() -> Self {
        Self {
            month: None,
            year: None,
        }
    }

    pub fn month(mut self, month: Month) -> Self {
        self.month = Some(month);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Parse user selections; `ALL` (any case) or empty input disables a field.
    pub fn parse(month: &str, year: &str) -> Result<Self, FilterError> {
        Ok(Self {
            month: Self::parse_month(month)?,
            year: Self::parse_year(year)?,
        })
    }

    pub fn parse_month(input: &str) -> Result<Option<Month>, FilterError> {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case(ALL) {
            return Ok(None);
        }
        month_from_name(input)
            .map(Some)
            .ok_or_else(|| FilterError::UnknownMonth(input.to_string()))
    }

    pub fn parse_year(input: &str) -> Result<Option<i32>, FilterError> {
        let input = input.trim();
        if input.is_empty() || input.eq_ignore_ascii_case(ALL) {
            return Ok(None);
        }
        input
            .parse::<i32>()
            .map(Some)
            .map_err(|_| FilterError::InvalidYear(input.to_string()))
    }

    pub fn is_active(&self) -> bool {
        self.month.is_some() || self.year.is_some()
    }

    /// Whether a row with the given plan period passes.
    ///
    /// An unknown period only passes an inactive filter.
    pub fn matches(&self, period: Option<MonthYear>) -> bool {
        if !self.is_active() {
            return true;
        }
        let Some(period) = period else {
            return false;
        };
        self.month.map_or(true, |m| m == period.month) && self.year.map_or(true, |y| y == period.year)
    }

    /// Caption parts for the active fields (e.g., ["Year: 2024", "Month: MARCH"])
    pub fn describe(&self) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(year) = self.year {
            parts.push(format!("Year: {year:04}"));
        }
        if let Some(month) = self.month {
            parts.push(format!("Month: {}", month.name().to_uppercase()));
        }
        parts
    }
}

/// Rows of `table` whose plan date falls in the filtered period, in table order
pub fn filter<'a>(table: &'a Table, plan_column: &str, period: &PeriodFilter) -> Vec<&'a Row> {
    table
        .rows()
        .iter()
        .filter(|row| period.matches(month_year_of(row.get(plan_column))))
        .collect()
}

/// Filter choices present in a table
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeriodOptions {
    /// Ascending
    pub years: Vec<i32>,
    /// Calendar order
    pub months: Vec<Month>,
}

impl PeriodOptions {
    /// Year choices as labels, `ALL` first
    pub fn year_labels(&self) -> Vec<String> {
        std::iter::once(ALL.to_string())
            .chain(self.years.iter().map(|y| format!("{y:04}")))
            .collect()
    }

    /// Month choices as upper-case names, `ALL` first
    pub fn month_labels(&self) -> Vec<String> {
        std::iter::once(ALL.to_string())
            .chain(self.months.iter().map(|m| m.name().to_uppercase()))
            .collect()
    }
}

/// Distinct years and months among parseable plan dates
pub fn available_periods(table: &Table, plan_column: &str) -> PeriodOptions {
    let mut years = BTreeSet::new();
    let mut months = BTreeSet::new();
    for period in table.rows().iter().filter_map(|r| month_year_of(r.get(plan_column))) {
        years.insert(period.year);
        months.insert(period.month.number_from_month());
    }

    PeriodOptions {
        years: years.into_iter().collect(),
        months: months
            .into_iter()
            .map(|n| MONTHS[n as usize - 1])
            .collect(),
    }
}
