//! Column bindings and grouping configuration
//!
//! Header names are a configuration concern: every workbook layout maps its
//! own headers onto the columns the pipeline needs. All fields have defaults,
//! so a partial TOML document is enough.
//!
//! ```toml
//! [columns]
//! plan = "TANGGAL PLAN"
//! expected = "TANGGAL EXP"
//! realized = "TANGGAL REALISASI"
//! name = "NAMA ALAT"
//! code = ["NO MESIN", "IDENTITAS"]
//!
//! [grouping]
//! default = "PLANT"
//!
//! [grouping.sheets]
//! BAKING = "LINE"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level settings document
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub columns: ColumnBindings,
    pub grouping: Grouping,
}

/// Which headers carry the load-bearing values
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnBindings {
    /// Scheduled calibration date, drives month/year filtering
    pub plan: String,
    /// Deadline for realization
    pub expected: String,
    /// Actual completion date, written by edits
    pub realized: String,
    /// Equipment name shown in edit labels
    pub name: String,
    /// Equipment code candidates; the first one present in a sheet is used
    pub code: Vec<String>,
    /// Source identifier columns hidden from views (replaced by `NO`)
    pub identity: Vec<String>,
    /// Computed columns never written back to the workbook
    pub derived: Vec<String>,
}

impl Default for ColumnBindings {
    fn default() -> Self {
        Self {
            plan: "PLAN_DATE".into(),
            expected: "EXPECTED_DATE".into(),
            realized: "REALIZATION_DATE".into(),
            name: "EQUIPMENT_NAME".into(),
            code: vec!["NO MESIN".into(), "IDENTITAS".into(), "EQUIPMENT_CODE".into()],
            identity: vec!["NO".into(), "IDENTIFIER".into()],
            derived: vec!["STATUS".into()],
        }
    }
}

impl ColumnBindings {
    /// First configured code column that exists in `columns`
    pub fn code_column<'a>(&'a self, columns: &[String]) -> Option<&'a str> {
        self.code
            .iter()
            .find(|c| columns.contains(c))
            .map(String::as_str)
    }

    pub fn is_identity(&self, column: &str) -> bool {
        self.identity.iter().any(|c| c == column)
    }

    pub fn is_derived(&self, column: &str) -> bool {
        self.derived.iter().any(|c| c == column)
    }
}

/// Grouping column per equipment category
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grouping {
    pub default: String,
    /// Sheet name to grouping column, overriding `default`
    pub sheets: BTreeMap<String, String>,
}

impl Default for Grouping {
    fn default() -> Self {
        Self {
            default: "PLANT".into(),
            sheets: BTreeMap::new(),
        }
    }
}

impl Grouping {
    pub fn column_for(&self, sheet: &str) -> &str {
        self.sheets.get(sheet).map_or(self.default.as_str(), String::as_str)
    }
}
