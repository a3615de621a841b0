//! Session state: the loaded workbook and its only mutation path
//!
//! A `Session` owns the sheet collection for as long as the user works on one
//! workbook. Every render borrows it through [`Session::view`]; every edit goes
//! through [`Session::apply_edit`] or [`Session::set_realization_date`], which
//! correlate by origin index so the edited row is always the one the user saw.

use chrono::NaiveDate;

use crate::filter::{available_periods, PeriodFilter, PeriodOptions};
use crate::{CodecError, OriginIndex, Settings, SheetCollection, UpdateError, View, WorkbookCodec};

#[derive(Clone, Debug)]
pub struct Session {
    sheets: SheetCollection,
    settings: Settings,
}

impl Session {
    pub fn new(sheets: SheetCollection, settings: Settings) -> Self {
        Self { sheets, settings }
    }

    /// Decode a workbook and start a session on it
    pub fn load<C: WorkbookCodec>(codec: &C, bytes: &[u8], settings: Settings) -> Result<Self, CodecError> {
        let sheets = codec.load(bytes)?;
        tracing::debug!(sheets = sheets.len(), "session loaded");
        Ok(Self::new(sheets, settings))
    }

    pub fn sheets(&self) -> &SheetCollection {
        &self.sheets
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Discard the current workbook in favour of a newly loaded one
    pub fn replace(&mut self, sheets: SheetCollection) {
        self.sheets = sheets;
    }

    pub fn into_sheets(self) -> SheetCollection {
        self.sheets
    }

    /// Grouping column configured for `sheet`
    pub fn group_column(&self, sheet: &str) -> &str {
        self.settings.grouping.column_for(sheet)
    }

    /// Current view of `sheet`, `None` if there is no such sheet
    pub fn view(&self, sheet: &str, period: &PeriodFilter) -> Option<View<'_>> {
        let table = self.sheets.get(sheet)?;
        Some(View::build(sheet, table, period, &self.settings.columns))
    }

    /// Filter choices for `sheet`
    pub fn periods(&self, sheet: &str) -> Option<PeriodOptions> {
        let table = self.sheets.get(sheet)?;
        Some(available_periods(table, &self.settings.columns.plan))
    }

    /// Set the realization date of the row shown as `no` in the view for
    /// `(sheet, period)`, returning the origin index that was edited.
    pub fn apply_edit(
        &mut self,
        sheet: &str,
        period: &PeriodFilter,
        no: usize,
        date: NaiveDate,
    ) -> Result<OriginIndex, UpdateError> {
        let origin = self
            .view(sheet, period)
            .ok_or_else(|| UpdateError::SheetNotFound(sheet.to_string()))?
            .origin_of(no)
            .ok_or(UpdateError::NotInView { no });

        let origin = match origin {
            Ok(origin) => origin,
            Err(err) => {
                tracing::warn!(sheet, no, "edit rejected: {err}");
                return Err(err);
            }
        };

        self.set_realization_date(sheet, origin, date)?;
        Ok(origin)
    }

    /// Same as [`Session::apply_edit`] with the row picked by its edit label
    pub fn apply_edit_by_label(
        &mut self,
        sheet: &str,
        period: &PeriodFilter,
        label: &str,
        date: NaiveDate,
    ) -> Result<OriginIndex, UpdateError> {
        let no = self
            .view(sheet, period)
            .ok_or_else(|| UpdateError::SheetNotFound(sheet.to_string()))?
            .resolve_label(label)
            .ok_or_else(|| UpdateError::UnknownLabel(label.to_string()))?;
        self.apply_edit(sheet, period, no, date)
    }

    /// Set the realization date of the row with the given origin index
    pub fn set_realization_date(
        &mut self,
        sheet: &str,
        origin: OriginIndex,
        date: NaiveDate,
    ) -> Result<(), UpdateError> {
        let column = self.settings.columns.realized.clone();
        match self.sheets.set_realization_date(sheet, origin, &column, date) {
            Ok(()) => {
                tracing::info!(sheet, %origin, %date, "realization date recorded");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(sheet, %origin, "edit rejected: {err}");
                Err(err)
            }
        }
    }

    /// Encode the current state of every sheet
    pub fn export<C: WorkbookCodec>(&self, codec: &C) -> Result<Vec<u8>, CodecError> {
        codec.save(&self.sheets)
    }
}
