//! Date normalization and date-row lookup

use chrono::NaiveDate;
use timebook_core::{CellValue, Worksheet};

use crate::schema::{last_row, value_at, DATE_COLUMN, DATE_FIRST_ROW};

/// Calendar date held by a cell value.
///
/// Date and date-time cells (including formulas whose cached result is a
/// date) collapse to their date. Every other value is not a date.
pub fn as_calendar_date(value: &CellValue) -> Option<NaiveDate> {
    value.as_datetime().map(|dt| dt.date())
}

/// Iterate over `(row, date)` for every date row of a month sheet
pub fn date_rows(sheet: &Worksheet) -> impl Iterator<Item = (u32, NaiveDate)> + '_ {
    (DATE_FIRST_ROW..=last_row(sheet)).filter_map(move |row| {
        as_calendar_date(value_at(sheet, row, DATE_COLUMN)).map(|date| (row, date))
    })
}

/// Find the first row whose date cell holds `date`
pub fn find_row_for_date(sheet: &Worksheet, date: NaiveDate) -> Option<u32> {
    date_rows(sheet)
        .find(|&(_, d)| d == date)
        .map(|(row, _)| row)
}
