//! Which days of a month already carry a booking

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use timebook_core::Workbook;

use crate::dates::date_rows;
use crate::layout::resolve_employee_block;
use crate::router::resolve_sheet;
use crate::schema::value_at;

/// Dates of `month` on which any cell of `employee`'s block holds data.
///
/// `month` is any date within the month of interest. Project hours and
/// absence text both count; empty strings, zero and `FALSE` do not. A
/// missing month sheet or an unknown employee yields an empty set.
pub fn filled_dates(workbook: &Workbook, employee: &str, month: NaiveDate) -> BTreeSet<NaiveDate> {
    let Some(sheet) = resolve_sheet(workbook, month) else {
        return BTreeSet::new();
    };
    let Some(block) = resolve_employee_block(sheet, employee) else {
        return BTreeSet::new();
    };

    date_rows(sheet)
        .filter(|(_, date)| date.year() == month.year() && date.month() == month.month())
        .filter(|&(row, _)| {
            block
                .columns()
                .any(|col| !value_at(sheet, row, col).is_blank())
        })
        .map(|(_, date)| date)
        .collect()
}
