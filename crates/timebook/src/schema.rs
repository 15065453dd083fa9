//! Fixed layout of the time-sheet workbook
//!
//! All rows and columns in this module and in the public API of this crate
//! are 1-based spreadsheet coordinates (`A1` is row 1, column 1). The model
//! in `timebook-core` is 0-based; [`value_at`] and [`set_value_at`] are the
//! only places that translate between the two.

use timebook_core::{CellValue, Worksheet};

/// Sheet holding the employee, project and absence-type lists
pub const SETTINGS_SHEET: &str = "Anpassung";

/// Settings column listing employees (M)
pub const EMPLOYEE_LIST_COLUMN: u16 = 13;

/// Settings column listing projects (N)
pub const PROJECT_LIST_COLUMN: u16 = 14;

/// Settings column listing absence types (P)
pub const ABSENCE_LIST_COLUMN: u16 = 16;

/// First row of the settings lists
pub const LIST_FIRST_ROW: u32 = 4;

/// Month sheet row carrying the employee labels
pub const HEADER_ROW: u32 = 3;

/// Month sheet row carrying the project labels of each block
pub const SUBHEADER_ROW: u32 = 4;

/// First column of the first employee block (F)
pub const FIRST_EMPLOYEE_COLUMN: u16 = 6;

/// First date row of a month sheet
pub const DATE_FIRST_ROW: u32 = 5;

/// Column holding the dates of a month sheet (C)
pub const DATE_COLUMN: u16 = 3;

/// Consecutive empty header labels after which the block scan gives up
pub const MAX_EMPTY_HEADERS: usize = 15;

/// Borrow the value at a 1-based (row, column), `Empty` when absent
pub fn value_at(sheet: &Worksheet, row: u32, col: u16) -> &CellValue {
    const EMPTY: &CellValue = &CellValue::Empty;
    match (row.checked_sub(1), col.checked_sub(1)) {
        (Some(r), Some(c)) => sheet.value_ref_at(r, c),
        _ => EMPTY,
    }
}

/// Set the value at a 1-based (row, column), keeping the cell's style
pub fn set_value_at<V: Into<CellValue>>(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: V,
) -> timebook_core::Result<()> {
    let r = row
        .checked_sub(1)
        .ok_or(timebook_core::Error::RowOutOfBounds(row, timebook_core::MAX_ROWS))?;
    let c = col
        .checked_sub(1)
        .ok_or(timebook_core::Error::ColumnOutOfBounds(col, timebook_core::MAX_COLS))?;
    sheet.set_cell_value_at(r, c, value)
}

/// Last used row, 1-based
pub fn last_row(sheet: &Worksheet) -> u32 {
    sheet.last_row() + 1
}

/// Last used column, 1-based
pub fn last_column(sheet: &Worksheet) -> u16 {
    sheet.last_col() + 1
}

/// Merged region covering a 1-based cell, as `(top_row, first_col, last_col)`
pub fn merged_span(sheet: &Worksheet, row: u32, col: u16) -> Option<(u32, u16, u16)> {
    let region = sheet.merged_region_at(row.checked_sub(1)?, col.checked_sub(1)?)?;
    Some((region.start.row + 1, region.start.col + 1, region.end.col + 1))
}

/// Normalize a name for comparison: trimmed, lowercase
pub fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Text of a cell as a label, trimmed
pub fn label_of(value: &CellValue) -> String {
    value.to_text().trim().to_string()
}
