//! Employee block resolution on month sheets
//!
//! Each employee owns a run of adjacent columns below a (usually merged)
//! label in the header row. Every column but the last is a project column
//! labeled in the subheader row; the last column holds absence types.

use std::ops::{Range, RangeInclusive};

use timebook_core::Worksheet;

use crate::schema::{
    label_of, last_column, merged_span, normalize, value_at, FIRST_EMPLOYEE_COLUMN, HEADER_ROW,
    MAX_EMPTY_HEADERS, SUBHEADER_ROW,
};

/// An employee's column block on a month sheet (1-based columns)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployeeBlock {
    /// First column of the block
    pub start_column: u16,
    /// Number of columns, at least 1
    pub width: u16,
}

impl EmployeeBlock {
    /// Create a block; a zero width is widened to one column
    pub fn new(start_column: u16, width: u16) -> Self {
        Self {
            start_column,
            width: width.max(1),
        }
    }

    /// The absence column, always the block's last column
    pub fn absence_column(&self) -> u16 {
        self.start_column + self.width - 1
    }

    /// Project columns, every column before the absence column
    pub fn project_columns(&self) -> Range<u16> {
        self.start_column..self.absence_column()
    }

    /// All columns of the block
    pub fn columns(&self) -> RangeInclusive<u16> {
        self.start_column..=self.absence_column()
    }
}

/// A header label together with the columns it spans
struct HeaderCell {
    label: String,
    start: u16,
    width: u16,
}

fn header_cell(sheet: &Worksheet, col: u16) -> HeaderCell {
    match merged_span(sheet, HEADER_ROW, col) {
        Some((top, first, last)) => HeaderCell {
            label: label_of(value_at(sheet, top, first)),
            start: first,
            width: last - first + 1,
        },
        None => HeaderCell {
            label: label_of(value_at(sheet, HEADER_ROW, col)),
            start: col,
            width: 1,
        },
    }
}

/// Find the column block of `employee` on a month sheet.
///
/// The header row is scanned from the first employee column. A merged label
/// spans its whole region, which also gives the block width. The scan ends
/// at the last used column, or after [`MAX_EMPTY_HEADERS`] consecutive empty
/// labels. Names compare trimmed and case-insensitively.
pub fn resolve_employee_block(sheet: &Worksheet, employee: &str) -> Option<EmployeeBlock> {
    let wanted = normalize(employee);
    if wanted.is_empty() {
        return None;
    }

    let last = last_column(sheet);
    let mut col = FIRST_EMPLOYEE_COLUMN;
    let mut empty_run = 0;

    while col <= last {
        let cell = header_cell(sheet, col);

        if cell.label.is_empty() {
            empty_run += 1;
            if empty_run >= MAX_EMPTY_HEADERS {
                return None;
            }
        } else {
            empty_run = 0;
            if normalize(&cell.label) == wanted {
                return Some(EmployeeBlock::new(cell.start, cell.width));
            }
        }

        col = cell.start.saturating_add(cell.width).max(col + 1);
    }

    None
}

/// Find the column of `project` within a block's project columns.
///
/// The absence column is never a candidate, so a single-column block has
/// no project columns at all.
pub fn resolve_project_column(
    sheet: &Worksheet,
    block: &EmployeeBlock,
    project: &str,
) -> Option<u16> {
    let wanted = normalize(project);
    if wanted.is_empty() {
        return None;
    }

    block
        .project_columns()
        .find(|&col| normalize(&label_of(value_at(sheet, SUBHEADER_ROW, col))) == wanted)
}
