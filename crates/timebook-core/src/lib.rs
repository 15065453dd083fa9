//! # timebook-core
//!
//! The sheet model the booking engine reads and writes: typed cell values,
//! A1 references and merges, worksheets that remember which cells were
//! written, and a workbook holding them in tab order.
//!
//! Rows and columns are 0-based throughout this crate.
//!
//! ```rust
//! use timebook_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::empty();
//! let januar = workbook.add_worksheet_with_name("Januar").unwrap();
//! let sheet = workbook.worksheet_mut(januar).unwrap();
//!
//! sheet.set_cell_value("F3", "Max").unwrap();
//! sheet.set_cell_value_at(9, 5, CellValue::Number(3.5)).unwrap();
//!
//! assert_eq!(sheet.get_value("F10").unwrap().as_number(), Some(3.5));
//! assert_eq!(sheet.edited_cells().count(), 2);
//! ```

pub mod cell;
pub mod error;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue};
pub use error::{Error, Result};
pub use workbook::{Workbook, WorkbookSettings};
pub use worksheet::Worksheet;

/// Rows per sheet in the OOXML grid
pub const MAX_ROWS: u32 = 1_048_576;

/// Columns per sheet (`A` through `XFD`)
pub const MAX_COLS: u16 = 16_384;

/// Longest tab name Excel accepts
pub const MAX_SHEET_NAME_LEN: usize = 31;
