//! Cells: references, values, and the sparse store behind a worksheet

mod address;
mod storage;
mod value;

pub use address::{CellAddress, CellRange};
pub use storage::{CellData, CellStorage};
pub use value::{CellError, CellValue};
