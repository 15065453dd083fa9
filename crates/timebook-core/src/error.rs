//! Model errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bad cell reference: {0}")]
    InvalidAddress(String),

    #[error("bad cell range: {0}")]
    InvalidRange(String),

    #[error("row {0} is beyond the last row {1}")]
    RowOutOfBounds(u32, u32),

    #[error("column {0} is beyond the last column {1}")]
    ColumnOutOfBounds(u16, u16),

    #[error("no sheet named '{0}'")]
    SheetNotFound(String),

    #[error("bad sheet name {0}")]
    InvalidSheetName(String),

    /// Tab names are unique ignoring case
    #[error("a sheet named '{0}' already exists")]
    DuplicateSheetName(String),

    #[error("merge {0} overlaps an existing merge")]
    MergedCellConflict(String),
}
