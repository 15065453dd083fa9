//! # timebook-xlsx
//!
//! Reads `.xlsx`/`.xlsm` workbooks into the timebook-core model and writes
//! them back by patching only the cells that were edited. Every other part
//! of the package (the VBA project, styles, drawings, ...) is written back
//! unchanged, except that a calc chain listing an overwritten formula cell
//! is removed.

pub mod document;
pub mod error;
pub mod numfmt;
pub mod package;
pub mod patch;
pub mod reader;

mod calc_chain;
mod styles;

pub use document::XlsmDocument;
pub use error::{XlsxError, XlsxResult};
pub use package::Package;
pub use reader::{SheetEntry, XlsxReader};
