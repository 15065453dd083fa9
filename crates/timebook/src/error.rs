//! Error types for the booking engine

use std::path::PathBuf;

use thiserror::Error;
use timebook_xlsx::XlsxError;

use crate::request::RequestError;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Operation-level failures.
///
/// Lookup misses on individual days are not errors; they are counted in a
/// [`WriteSummary`](crate::WriteSummary).
#[derive(Debug, Error)]
pub enum Error {
    /// The workbook could not be opened, even after retrying
    #[error(
        "workbook {} could not be opened after {attempts} attempt(s), it may be locked: {source}",
        path.display()
    )]
    Unavailable {
        path: PathBuf,
        attempts: u32,
        #[source]
        source: XlsxError,
    },

    /// Writing the workbook back failed
    #[error("failed to save workbook {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },

    /// The booking request is incomplete or inconsistent
    #[error("invalid booking: {0}")]
    Request(#[from] RequestError),
}
