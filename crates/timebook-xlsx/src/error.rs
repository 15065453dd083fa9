//! Package read/write errors

use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

#[derive(Debug, Error)]
pub enum XlsxError {
    /// Opening, reading or replacing the file; a workbook locked by Excel
    /// shows up here
    #[error("file access failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a readable zip package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed xml: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Structurally valid xml that does not describe a workbook
    #[error("not a workbook: {0}")]
    InvalidFormat(String),

    #[error("package has no part '{0}'")]
    MissingPart(String),

    /// A value inside a part could not be decoded
    #[error("cannot decode {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] timebook_core::Error),
}
