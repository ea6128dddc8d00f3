//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while streaming or reading XLSX documents
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] sheetstream_core::Error),

    /// A sheet with this name is already registered
    #[error("duplicate sheet name '{0}'.")]
    DuplicateSheetName(String),

    /// The name cannot be used for a worksheet
    #[error("invalid sheet name '{0}'")]
    InvalidSheetName(String),

    /// Registration or build attempted after a successful build
    #[error("the stream builder has already been built")]
    BuilderAlreadyBuilt,

    /// Build attempted with no sheet registered
    #[error("at least one sheet must be registered before building")]
    NoSheetsRegistered,

    /// `next_sheet` called on the last registered sheet
    #[error("already on last sheet")]
    AlreadyOnLastSheet,

    /// Row width differs from the width established by the sheet's first row
    #[error("wrong number of cells in row: expected {expected}, got {actual}")]
    WrongColumnCount {
        /// Established column count
        expected: usize,
        /// Cells in the rejected row
        actual: usize,
    },

    /// Operation attempted on a closed stream
    #[error("the stream has already been closed")]
    AlreadyClosed,
}
