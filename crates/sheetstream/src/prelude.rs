//! Prelude module - common imports for sheetstream users
//!
//! ```rust
//! use sheetstream::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellRange,
    CellType,
    ColumnMetadata,
    NumberFormat,

    // Stream types
    SheetRegistration,
    StreamBuilder,
    StreamCell,
    StreamOptions,
    StreamRow,
    StreamWriter,

    // Reading back
    ReadCell,
    ReadSheet,
    ReadWorkbook,
    XlsxReader,

    // Error types
    XlsxError,
    XlsxResult,
};
