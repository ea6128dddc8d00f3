//! # sheetstream-xlsx
//!
//! Streaming XLSX (Office Open XML) writer for sheetstream, plus a reader for verifying what was
//! written.
//!
//! Sheet parts are appended to the ZIP container row by row; the style table, workbook and
//! package manifest follow once the last sheet is finished. Cells reference style IDs handed
//! out by a [`sheetstream_core::StyleRegistry`] while streaming, and the style table written at
//! close is that same registry, frozen.

pub mod error;
pub mod options;
pub mod reader;
pub mod stream;

mod escape;
mod package;
mod styles;

pub use error::{XlsxError, XlsxResult};
pub use options::StreamOptions;
pub use reader::{ReadCell, ReadSheet, ReadWorkbook, XlsxReader};
pub use stream::{SheetRegistration, StreamBuilder, StreamCell, StreamRow, StreamWriter};
