//! # sheetstream
//!
//! Write large spreadsheets without holding them in memory.
//!
//! Sheets and their column types are registered up front; rows are then streamed into the
//! document one sheet at a time, and the style table, workbook and package manifest are
//! written when the stream is closed.
//!
//! ## Features
//!
//! - Typed columns (integer, decimal, date, boolean, error) with per-cell fallback to text
//! - Type inference for undeclared columns
//! - Merged ranges and auto-filters
//! - Any `Write + Seek` sink, or a file path
//! - A reader for verifying written documents
//!
//! ## Example
//!
//! ```rust
//! use sheetstream::prelude::*;
//! use std::io::Cursor;
//!
//! let mut builder = StreamBuilder::new(Cursor::new(Vec::new()));
//! builder
//!     .add_sheet("Menu", &[None, None, Some(CellType::Decimal)])
//!     .unwrap();
//!
//! let mut writer = builder.build().unwrap();
//! writer.write(&["Token", "Name", "Price"]).unwrap();
//! writer.write(&["123", "Taco", "300"]).unwrap();
//! writer.add_merge_cells(0, 0, 0, 1).unwrap();
//! let sink = writer.close().unwrap();
//!
//! let workbook = XlsxReader::read(Cursor::new(sink.into_inner())).unwrap();
//! assert_eq!(workbook.sheet_names(), vec!["Menu"]);
//! assert_eq!(workbook.sheets[0].values()[1], vec!["123", "Taco", "300.00"]);
//! ```

pub mod prelude;

// Re-export core types
pub use sheetstream_core::{
    CellAddress, CellRange, CellType, ColumnMetadata, Error, NumberFormat, ResolvedCell, Result,
    StyleDescriptor, StyleEntry, StyleRegistry, MAX_COLS, MAX_ROWS,
};

// Re-export I/O types
pub use sheetstream_xlsx::{
    ReadCell, ReadSheet, ReadWorkbook, SheetRegistration, StreamBuilder, StreamCell,
    StreamOptions, StreamRow, StreamWriter, XlsxError, XlsxReader, XlsxResult,
};
