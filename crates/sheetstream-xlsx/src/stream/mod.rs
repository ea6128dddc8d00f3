//! Streaming XLSX writer
//!
//! Sheets and their column typing are registered on a [`StreamBuilder`] before any byte is
//! written. [`StreamBuilder::build`] hands out a [`StreamWriter`] that appends rows to one sheet
//! part at a time, advancing forward only, and writes the rest of the package on
//! [`StreamWriter::close`].
//!
//! ```rust
//! use std::io::Cursor;
//! use sheetstream_core::CellType;
//! use sheetstream_xlsx::{StreamBuilder, XlsxReader};
//!
//! let mut builder = StreamBuilder::new(Cursor::new(Vec::new()));
//! builder.add_sheet("Prices", &[None, Some(CellType::Decimal)]).unwrap();
//!
//! let mut writer = builder.build().unwrap();
//! writer.write(&["Taco", "300"]).unwrap();
//! let sink = writer.close().unwrap();
//!
//! let workbook = XlsxReader::read(Cursor::new(sink.into_inner())).unwrap();
//! assert_eq!(workbook.sheets[0].values(), vec![vec!["Taco", "300.00"]]);
//! ```

mod builder;
mod sheet;
mod writer;

pub use builder::StreamBuilder;
pub use writer::StreamWriter;

pub(crate) use sheet::SheetState;

use sheetstream_core::{CellType, ColumnMetadata};

/// Registration data for one sheet, fixed once the writer is built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRegistration {
    name: String,
    columns: Vec<Option<ColumnMetadata>>,
    auto_filter: bool,
}

impl SheetRegistration {
    /// A sheet with no declared columns and no auto-filter
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            auto_filter: false,
        }
    }

    /// Declare column metadata; `None` columns infer their cell types
    pub fn columns(mut self, columns: Vec<Option<ColumnMetadata>>) -> Self {
        self.columns = columns;
        self
    }

    /// Declare column types, each with its default number format
    pub fn column_types(mut self, types: &[Option<CellType>]) -> Self {
        self.columns = types.iter().map(|t| t.map(ColumnMetadata::from)).collect();
        self
    }

    /// Filter the written extent of the sheet
    pub fn auto_filter(mut self, enabled: bool) -> Self {
        self.auto_filter = enabled;
        self
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared column metadata, in column order
    pub fn declared_columns(&self) -> &[Option<ColumnMetadata>] {
        &self.columns
    }

    /// Metadata declared for a column
    pub fn column(&self, index: usize) -> Option<&ColumnMetadata> {
        self.columns.get(index).and_then(Option::as_ref)
    }

    /// Whether the sheet gets an auto-filter
    pub fn has_auto_filter(&self) -> bool {
        self.auto_filter
    }
}

/// A cell of a row written with [`StreamWriter::write_cells`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCell {
    /// Raw text value
    pub value: String,
    /// Metadata overriding the column's declaration for this cell only
    pub metadata: Option<ColumnMetadata>,
}

impl StreamCell {
    /// A cell typed by its column
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self {
            value: value.into(),
            metadata: None,
        }
    }

    /// A cell carrying its own metadata
    pub fn typed<S: Into<String>>(value: S, metadata: ColumnMetadata) -> Self {
        Self {
            value: value.into(),
            metadata: Some(metadata),
        }
    }
}

impl From<&str> for StreamCell {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StreamCell {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// A row of raw values accepted by [`StreamWriter::write_all`].
///
/// Implemented for slices, arrays, vectors of anything `AsRef<str>`, and references to those.
pub trait StreamRow {
    /// Value type of the row's cells
    type Value: AsRef<str>;

    /// The row's values in column order
    fn values(&self) -> &[Self::Value];
}

impl<S: AsRef<str>> StreamRow for [S] {
    type Value = S;

    fn values(&self) -> &[S] {
        self
    }
}

impl<S: AsRef<str>, const N: usize> StreamRow for [S; N] {
    type Value = S;

    fn values(&self) -> &[S] {
        self
    }
}

impl<S: AsRef<str>> StreamRow for Vec<S> {
    type Value = S;

    fn values(&self) -> &[S] {
        self
    }
}

impl<R: StreamRow + ?Sized> StreamRow for &R {
    type Value = R::Value;

    fn values(&self) -> &[R::Value] {
        (**self).values()
    }
}
