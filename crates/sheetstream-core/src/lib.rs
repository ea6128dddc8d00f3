//! # sheetstream-core
//!
//! Value types shared by the sheetstream writer and its verification reader:
//! - [`CellType`] - The closed set of cell kinds and the per-cell type resolution rules
//! - [`ColumnMetadata`] - A column's declared type and number format
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//! - [`NumberFormat`] - Built-in and custom number formats
//! - [`StyleRegistry`] - Deduplicating, append-only descriptor to style ID mapping
//!
//! ## Example
//!
//! ```rust
//! use sheetstream_core::{CellType, ColumnMetadata, StyleRegistry};
//!
//! let mut registry = StyleRegistry::new();
//! let decimal = ColumnMetadata::decimal();
//!
//! let resolved = decimal.resolve("300.0");
//! assert_eq!(resolved.value, "300.00");
//! assert_eq!(resolved.cell_type, CellType::Numeric);
//!
//! let id = registry.ensure(&resolved.descriptor.unwrap());
//! assert_eq!(id, StyleRegistry::BASELINE);
//! ```

pub mod cell;
pub mod column;
pub mod error;
pub mod style;

// Re-exports for convenience
pub use cell::{CellAddress, CellRange, CellType, ResolvedCell};
pub use column::ColumnMetadata;
pub use error::{Error, Result};
pub use style::{NumberFormat, StyleDescriptor, StyleEntry, StyleRegistry};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
