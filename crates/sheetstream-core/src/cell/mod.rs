//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellType`] - The kind of a cell and how raw text resolves to it
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")

mod address;
mod cell_type;

pub use address::{CellAddress, CellRange};
pub use cell_type::{CellType, ResolvedCell};
