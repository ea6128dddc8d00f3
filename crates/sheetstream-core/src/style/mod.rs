//! Style types
//!
//! Only number-format driven styling is modeled: a cell's style is fully determined by its
//! [`StyleDescriptor`].

mod number_format;
mod registry;

pub use number_format::NumberFormat;
pub use registry::{StyleDescriptor, StyleEntry, StyleRegistry};
