//! Column metadata

use crate::cell::{CellType, ResolvedCell};
use crate::style::{NumberFormat, StyleDescriptor};

/// A column's declared type and number format.
///
/// Declared once per column at registration time; every cell written to the column is resolved
/// against it individually.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnMetadata {
    /// Declared cell type
    pub cell_type: CellType,
    /// Number format applied to cells that parse under `cell_type`
    pub number_format: NumberFormat,
}

impl ColumnMetadata {
    /// Create metadata with an explicit number format
    pub fn new(cell_type: CellType, number_format: NumberFormat) -> Self {
        Self {
            cell_type,
            number_format,
        }
    }

    /// Text column
    pub fn string() -> Self {
        CellType::String.into()
    }

    /// General numeric column
    pub fn numeric() -> Self {
        CellType::Numeric.into()
    }

    /// Whole numbers with format `0`
    pub fn integer() -> Self {
        CellType::Integer.into()
    }

    /// Two-decimal numbers with format `0.00`
    pub fn decimal() -> Self {
        CellType::Decimal.into()
    }

    /// Dates with the built-in short date format
    pub fn date() -> Self {
        CellType::Date.into()
    }

    /// Replace the number format
    pub fn with_number_format(mut self, number_format: NumberFormat) -> Self {
        self.number_format = number_format;
        self
    }

    /// Descriptor for cells accepted by this column; `None` for text columns, which use the
    /// built-in default style.
    pub fn descriptor(&self) -> Option<StyleDescriptor> {
        match self.cell_type.normalized() {
            CellType::InlineString => None,
            cell_type => Some(StyleDescriptor::new(cell_type, self.number_format.clone())),
        }
    }

    /// Resolve a raw value against this column
    pub fn resolve<'a>(&self, raw: &'a str) -> ResolvedCell<'a> {
        ResolvedCell::resolve(raw, Some(self))
    }
}

impl From<CellType> for ColumnMetadata {
    fn from(cell_type: CellType) -> Self {
        Self::new(cell_type, cell_type.default_number_format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(ColumnMetadata::decimal().number_format.format_string(), "0.00");
        assert_eq!(ColumnMetadata::integer().number_format.format_string(), "0");
        assert_eq!(ColumnMetadata::date().number_format.format_string(), "mm-dd-yy");
        assert_eq!(ColumnMetadata::numeric().number_format, NumberFormat::General);
    }

    #[test]
    fn test_string_columns_have_no_descriptor() {
        assert_eq!(ColumnMetadata::string().descriptor(), None);
        assert_eq!(ColumnMetadata::from(CellType::InlineString).descriptor(), None);
        assert_eq!(
            ColumnMetadata::decimal().descriptor(),
            Some(StyleDescriptor::new(CellType::Decimal, NumberFormat::decimal()))
        );
    }
}
