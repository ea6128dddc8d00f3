//! Style registry: descriptor to style ID assignment
//!
//! Cells reference style IDs while rows are still being streamed, long before the style table
//! is written. The registry hands out IDs in first-seen order and never renumbers, so the table
//! produced by [`StyleRegistry::finalize`] carries exactly the IDs already referenced.

use ahash::AHashMap;

use super::NumberFormat;
use crate::cell::CellType;

/// The (cell type, number format) pair that determines one style table entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleDescriptor {
    /// Declared cell type (normalized)
    pub cell_type: CellType,
    /// Number format
    pub number_format: NumberFormat,
}

impl StyleDescriptor {
    /// Create a descriptor; `String` is normalized to `InlineString`
    pub fn new(cell_type: CellType, number_format: NumberFormat) -> Self {
        Self {
            cell_type: cell_type.normalized(),
            number_format,
        }
    }

    /// Descriptor of the built-in style at ID 0
    pub fn builtin_default() -> Self {
        Self::new(CellType::InlineString, NumberFormat::General)
    }

    /// Descriptor of numbers found in undeclared columns
    pub fn inferred_numeric() -> Self {
        Self::new(CellType::Numeric, NumberFormat::General)
    }
}

/// One finalized registry entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleEntry {
    /// Style ID referenced by cells (`s` attribute)
    pub id: u32,
    /// What the style renders
    pub descriptor: StyleDescriptor,
}

/// Deduplicating, append-only mapping from descriptor to style ID.
///
/// ID 0 is the built-in default style. Document-specific descriptors get
/// `BASELINE`, `BASELINE + 1`, ... in order of first [`ensure`](Self::ensure).
#[derive(Debug, Default)]
pub struct StyleRegistry {
    /// Registered descriptors; position `i` holds ID `BASELINE + i`
    entries: Vec<StyleDescriptor>,
    /// Fast lookup for deduplication
    index: AHashMap<StyleDescriptor, u32>,
}

impl StyleRegistry {
    /// Number of built-in styles preceding document-specific ones
    pub const BASELINE: u32 = 1;

    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or assign the style ID for a descriptor.
    ///
    /// Returns the existing ID for a descriptor seen before, otherwise the next sequential ID.
    pub fn ensure(&mut self, descriptor: &StyleDescriptor) -> u32 {
        if let Some(&id) = self.index.get(descriptor) {
            return id;
        }

        let id = Self::BASELINE + self.entries.len() as u32;
        log::trace!(
            "style {} assigned to {:?} / {}",
            id,
            descriptor.cell_type,
            descriptor.number_format.format_string()
        );
        self.entries.push(descriptor.clone());
        self.index.insert(descriptor.clone(), id);
        id
    }

    /// Look up an already assigned ID
    pub fn get(&self, descriptor: &StyleDescriptor) -> Option<u32> {
        self.index.get(descriptor).copied()
    }

    /// Size of the style table this registry produces (baseline included)
    pub fn len(&self) -> usize {
        Self::BASELINE as usize + self.entries.len()
    }

    /// Check if no document-specific style has been assigned
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over assigned styles in ID order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &StyleDescriptor)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, d)| (Self::BASELINE + i as u32, d))
    }

    /// Freeze the registry into its entries, in ID order
    pub fn finalize(self) -> Vec<StyleEntry> {
        self.entries
            .into_iter()
            .enumerate()
            .map(|(i, descriptor)| StyleEntry {
                id: Self::BASELINE + i as u32,
                descriptor,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnMetadata;
    use pretty_assertions::assert_eq;

    fn descriptor(metadata: ColumnMetadata) -> StyleDescriptor {
        metadata.descriptor().unwrap()
    }

    #[test]
    fn test_empty_registry() {
        let registry = StyleRegistry::new();
        assert_eq!(registry.len(), 1);
        assert!(registry.is_empty());
        assert!(registry.finalize().is_empty());
    }

    #[test]
    fn test_deduplication() {
        let mut registry = StyleRegistry::new();

        let decimal = descriptor(ColumnMetadata::decimal());
        let integer = descriptor(ColumnMetadata::integer());

        assert_eq!(registry.ensure(&decimal), 1);
        assert_eq!(registry.ensure(&integer), 2);
        assert_eq!(registry.ensure(&decimal), 1);
        assert_eq!(registry.ensure(&integer), 2);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(&decimal), Some(1));
        assert_eq!(registry.get(&StyleDescriptor::inferred_numeric()), None);
    }

    #[test]
    fn test_same_format_different_type_is_distinct() {
        let mut registry = StyleRegistry::new();
        let numeric = StyleDescriptor::new(CellType::Numeric, NumberFormat::decimal());
        let decimal = StyleDescriptor::new(CellType::Decimal, NumberFormat::decimal());

        assert_ne!(registry.ensure(&numeric), registry.ensure(&decimal));
    }

    #[test]
    fn test_finalize_preserves_first_seen_order() {
        let order = [
            descriptor(ColumnMetadata::date()),
            StyleDescriptor::inferred_numeric(),
            descriptor(ColumnMetadata::decimal()),
            descriptor(ColumnMetadata::date()),
        ];

        let mut registry = StyleRegistry::new();
        let assigned: Vec<u32> = order.iter().map(|d| registry.ensure(d)).collect();
        assert_eq!(assigned, vec![1, 2, 3, 1]);

        assert_eq!(
            registry.finalize(),
            vec![
                StyleEntry {
                    id: 1,
                    descriptor: order[0].clone(),
                },
                StyleEntry {
                    id: 2,
                    descriptor: order[1].clone(),
                },
                StyleEntry {
                    id: 3,
                    descriptor: order[2].clone(),
                },
            ]
        );
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let run = || {
            let mut registry = StyleRegistry::new();
            let ids: Vec<u32> = [
                ColumnMetadata::integer(),
                ColumnMetadata::decimal(),
                ColumnMetadata::integer(),
            ]
            .into_iter()
            .map(|m| registry.ensure(&descriptor(m)))
            .collect();
            (ids, registry.len())
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_string_type_is_normalized() {
        let mut registry = StyleRegistry::new();
        let a = StyleDescriptor::new(CellType::String, NumberFormat::from_string("@"));
        let b = StyleDescriptor::new(CellType::InlineString, NumberFormat::from_string("@"));
        assert_eq!(registry.ensure(&a), registry.ensure(&b));
    }
}
