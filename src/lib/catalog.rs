//! Ordered transcript and barcode catalogs.

use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Ordered transcript names with name→index lookup.
///
/// Immutable once built; clones share storage.
#[derive(Debug, Clone)]
pub struct TranscriptCatalog {
    names: Arc<Vec<String>>,
    index: Arc<FxHashMap<String, u32>>,
}

impl TranscriptCatalog {
    /// Build the catalog from names in file order; the index of a transcript
    /// is its position in the input.
    pub fn from_names(names: Vec<String>) -> Self {
        let mut index = FxHashMap::with_capacity_and_hasher(names.len(), Default::default());
        for (i, name) in names.iter().enumerate() {
            index.insert(name.clone(), i as u32);
        }

        Self {
            names: Arc::new(names),
            index: Arc::new(index),
        }
    }

    /// Lookup the index for a transcript name if present.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    /// Retrieve a transcript name by index.
    #[inline]
    pub fn name_of(&self, index: u32) -> Option<&str> {
        self.names.get(index as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Borrow the ordered names without cloning.
    pub fn names(&self) -> &[String] {
        self.names.as_ref()
    }
}

/// Ordered cell barcode strings read from the equivalence-class file.
#[derive(Debug, Clone)]
pub struct BarcodeCatalog {
    barcodes: Arc<Vec<String>>,
}

impl BarcodeCatalog {
    pub fn from_names(barcodes: Vec<String>) -> Self {
        Self {
            barcodes: Arc::new(barcodes),
        }
    }

    /// Retrieve a barcode string by index.
    #[inline]
    pub fn name_of(&self, index: u32) -> Option<&str> {
        self.barcodes.get(index as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }

    /// Borrow the ordered barcodes without cloning.
    pub fn names(&self) -> &[String] {
        self.barcodes.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_index_round_trips() {
        let catalog =
            TranscriptCatalog::from_names(vec!["T1".to_string(), "T2".to_string(), "T3".to_string()]);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.index_of("T2"), Some(1));
        assert_eq!(catalog.name_of(1), Some("T2"));
        assert_eq!(catalog.index_of("T9"), None);
        assert_eq!(catalog.name_of(3), None);
    }

    #[test]
    fn barcode_lookup_by_index() {
        let catalog = BarcodeCatalog::from_names(vec!["AACC".to_string(), "GGTT".to_string()]);
        assert_eq!(catalog.name_of(0), Some("AACC"));
        assert_eq!(catalog.name_of(2), None);
        assert_eq!(catalog.names().len(), 2);
    }
}
