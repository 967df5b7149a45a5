//! Style table owned by one workbook.

use crate::conf::{EnumStylePreset, derive_style_preset};
use crate::spec::{SpecCellFormat, StyleHandle};

/// Append-only table of registered cell formats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleRegistry {
    l_styles: Vec<SpecCellFormat>,
}

impl StyleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a format and return its handle.
    ///
    /// Registering an equal format twice yields two distinct, usable handles.
    pub fn register(&mut self, spec: SpecCellFormat) -> StyleHandle {
        self.l_styles.push(spec);
        StyleHandle(self.l_styles.len() - 1)
    }

    /// Register one of the built-in presets.
    pub fn register_preset(&mut self, preset: EnumStylePreset) -> StyleHandle {
        self.register(derive_style_preset(preset))
    }

    /// Look up a registered format.
    pub fn get(&self, handle: StyleHandle) -> Option<&SpecCellFormat> {
        self.l_styles.get(handle.0)
    }

    /// Number of registered formats.
    pub fn len(&self) -> usize {
        self.l_styles.len()
    }

    /// Return whether no format has been registered.
    pub fn is_empty(&self) -> bool {
        self.l_styles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_duplicates_yield_distinct_handles() {
        let mut registry = StyleRegistry::new();
        let h1 = registry.register_preset(EnumStylePreset::BorderedBlock);
        let h2 = registry.register_preset(EnumStylePreset::BorderedBlock);

        assert_ne!(h1, h2);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(h1), registry.get(h2));
    }

    #[test]
    fn test_get_unknown_handle_is_none() {
        let registry = StyleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.get(StyleHandle(3)), None);
    }
}
