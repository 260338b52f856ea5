//! Base item footprints
//!
//! Footprints come from game data tables that are extracted elsewhere. The
//! engine only needs a lookup from item code to cell footprint.

use crate::allocator::Footprint;
use crate::error::{Result, StashError};
use crate::item::MAX_FOOTPRINT_SIDE;
use crate::validation::ItemCode;
use ahash::AHashMap;
use std::collections::BTreeMap;
use std::path::Path;

/// Footprint lookup by item code
pub trait ItemCatalog {
    fn footprint(&self, code: &ItemCode) -> Option<Footprint>;
}

/// In-memory catalog loaded from a JSON or TOML table
///
/// Both formats map an item code to `{ width, height }`:
///
/// ```
/// use stashkit::{Footprint, ItemCatalog, ItemCode, StaticCatalog};
///
/// let catalog = StaticCatalog::from_json_str(r#"{ "7cr": { "width": 2, "height": 4 } }"#).unwrap();
/// let code = ItemCode::new("7cr").unwrap();
/// assert_eq!(catalog.footprint(&code), Some(Footprint::new(2, 4)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: AHashMap<ItemCode, Footprint>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a footprint; both sides must be within 1..=4
    pub fn insert(&mut self, code: ItemCode, footprint: Footprint) -> Result<()> {
        let valid = 1..=MAX_FOOTPRINT_SIDE;
        if !valid.contains(&footprint.width) || !valid.contains(&footprint.height) {
            return Err(StashError::InvalidItem(format!(
                "catalog footprint {}x{} for {} outside 1..={}",
                footprint.width, footprint.height, code, MAX_FOOTPRINT_SIDE
            )));
        }
        self.entries.insert(code, footprint);
        Ok(())
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let table: BTreeMap<String, Footprint> = serde_json::from_str(text)?;
        Self::from_table(table)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: BTreeMap<String, Footprint> = toml::from_str(text)?;
        Self::from_table(table)
    }

    /// Load a catalog file, picking the format from the extension (`.toml` or JSON)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    fn from_table(table: BTreeMap<String, Footprint>) -> Result<Self> {
        let mut catalog = Self::new();
        for (code, footprint) in table {
            catalog.insert(ItemCode::new(code)?, footprint)?;
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ItemCatalog for StaticCatalog {
    fn footprint(&self, code: &ItemCode) -> Option<Footprint> {
        self.entries.get(code).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn code(s: &str) -> ItemCode {
        ItemCode::new(s).unwrap()
    }

    #[test]
    fn test_toml_table() {
        let catalog = StaticCatalog::from_toml_str(
            r#"
            [hp1]
            width = 1
            height = 1

            [7cr]
            width = 2
            height = 4
            "#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.footprint(&code("7cr")), Some(Footprint::new(2, 4)));
        assert_eq!(catalog.footprint(&code("r01")), None);
    }

    #[test]
    fn test_rejects_bad_entries() {
        let result = StaticCatalog::from_json_str(r#"{ "box": { "width": 5, "height": 1 } }"#);
        assert!(matches!(result, Err(StashError::InvalidItem(_))));

        let result = StaticCatalog::from_json_str(r#"{ "BAD!": { "width": 1, "height": 1 } }"#);
        assert!(matches!(result, Err(StashError::InvalidItemCode(_))));

        let result = StaticCatalog::from_json_str("[1, 2]");
        assert!(matches!(result, Err(StashError::Serialization(_))));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("items.json");
        std::fs::write(&json_path, r#"{ "jew": { "width": 1, "height": 1 } }"#).unwrap();
        assert_eq!(StaticCatalog::from_file(&json_path).unwrap().len(), 1);

        let toml_path = dir.path().join("items.toml");
        let mut file = std::fs::File::create(&toml_path).unwrap();
        writeln!(file, "[cap]\nwidth = 2\nheight = 2").unwrap();
        let catalog = StaticCatalog::from_file(&toml_path).unwrap();
        assert_eq!(catalog.footprint(&code("cap")), Some(Footprint::new(2, 2)));
    }
}
