//! Transfer configuration

use crate::error::{Result, StashError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

/// Knobs of the transfer engine
///
/// # Examples
///
/// ```
/// use stashkit::TransferConfig;
///
/// let config = TransferConfig::from_toml_str(r#"overflow_page_name = "Loot""#).unwrap();
/// assert_eq!(config.overflow_page_name, "Loot");
/// assert_eq!(config.native_item_version, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TransferConfig {
    /// Name of pages created while filling a legacy stash
    #[validate(length(min = 1, max = 32))]
    pub overflow_page_name: String,

    /// Item version written when converting to the legacy layout (10 bits)
    #[validate(range(max = 1023))]
    pub legacy_item_version: u16,

    /// Item version written when converting to the native layout (3 bits)
    #[validate(range(max = 7))]
    pub native_item_version: u8,

    /// Open a fresh overflow page before a bulk transfer into a legacy stash
    pub create_lead_page: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig {
            overflow_page_name: "Transferred".to_string(),
            legacy_item_version: 101,
            native_item_version: 5,
            create_lead_page: true,
        }
    }
}

impl TransferConfig {
    /// Parse and validate a TOML document; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: TransferConfig = toml::from_str(text)?;
        config.validated()
    }

    /// Load and validate a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check field constraints
    pub fn validated(self) -> Result<Self> {
        self.validate()
            .map_err(|e| StashError::Config(e.to_string()))?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TransferConfig::default();
        assert_eq!(config.overflow_page_name, "Transferred");
        assert_eq!(config.legacy_item_version, 101);
        assert_eq!(config.native_item_version, 5);
        assert!(config.create_lead_page);
        assert!(config.validated().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = TransferConfig::from_toml_str("create_lead_page = false").unwrap();
        assert!(!config.create_lead_page);
        assert_eq!(config.overflow_page_name, "Transferred");
    }

    #[test]
    fn test_out_of_range_rejected() {
        let result = TransferConfig::from_toml_str("native_item_version = 8");
        assert!(matches!(result, Err(StashError::Config(_))));

        let result = TransferConfig::from_toml_str("legacy_item_version = 1024");
        assert!(matches!(result, Err(StashError::Config(_))));

        let result = TransferConfig::from_toml_str(r#"overflow_page_name = """#);
        assert!(matches!(result, Err(StashError::Config(_))));
    }

    #[test]
    fn test_malformed_toml() {
        let result = TransferConfig::from_toml_str("overflow_page_name = ");
        assert!(matches!(result, Err(StashError::Toml(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "overflow_page_name = \"Mules\"").unwrap();
        writeln!(file, "legacy_item_version = 100").unwrap();

        let config = TransferConfig::from_file(file.path()).unwrap();
        assert_eq!(config.overflow_page_name, "Mules");
        assert_eq!(config.legacy_item_version, 100);

        let missing = TransferConfig::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(StashError::Io(_))));
    }
}
