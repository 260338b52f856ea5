//! Validation for item codes
//!
//! Item codes are the short base-type identifiers ("hp1", "r01", "7cr") used to
//! look up footprints and to group stackable items. Legacy records store them
//! space padded to four characters; the padding is not part of the code.

use crate::error::{Result, StashError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A validated item code
///
/// # Rules
/// - Lowercase letters (a-z) and digits (0-9) only
/// - 3 or 4 characters after trailing spaces are trimmed
///
/// # Examples
///
/// ```
/// use stashkit::ItemCode;
///
/// let code = ItemCode::new("hp1 ").unwrap();
/// assert_eq!(code.as_str(), "hp1");
///
/// assert!(ItemCode::new("HP1").is_err()); // uppercase
/// assert!(ItemCode::new("h").is_err()); // too short
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemCode(String);

impl ItemCode {
    /// Pattern for valid item codes
    const PATTERN: &'static str = r"^[a-z0-9]{3,4}$";

    /// Create a new validated code
    ///
    /// # Errors
    ///
    /// Returns `InvalidItemCode` if the code doesn't meet validation rules.
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        let trimmed = code.trim_end_matches(' ');
        Self::validate_code(trimmed)?;
        Ok(ItemCode(trimmed.to_string()))
    }

    fn validate_code(code: &str) -> Result<()> {
        if code.is_empty() {
            return Err(StashError::InvalidItemCode(
                "item code cannot be empty".to_string(),
            ));
        }

        if !code_pattern()?.is_match(code) {
            return Err(StashError::InvalidItemCode(format!(
                "'{}' must be 3-4 lowercase letters or digits",
                code
            )));
        }

        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn code_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(ItemCode::PATTERN))
        .as_ref()
        .map_err(|e| StashError::InvalidItemCode(format!("code pattern failed to compile: {}", e)))
}

impl TryFrom<String> for ItemCode {
    type Error = StashError;

    fn try_from(value: String) -> Result<Self> {
        ItemCode::new(value)
    }
}

impl From<ItemCode> for String {
    fn from(code: ItemCode) -> Self {
        code.0
    }
}

impl AsRef<str> for ItemCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_codes() {
        assert!(ItemCode::new("hp1").is_ok());
        assert!(ItemCode::new("r01").is_ok());
        assert!(ItemCode::new("7cr").is_ok());
        assert!(ItemCode::new("jew ").is_ok());
        assert!(ItemCode::new("abcd").is_ok());
    }

    #[test]
    fn test_invalid_codes() {
        assert!(ItemCode::new("").is_err());
        assert!(ItemCode::new("   ").is_err());
        assert!(ItemCode::new("ab").is_err());
        assert!(ItemCode::new("abcde").is_err());
        assert!(ItemCode::new("Hp1").is_err());
        assert!(ItemCode::new("h p1").is_err());
        assert!(ItemCode::new("hp_").is_err());
    }

    #[test]
    fn test_padding_trimmed() {
        let code = ItemCode::new("r01 ").unwrap();
        assert_eq!(code.as_str(), "r01");
        assert_eq!(code.to_string(), "r01");
    }

    #[test]
    fn test_serde_validates() {
        let json = serde_json::to_string(&ItemCode::new("hp1").unwrap()).unwrap();
        assert_eq!(json, "\"hp1\"");
        assert!(serde_json::from_str::<ItemCode>("\"HP!\"").is_err());
    }
}
