//! Checksums for layer schema documents

use sha2::{Digest, Sha256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA256 checksum of a schema document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from a parsed document, independent of its formatting
    pub fn from_json(value: &serde_json::Value) -> Self {
        let canonical = serde_json::to_string(value).unwrap_or_default();
        Self::from_bytes(canonical.as_bytes())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checksum_ignores_formatting() {
        let compact: serde_json::Value = serde_json::from_str(r#"{"layer":"api"}"#).unwrap();
        let spaced: serde_json::Value = serde_json::from_str("{ \"layer\" :  \"api\" }").unwrap();
        assert_eq!(Checksum::from_json(&compact), Checksum::from_json(&spaced));
    }

    #[test]
    fn test_checksum_different_content() {
        let a = Checksum::from_json(&json!({"layer": "api"}));
        let b = Checksum::from_json(&json!({"layer": "ux"}));
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }
}
