//! Linear document versioning.
//!
//! Documents are versioned by a simple monotonically increasing counter:
//! the first version of a (idea, document type) pair is 1 and every
//! content-replacing edit claims exactly the next integer. Prior versions
//! are retained forever, so "latest" is always a query, never a flag.

use crate::errors::InvalidValue;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Position of a document in its edit history, starting at 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct DocumentVersion(u32);

impl DocumentVersion {
    /// The version every document history starts at.
    pub const FIRST: DocumentVersion = DocumentVersion(1);

    /// Construct a version, rejecting zero.
    pub fn new(value: u32) -> Result<Self, InvalidValue> {
        if value == 0 {
            return Err(InvalidValue::InvalidVersion {
                value: i64::from(value),
            });
        }
        Ok(Self(value))
    }

    /// The version that follows this one.
    ///
    /// Never mutates the receiver; claiming the slot is the store's job.
    #[must_use]
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// The raw version number.
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Whether this is the initial version.
    pub fn is_first(&self) -> bool {
        self.0 == 1
    }
}

impl Default for DocumentVersion {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u32> for DocumentVersion {
    type Error = InvalidValue;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DocumentVersion> for u32 {
    fn from(version: DocumentVersion) -> Self {
        version.0
    }
}

impl TryFrom<i64> for DocumentVersion {
    type Error = InvalidValue;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map_err(|_| InvalidValue::InvalidVersion { value })
            .and_then(Self::new)
    }
}

impl Display for DocumentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_start_at_one() {
        assert_eq!(DocumentVersion::FIRST.value(), 1);
        assert!(DocumentVersion::FIRST.is_first());
        assert!(DocumentVersion::new(0).is_err());
    }

    #[test]
    fn test_next_does_not_mutate() {
        let v1 = DocumentVersion::FIRST;
        let v2 = v1.next();
        assert_eq!(v1.value(), 1);
        assert_eq!(v2.value(), 2);
        assert!(!v2.is_first());
    }

    #[test]
    fn test_ordering() {
        assert!(DocumentVersion::FIRST < DocumentVersion::FIRST.next());
    }

    #[test]
    fn test_try_from_i64() {
        assert_eq!(DocumentVersion::try_from(3i64).unwrap().value(), 3);
        assert!(DocumentVersion::try_from(0i64).is_err());
        assert!(DocumentVersion::try_from(-1i64).is_err());
    }

    #[test]
    fn test_serde_rejects_zero() {
        assert!(serde_json::from_str::<DocumentVersion>("0").is_err());
        let v: DocumentVersion = serde_json::from_str("4").unwrap();
        assert_eq!(v.value(), 4);
    }
}
