//! Strongly-typed identifier types for the IdeaForge domain.
//!
//! Every aggregate gets its own identifier newtype so an `IdeaId` can never
//! be passed where a `DocumentId` is expected. All IDs use UUID v7 so that
//! freshly generated identifiers sort by creation time.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh, time-ordered identifier.
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID.
            #[inline]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Borrow the underlying UUID.
            #[inline]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Unwrap into the underlying UUID.
            #[inline]
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(IdeaId, "Unique identifier for ideas (aggregate root)");

define_id!(
    DocumentId,
    "Unique identifier for a single document version row"
);

define_id!(AnalysisId, "Unique identifier for analyses");

define_id!(
    TransactionId,
    "Unique identifier for credit ledger transactions"
);

define_id!(UserId, "Unique identifier for user accounts");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation_is_nonempty() {
        let id = IdeaId::new();
        assert_ne!(id.to_string(), "");
    }

    #[test]
    fn test_id_equality_is_structural() {
        let uuid = Uuid::now_v7();
        let a = DocumentId::from_uuid(uuid);
        let b = DocumentId::from_uuid(uuid);
        assert_eq!(a, b);
    }

    #[test]
    fn test_id_roundtrips_through_string() {
        let id = AnalysisId::new();
        let parsed: AnalysisId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_serialization_is_transparent() {
        let id = UserId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_v7_ids_sort_by_creation() {
        let first = TransactionId::new();
        let second = TransactionId::new();
        assert!(first <= second);
    }
}
