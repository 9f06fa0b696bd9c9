//! Tests for document version sequencing.

use ideaforge_domain::document::{Document, DocumentType};
use ideaforge_domain::identifiers::{IdeaId, UserId};
use ideaforge_domain::version::DocumentVersion;
use proptest::prelude::*;
use serde_json::json;

#[test]
fn edit_chain_produces_contiguous_versions() {
    let mut doc = Document::new(
        IdeaId::new(),
        UserId::new(),
        DocumentType::Roadmap,
        "Roadmap",
        json!({"quarters": 4}),
    );

    for expected in 2u32..=10 {
        doc = doc.next_revision(None, Some(json!({ "quarters": expected })));
        assert_eq!(doc.version.value(), expected);
    }
}

#[test]
fn restore_never_rewinds_the_counter() {
    let v1 = Document::new(
        IdeaId::new(),
        UserId::new(),
        DocumentType::Prd,
        "PRD",
        json!({"a": 1}),
    );
    let v2 = v1.next_revision(None, Some(json!({"a": 2})));
    let v3 = v2.restored_from(&v1);

    assert_eq!(v3.version.value(), 3);
    assert_eq!(v3.content, v1.content);
}

proptest! {
    #[test]
    fn next_is_strictly_monotonic(start in 1u32..1_000_000) {
        let version = DocumentVersion::new(start).unwrap();
        prop_assert_eq!(version.next().value(), start + 1);
        prop_assert!(version < version.next());
    }

    #[test]
    fn zero_is_never_a_version(raw in any::<i64>()) {
        let result = DocumentVersion::try_from(raw);
        if raw >= 1 && raw <= i64::from(u32::MAX) {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(result.is_err());
        }
    }
}
