//! Canned test data built on `fake`.

use fake::faker::company::en::{Buzzword, CatchPhrase};
use fake::faker::lorem::en::Sentence;
use fake::Fake;

use ideaforge_domain::analysis::Analysis;
use ideaforge_domain::category::HackathonTrack;
use ideaforge_domain::credit::CreditTransaction;
use ideaforge_domain::document::{Document, DocumentType};
use ideaforge_domain::idea::Idea;
use ideaforge_domain::identifiers::{IdeaId, UserId};
use ideaforge_domain::user::User;

use crate::builders::{AnalysisBuilder, DocumentBuilder, IdeaBuilder, UserBuilder};

/// A user on the free tier.
pub fn create_test_user() -> User {
    UserBuilder::new().build()
}

/// An idea with generated text, owned by the given user.
pub fn create_test_idea(owner: UserId) -> Idea {
    let text: String = CatchPhrase().fake();
    IdeaBuilder::new()
        .with_owner(owner)
        .with_text(text)
        .with_tags(vec![Buzzword().fake(), Buzzword().fake()])
        .build()
}

/// A first-version document of the given type for an idea.
pub fn create_test_document(idea_id: IdeaId, owner: UserId, document_type: DocumentType) -> Document {
    let body: String = Sentence(5..12).fake();
    DocumentBuilder::new()
        .for_idea(idea_id, owner)
        .with_type(document_type)
        .with_title(format!("{}: draft", document_type.as_str()))
        .with_content(serde_json::json!({ "body": body }))
        .build()
}

/// An idea-variant analysis for the given user.
pub fn create_test_analysis(owner: UserId) -> Analysis {
    let subject: String = CatchPhrase().fake();
    AnalysisBuilder::new()
        .with_owner(owner)
        .with_subject(subject)
        .build()
}

/// A hackathon-variant analysis for the given user.
pub fn create_test_hackathon_analysis(owner: UserId) -> Analysis {
    let subject: String = CatchPhrase().fake();
    AnalysisBuilder::new()
        .with_owner(owner)
        .with_subject(subject)
        .hackathon(HackathonTrack::Web)
        .build()
}

/// A starter grant followed by one deduction, summing to `50 - 5 = 45`.
pub fn create_test_ledger(owner: UserId) -> Vec<CreditTransaction> {
    vec![
        CreditTransaction::add(owner, 50, "starter pack").expect("valid grant"),
        CreditTransaction::deduct(owner, 5, "idea analysis", "fixture-action")
            .expect("valid deduction"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_produce_valid_entities() {
        let user = create_test_user();
        let idea = create_test_idea(user.id);
        assert_eq!(idea.user_id, user.id);
        assert!(!idea.text.is_empty());

        let document = create_test_document(idea.id, user.id, DocumentType::Roadmap);
        assert_eq!(document.version.value(), 1);

        let analysis = create_test_analysis(user.id);
        assert_eq!(analysis.discriminator(), "idea");

        let hackathon = create_test_hackathon_analysis(user.id);
        assert_eq!(hackathon.discriminator(), "hackathon");

        let ledger = create_test_ledger(user.id);
        assert_eq!(ideaforge_domain::credit::balance(&ledger), 45);
    }
}
