//! Demonstration corpus and requester scenarios
//!
//! Four documents covering public, personal, internal and confidential
//! material, and six queries issued under different requester contexts.

use crate::types::{Document, RequesterContext};

/// One query issued under one requester context
#[derive(Debug, Clone)]
pub struct Scenario {
    pub title: &'static str,
    pub query: &'static str,
    pub context: RequesterContext,
}

/// The demonstration documents
pub fn demo_documents() -> Vec<Document> {
    vec![
        Document::new(
            "public_announcement.txt",
            "This is a public announcement about upcoming office changes.",
        )
        .with_attribute("type", "public")
        .with_attribute("published_by", "HR"),
        Document::new(
            "user_123_personal_notes.txt",
            "My personal notes about project Alpha. Do not share.",
        )
        .with_attribute("user_id", "123")
        .with_attribute("sensitivity", "confidential")
        .with_attribute("location", "New York"),
        Document::new(
            "internal_dev_report.txt",
            "Internal development report for Q3. Access restricted to Dev department.",
        )
        .with_attribute("user_id", "456")
        .with_attribute("department", "Dev")
        .with_attribute("sensitivity", "internal"),
        Document::new(
            "it_security_policy.txt",
            "Official IT security policy. For IT department only.",
        )
        .with_attribute("user_id", "123")
        .with_attribute("department", "IT")
        .with_attribute("sensitivity", "confidential"),
    ]
}

/// The demonstration scenarios, in presentation order
pub fn demo_scenarios() -> Vec<Scenario> {
    let dev_456 = RequesterContext::new()
        .with("user_id", "456")
        .with("department", "Dev")
        .with("location", "London");

    vec![
        Scenario {
            title: "User 123 asks for their project notes",
            query: "What are my project notes?",
            context: RequesterContext::new()
                .with("user_id", "123")
                .with("location", "New York"),
        },
        Scenario {
            title: "User 456 asks for personal notes",
            query: "Show me my personal notes.",
            context: RequesterContext::new()
                .with("user_id", "456")
                .with("location", "London"),
        },
        Scenario {
            title: "Anonymous requester asks for public information",
            query: "Tell me about office changes.",
            context: RequesterContext::new(),
        },
        Scenario {
            title: "User 123 from IT asks for the IT policy",
            query: "What's the IT security policy?",
            context: RequesterContext::new()
                .with("user_id", "123")
                .with("department", "IT")
                .with("location", "New York"),
        },
        Scenario {
            title: "User 456 from Dev asks for the IT policy",
            query: "What's the IT security policy?",
            context: dev_456.clone(),
        },
        Scenario {
            title: "User 456 from Dev asks for the development report",
            query: "Latest development report.",
            context: dev_456,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_documents_have_unique_ids() {
        let docs = demo_documents();
        let ids: HashSet<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_six_scenarios() {
        let scenarios = demo_scenarios();
        assert_eq!(scenarios.len(), 6);
        assert!(scenarios[2].context.is_empty());
        assert_eq!(scenarios[4].context, scenarios[5].context);
    }
}
