//! Access checks
//!
//! Each check is a pure function of `(attributes, context)`. Checks never
//! see each other and may be added or reordered without touching the others.

use std::fmt;

use crate::policy::config::MissingAttribute;
use crate::policy::verdict::Verdict;
use crate::types::{Attributes, RequesterContext};

/// A single, independently testable access rule
pub trait AccessCheck: Send + Sync + fmt::Debug {
    /// Stable name reported in decisions and logs
    fn name(&self) -> &str;

    /// Evaluate the rule for one document and one requester
    fn evaluate(&self, attributes: &Attributes, context: &RequesterContext) -> Verdict;
}

/// Requires a document attribute to equal a requester claim.
///
/// - requester lacks the claim: NoOpinion
/// - document has the attribute: Allow on equality, Deny otherwise
/// - document lacks the attribute: governed by [`MissingAttribute`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatchCheck {
    name: String,
    attribute_key: String,
    context_key: String,
    missing: MissingAttribute,
}

impl AttributeMatchCheck {
    /// Match `attribute_key` on the document against `context_key` on the requester
    pub fn new(
        name: impl Into<String>,
        attribute_key: impl Into<String>,
        context_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            attribute_key: attribute_key.into(),
            context_key: context_key.into(),
            missing: MissingAttribute::NoOpinion,
        }
    }

    /// Identity-match check over `key` (same name on both sides)
    pub fn identity(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new("identity", key.clone(), key)
    }

    /// Location-match check over `key` (same name on both sides)
    pub fn location(key: impl Into<String>) -> Self {
        let key = key.into();
        Self::new("location", key.clone(), key)
    }

    /// Set the behavior for documents lacking the attribute
    pub fn with_missing(mut self, missing: MissingAttribute) -> Self {
        self.missing = missing;
        self
    }

    pub fn attribute_key(&self) -> &str {
        &self.attribute_key
    }

    pub fn context_key(&self) -> &str {
        &self.context_key
    }
}

impl AccessCheck for AttributeMatchCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, attributes: &Attributes, context: &RequesterContext) -> Verdict {
        let Some(required) = context.get(&self.context_key) else {
            return Verdict::NoOpinion;
        };

        match attributes.get(&self.attribute_key) {
            Some(actual) if actual == required => Verdict::Allow,
            Some(actual) => Verdict::deny(format!(
                "{} mismatch (document: {}, requester: {})",
                self.attribute_key, actual, required
            )),
            None => match self.missing {
                MissingAttribute::NoOpinion => Verdict::NoOpinion,
                MissingAttribute::Deny => Verdict::deny(format!(
                    "document has no {} attribute but requester presents one",
                    self.attribute_key
                )),
            },
        }
    }
}

/// Closed set of sensitivity classifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensitivityTier {
    Public,
    Internal,
    Confidential,
}

impl SensitivityTier {
    /// Parse a tier label. Labels are matched exactly; anything else is
    /// unrecognized and yields `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "public" => Some(SensitivityTier::Public),
            "internal" => Some(SensitivityTier::Internal),
            "confidential" => Some(SensitivityTier::Confidential),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityTier::Public => "public",
            SensitivityTier::Internal => "internal",
            SensitivityTier::Confidential => "confidential",
        }
    }
}

/// Gates documents by their sensitivity tier
///
/// - `confidential`: requester department is privileged, or requester
///   identity is privileged
/// - `internal`: requester presents any identity
/// - `public`, absent or unrecognized: NoOpinion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitivityTierCheck {
    attribute_key: String,
    identity_key: String,
    department_key: String,
    privileged_departments: Vec<String>,
    privileged_identities: Vec<String>,
}

impl SensitivityTierCheck {
    pub fn new(
        attribute_key: impl Into<String>,
        identity_key: impl Into<String>,
        department_key: impl Into<String>,
    ) -> Self {
        Self {
            attribute_key: attribute_key.into(),
            identity_key: identity_key.into(),
            department_key: department_key.into(),
            privileged_departments: Vec::new(),
            privileged_identities: Vec::new(),
        }
    }

    /// Departments cleared for confidential documents
    pub fn with_privileged_departments<I, S>(mut self, departments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.privileged_departments = departments.into_iter().map(Into::into).collect();
        self
    }

    /// Identities cleared for confidential documents
    pub fn with_privileged_identities<I, S>(mut self, identities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.privileged_identities = identities.into_iter().map(Into::into).collect();
        self
    }

    fn is_privileged(&self, context: &RequesterContext) -> bool {
        let department_ok = context
            .get(&self.department_key)
            .is_some_and(|d| self.privileged_departments.iter().any(|p| p == d));
        let identity_ok = context
            .get(&self.identity_key)
            .is_some_and(|i| self.privileged_identities.iter().any(|p| p == i));
        department_ok || identity_ok
    }
}

impl AccessCheck for SensitivityTierCheck {
    fn name(&self) -> &str {
        "sensitivity"
    }

    fn evaluate(&self, attributes: &Attributes, context: &RequesterContext) -> Verdict {
        let tier = attributes
            .get(&self.attribute_key)
            .and_then(|label| SensitivityTier::parse(label));

        match tier {
            Some(SensitivityTier::Confidential) => {
                if self.is_privileged(context) {
                    Verdict::Allow
                } else {
                    Verdict::deny("not authorized for confidential document")
                }
            }
            Some(SensitivityTier::Internal) => {
                if context.contains(&self.identity_key) {
                    Verdict::Allow
                } else {
                    Verdict::deny(format!(
                        "internal document requires a {} in context",
                        self.identity_key
                    ))
                }
            }
            Some(SensitivityTier::Public) | None => Verdict::NoOpinion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ctx(pairs: &[(&str, &str)]) -> RequesterContext {
        pairs.iter().copied().collect()
    }

    fn tier_check() -> SensitivityTierCheck {
        SensitivityTierCheck::new("sensitivity", "user_id", "department")
            .with_privileged_departments(["IT"])
            .with_privileged_identities(["123"])
    }

    #[test]
    fn test_identity_match_allows_equal() {
        let check = AttributeMatchCheck::identity("user_id");
        let verdict = check.evaluate(&attrs(&[("user_id", "123")]), &ctx(&[("user_id", "123")]));
        assert_eq!(verdict, Verdict::Allow);
    }

    #[test]
    fn test_identity_mismatch_denies() {
        let check = AttributeMatchCheck::identity("user_id");
        let verdict = check.evaluate(&attrs(&[("user_id", "123")]), &ctx(&[("user_id", "456")]));
        assert!(verdict.is_deny());
    }

    #[test]
    fn test_identity_no_claim_is_no_opinion() {
        let check = AttributeMatchCheck::identity("user_id");
        let verdict = check.evaluate(&attrs(&[("user_id", "123")]), &ctx(&[]));
        assert_eq!(verdict, Verdict::NoOpinion);
    }

    #[test]
    fn test_identity_missing_attribute_defaults_to_no_opinion() {
        let check = AttributeMatchCheck::identity("user_id");
        let verdict = check.evaluate(&attrs(&[]), &ctx(&[("user_id", "123")]));
        assert_eq!(verdict, Verdict::NoOpinion);
    }

    #[test]
    fn test_missing_attribute_deny_mode() {
        let check = AttributeMatchCheck::identity("user_id").with_missing(MissingAttribute::Deny);
        let verdict = check.evaluate(&attrs(&[]), &ctx(&[("user_id", "123")]));
        assert!(verdict.is_deny());

        // Still no opinion when the requester does not present the claim
        let verdict = check.evaluate(&attrs(&[]), &ctx(&[]));
        assert_eq!(verdict, Verdict::NoOpinion);
    }

    #[test]
    fn test_location_mismatch_reason() {
        let check = AttributeMatchCheck::location("location");
        let verdict = check.evaluate(
            &attrs(&[("location", "New York")]),
            &ctx(&[("location", "London")]),
        );
        match verdict {
            Verdict::Deny(reason) => {
                assert!(reason.contains("New York"));
                assert!(reason.contains("London"));
            }
            other => panic!("expected deny, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_key_pair() {
        let check = AttributeMatchCheck::new("team", "owner_team", "team");
        assert_eq!(check.name(), "team");
        assert_eq!(check.attribute_key(), "owner_team");
        assert_eq!(check.context_key(), "team");
        let verdict = check.evaluate(&attrs(&[("owner_team", "infra")]), &ctx(&[("team", "web")]));
        assert!(verdict.is_deny());
    }

    #[test]
    fn test_confidential_department() {
        let check = tier_check();
        let doc = attrs(&[("sensitivity", "confidential")]);
        assert_eq!(check.evaluate(&doc, &ctx(&[("department", "IT")])), Verdict::Allow);
        assert!(check.evaluate(&doc, &ctx(&[("department", "Dev")])).is_deny());
    }

    #[test]
    fn test_confidential_privileged_identity() {
        let check = tier_check();
        let doc = attrs(&[("sensitivity", "confidential")]);
        assert_eq!(check.evaluate(&doc, &ctx(&[("user_id", "123")])), Verdict::Allow);
        assert!(check.evaluate(&doc, &ctx(&[("user_id", "456")])).is_deny());
        assert!(check.evaluate(&doc, &ctx(&[])).is_deny());
    }

    #[test]
    fn test_internal_requires_identity() {
        let check = tier_check();
        let doc = attrs(&[("sensitivity", "internal")]);
        assert!(check.evaluate(&doc, &ctx(&[])).is_deny());
        assert!(check.evaluate(&doc, &ctx(&[("department", "Dev")])).is_deny());
        assert_eq!(check.evaluate(&doc, &ctx(&[("user_id", "456")])), Verdict::Allow);
    }

    #[test]
    fn test_public_absent_and_unknown_tiers() {
        let check = tier_check();
        let empty = ctx(&[]);
        assert_eq!(check.evaluate(&attrs(&[]), &empty), Verdict::NoOpinion);
        assert_eq!(
            check.evaluate(&attrs(&[("sensitivity", "public")]), &empty),
            Verdict::NoOpinion
        );
        assert_eq!(
            check.evaluate(&attrs(&[("sensitivity", "top-secret")]), &empty),
            Verdict::NoOpinion
        );
    }

    #[test]
    fn test_tier_parse_is_exact() {
        assert_eq!(SensitivityTier::parse("internal"), Some(SensitivityTier::Internal));
        assert_eq!(SensitivityTier::parse("Internal"), None);
        assert_eq!(SensitivityTier::Confidential.as_str(), "confidential");
    }
}
