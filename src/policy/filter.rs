//! Ordered, open rule set with deny-overrides semantics

use std::sync::Arc;

use crate::errors::Result;
use crate::policy::checks::{AccessCheck, AttributeMatchCheck, SensitivityTierCheck};
use crate::policy::config::PolicyConfig;
use crate::policy::verdict::{CheckOutcome, Denial, PolicyDecision, Verdict};
use crate::types::{Attributes, RequesterContext};

/// Policy filter over an ordered list of checks.
///
/// Pure: the decision depends only on the attributes, the context and the
/// registered checks. An empty filter admits everything.
#[derive(Debug, Clone, Default)]
pub struct PolicyFilter {
    checks: Vec<Arc<dyn AccessCheck>>,
}

impl PolicyFilter {
    /// Create a filter with no checks
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in checks with default key names and privileges
    pub fn standard() -> Self {
        // Default config always validates
        Self::build(&PolicyConfig::default())
    }

    /// Build the built-in checks followed by any configured rules
    pub fn from_config(config: &PolicyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: &PolicyConfig) -> Self {
        let mut filter = Self::new();

        filter
            .register(
                AttributeMatchCheck::identity(config.identity_key.clone())
                    .with_missing(config.missing_attribute),
            )
            .register(
                AttributeMatchCheck::location(config.location_key.clone())
                    .with_missing(config.missing_attribute),
            )
            .register(
                SensitivityTierCheck::new(
                    config.sensitivity_key.clone(),
                    config.identity_key.clone(),
                    config.department_key.clone(),
                )
                .with_privileged_departments(config.privileged_departments.clone())
                .with_privileged_identities(config.privileged_identities.clone()),
            );

        for rule in &config.rules {
            let context_key = rule
                .context_key
                .clone()
                .unwrap_or_else(|| rule.attribute.clone());
            filter.register(
                AttributeMatchCheck::new(rule.name.clone(), rule.attribute.clone(), context_key)
                    .with_missing(rule.missing_attribute.unwrap_or(config.missing_attribute)),
            );
        }

        filter
    }

    /// Append a check to the end of the evaluation order
    pub fn register(&mut self, check: impl AccessCheck + 'static) -> &mut Self {
        self.checks.push(Arc::new(check));
        self
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_check(mut self, check: impl AccessCheck + 'static) -> Self {
        self.register(check);
        self
    }

    /// Evaluate all checks in order, stopping at the first Deny
    pub fn evaluate(&self, attributes: &Attributes, context: &RequesterContext) -> PolicyDecision {
        let mut outcomes = Vec::with_capacity(self.checks.len());

        for check in &self.checks {
            let verdict = check.evaluate(attributes, context);
            let denied_by = match &verdict {
                Verdict::Deny(reason) => Some(Denial {
                    check: check.name().to_string(),
                    reason: reason.clone(),
                }),
                Verdict::Allow | Verdict::NoOpinion => None,
            };

            outcomes.push(CheckOutcome {
                check: check.name().to_string(),
                verdict,
            });

            if denied_by.is_some() {
                return PolicyDecision {
                    outcomes,
                    denied_by,
                };
            }
        }

        PolicyDecision {
            outcomes,
            denied_by: None,
        }
    }

    /// Whether the document is admitted (no check denies)
    pub fn admits(&self, attributes: &Attributes, context: &RequesterContext) -> bool {
        self.checks
            .iter()
            .all(|check| !check.evaluate(attributes, context).is_deny())
    }

    /// Check names in evaluation order
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
