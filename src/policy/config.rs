//! Policy configuration (`[policy]` section of config.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::{RagError, Result};

/// Behavior of match checks when the requester presents a claim the
/// document has no attribute for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAttribute {
    /// Treat as not applicable (documents without the attribute stay visible)
    #[default]
    NoOpinion,
    /// Treat as a mismatch
    Deny,
}

/// Extra attribute-match rule declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Check name reported in decisions
    pub name: String,
    /// Document attribute key
    pub attribute: String,
    /// Requester context key; defaults to `attribute`
    #[serde(default)]
    pub context_key: Option<String>,
    /// Overrides `policy.missing_attribute` for this rule
    #[serde(default)]
    pub missing_attribute: Option<MissingAttribute>,
}

/// Key names, privileges and extra rules for the policy filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub identity_key: String,
    pub location_key: String,
    pub department_key: String,
    pub sensitivity_key: String,
    pub privileged_departments: Vec<String>,
    pub privileged_identities: Vec<String>,
    pub missing_attribute: MissingAttribute,
    pub rules: Vec<RuleSpec>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            identity_key: "user_id".to_string(),
            location_key: "location".to_string(),
            department_key: "department".to_string(),
            sensitivity_key: "sensitivity".to_string(),
            privileged_departments: vec!["IT".to_string()],
            privileged_identities: vec!["123".to_string()],
            missing_attribute: MissingAttribute::NoOpinion,
            rules: Vec::new(),
        }
    }
}

/// Names taken by the built-in checks
pub const BUILTIN_CHECKS: [&str; 3] = ["identity", "location", "sensitivity"];

impl PolicyConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let keys = [
            ("identity_key", &self.identity_key),
            ("location_key", &self.location_key),
            ("department_key", &self.department_key),
            ("sensitivity_key", &self.sensitivity_key),
        ];
        for (field, value) in keys {
            if value.trim().is_empty() {
                return Err(RagError::ConfigError(format!(
                    "policy.{} must not be empty",
                    field
                )));
            }
        }

        let mut names: HashSet<&str> = BUILTIN_CHECKS.into_iter().collect();
        for rule in &self.rules {
            if rule.name.trim().is_empty() || rule.attribute.trim().is_empty() {
                return Err(RagError::ConfigError(
                    "policy.rules entries need a name and an attribute".to_string(),
                ));
            }
            if rule.context_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                return Err(RagError::ConfigError(format!(
                    "policy rule '{}' has an empty context_key",
                    rule.name
                )));
            }
            if !names.insert(rule.name.as_str()) {
                return Err(RagError::ConfigError(format!(
                    "Duplicate policy rule name: {}",
                    rule.name
                )));
            }
        }

        Ok(())
    }
}
