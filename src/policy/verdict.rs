//! Check verdicts and the evaluation record produced by the filter

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    /// The check applied and found nothing to object to
    Allow,
    /// The check applied and vetoes the document
    Deny(String),
    /// The check does not apply to this document/context pair
    NoOpinion,
}

impl Verdict {
    /// Convenience constructor for denials
    pub fn deny(reason: impl Into<String>) -> Self {
        Verdict::Deny(reason.into())
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Verdict::Deny(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allow => write!(f, "allow"),
            Verdict::Deny(reason) => write!(f, "deny: {}", reason),
            Verdict::NoOpinion => write!(f, "no opinion"),
        }
    }
}

/// Verdict of one named check, in evaluation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: String,
    pub verdict: Verdict,
}

/// The check that rejected a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    pub check: String,
    pub reason: String,
}

/// Full record of one filter evaluation.
///
/// `outcomes` stops at the denying check: checks after a Deny are not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub outcomes: Vec<CheckOutcome>,
    pub denied_by: Option<Denial>,
}

impl PolicyDecision {
    pub fn is_admitted(&self) -> bool {
        self.denied_by.is_none()
    }
}
