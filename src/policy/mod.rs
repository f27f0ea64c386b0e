//! Policy filter: decides which documents a requester may see
//!
//! Evaluation runs an ordered list of independent [`AccessCheck`]s over a
//! document's attributes and the requester context. Each check answers
//! Allow, Deny or NoOpinion. The first Deny rejects the document and stops
//! evaluation; if nothing denies, the document is admitted.
//!
//! Built-in checks:
//! - identity match (`user_id`)
//! - location match (`location`)
//! - sensitivity tier (`confidential` / `internal`)
//!
//! Further checks are added with [`PolicyFilter::register`] or declared as
//! `[[policy.rules]]` in the configuration file.

pub mod verdict;
pub mod checks;
pub mod filter;
pub mod config;

pub use verdict::{CheckOutcome, Denial, PolicyDecision, Verdict};
pub use checks::{AccessCheck, AttributeMatchCheck, SensitivityTier, SensitivityTierCheck};
pub use filter::PolicyFilter;
pub use config::{MissingAttribute, PolicyConfig, RuleSpec};
