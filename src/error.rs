//! Error taxonomy for rule loading and pattern matching.

use std::time::Duration;

/// Failure while loading a rule document set.
///
/// Any variant is fatal to the whole load: a partial rule set is never
/// exposed to callers.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A rule document failed to parse as YAML.
    #[error("rule document `{doc}` failed to parse: {source}")]
    Parse {
        doc: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A record is missing a required field, carries a pattern that does
    /// not compile, a bad glob, or an unrecognized severity/category.
    #[error("invalid rule `{code}` in document `{doc}`: {reason}")]
    InvalidRuleDefinition {
        doc: String,
        code: String,
        reason: String,
    },

    /// Two records share the same rule code.
    #[error("duplicate rule code `{code}`: first defined in `{first_doc}`, redefined in `{doc}`")]
    DuplicateRuleCode {
        code: String,
        first_doc: String,
        doc: String,
    },
}

/// A single rule's matching exceeded its per-call time budget.
///
/// Treated as "no match" by the evaluator: the error is logged and the
/// remaining rules still run.
#[derive(Debug, thiserror::Error)]
#[error("rule `{code}` exceeded its match budget of {budget:?}")]
pub struct PatternTimeout {
    pub code: String,
    pub budget: Duration,
}
