//! rulegate: a rule-based validation engine for development-time guardrails.
//!
//! This crate evaluates pattern rules against file contents or shell command
//! strings and reduces the matches to a [`Decision`](eval::Decision): allow
//! or block, plus a severity-ordered report with remediation guidance.
//! Rules are loaded from YAML documents into an immutable
//! [`RuleStore`](rules::RuleStore), scoped per target via glob patterns, and
//! matched line by line with the regex engine.
//!
//! # Architecture
//!
//! - **[`rules`]** — Rule definitions and the store: severity, category,
//!   glob scoping, fail-fast document loading, process-wide cache.
//! - **[`matcher`]** — Line-oriented pattern matching with an optional
//!   per-rule time budget.
//! - **[`eval`]** — Evaluation engine: scoping, violation ordering, and the
//!   mode-aware decision resolver.
//! - **[`tracker`]** — Iterative-edit tracking: per-path backups and
//!   violation history across successive edit attempts.
//! - **[`config`]** — Configuration loading: embedded defaults + user
//!   overlay merge.
//! - **[`logging`]** — Logger setup and decision logging.

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Error taxonomy: load failures and pattern timeouts.
pub mod error;
/// Evaluation engine: context, violations, decision resolution.
pub mod eval;
/// File-based logging.
pub mod logging;
/// Line-oriented pattern matching.
pub mod matcher;
/// Rule definitions, document loading, and the shared store.
pub mod rules;
/// Per-path iterative-edit tracking.
pub mod tracker;

use error::LoadError;
use eval::{Decision, EvalContext, Evaluator, Mode};
use rules::RuleStore;

/// Evaluate `content` for `target` against the embedded rule set and
/// resolve under `mode`.
///
/// This is the main entry point for tests and simple usage. Hosts that
/// need environment tags, rule filters, or a match budget build an
/// [`Evaluator`](eval::Evaluator) directly.
pub fn check(target: &str, content: &str, mode: Mode) -> Result<Decision, LoadError> {
    let store = RuleStore::shared()?;
    let violations = Evaluator::new(store).evaluate(&EvalContext::new(target, content));
    Ok(eval::resolve(&violations, mode))
}
