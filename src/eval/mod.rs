//! Evaluation engine: scope rules to a target, run the matcher, and order
//! the resulting violations most-important-first.

pub mod context;
pub mod decision;

pub use context::EvalContext;
pub use decision::{Decision, Mode, Outcome, ReportEntry, resolve};

use std::cmp::Reverse;
use std::fmt;
use std::time::Duration;

use crate::matcher;
use crate::rules::{Rule, RuleStore, Severity};

/// Where a match occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// File path or logical source id.
    pub source: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, when known.
    pub column: Option<usize>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(col) => write!(f, "{}:{}:{}", self.source, self.line, col),
            None => write!(f, "{}:{}", self.source, self.line),
        }
    }
}

/// One rule matching one location in one input. Fields are copied from the
/// rule at evaluation time and never mutated afterward.
#[derive(Debug, Clone)]
pub struct Violation {
    pub rule_code: String,
    pub severity: Severity,
    pub blocking: bool,
    pub guidance: String,
    pub location: Location,
    pub matched_text: String,
}

/// Evaluates the full rule set against one input at a time.
pub struct Evaluator<'a> {
    store: &'a RuleStore,
    match_budget: Option<Duration>,
}

impl<'a> Evaluator<'a> {
    pub fn new(store: &'a RuleStore) -> Self {
        Self {
            store,
            match_budget: None,
        }
    }

    /// Bound the wall-clock time spent matching any single rule. A rule
    /// that exceeds the budget is skipped with a logged warning rather
    /// than aborting the evaluation.
    pub fn with_match_budget(mut self, budget: Duration) -> Self {
        self.match_budget = Some(budget);
        self
    }

    /// Evaluate every in-scope rule against the context.
    ///
    /// Violations are ordered by severity descending, then line ascending,
    /// then rule code ascending. Pure: identical contexts produce identical
    /// sequences.
    pub fn evaluate(&self, ctx: &EvalContext) -> Vec<Violation> {
        let mut violations = Vec::new();

        for rule in self.store.all() {
            if !self.in_scope(rule, ctx) {
                continue;
            }
            match matcher::find_matches_budgeted(rule, ctx.content, self.match_budget) {
                Ok(hits) => {
                    for hit in hits {
                        violations.push(Violation {
                            rule_code: rule.code.clone(),
                            severity: rule.severity,
                            blocking: rule.blocking,
                            guidance: rule.guidance.clone(),
                            location: Location {
                                source: ctx.target_path.to_string(),
                                line: hit.line,
                                column: Some(hit.column),
                            },
                            matched_text: hit.text,
                        });
                    }
                }
                Err(timeout) => {
                    // One misbehaving rule must not abort the rest.
                    log::warn!("skipping rule: {timeout}");
                }
            }
        }

        violations.sort_by(|a, b| {
            (Reverse(a.severity), a.location.line, &a.rule_code)
                .cmp(&(Reverse(b.severity), b.location.line, &b.rule_code))
        });
        violations
    }

    fn in_scope(&self, rule: &Rule, ctx: &EvalContext) -> bool {
        if !ctx.rule_active(&rule.code) {
            return false;
        }
        if !rule.context_required.is_empty()
            && !rule
                .context_required
                .iter()
                .any(|tag| ctx.environment_tags.contains(tag))
        {
            return false;
        }
        if let Some(language) = &rule.language
            && ctx.language() != Some(language.as_str())
        {
            return false;
        }
        if !rule.file_types.is_empty() {
            let Some(ext) = ctx.extension() else {
                return false;
            };
            if !rule.file_types.iter().any(|ft| ft.eq_ignore_ascii_case(ext)) {
                return false;
            }
        }
        rule.scope.includes(ctx.target_path)
    }
}
