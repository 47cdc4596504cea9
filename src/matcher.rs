//! Line-oriented pattern matching.
//!
//! Rule patterns are matched one line at a time; multi-line patterns are
//! deliberately unsupported. No match is never an error.

use std::time::{Duration, Instant};

use crate::error::PatternTimeout;
use crate::rules::Rule;

/// One pattern match within an input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternHit {
    /// 1-based line number.
    pub line: usize,
    /// 1-based byte column of the match start within the line.
    pub column: usize,
    /// The substring that triggered the match.
    pub text: String,
}

/// Lazily yield every match of `rule` in `text`, line by line.
pub fn matches<'a>(rule: &'a Rule, text: &'a str) -> impl Iterator<Item = PatternHit> + 'a {
    text.lines().enumerate().flat_map(move |(i, line)| {
        rule.pattern.find_iter(line).map(move |m| PatternHit {
            line: i + 1,
            column: m.start() + 1,
            text: m.as_str().to_string(),
        })
    })
}

/// Collect every match, giving up with [`PatternTimeout`] once the elapsed
/// wall-clock time for this rule exceeds `budget`.
///
/// The budget is checked between lines; the regex engine itself is
/// linear-time, so a single line cannot hang. `None` disables the check.
pub fn find_matches_budgeted(
    rule: &Rule,
    text: &str,
    budget: Option<Duration>,
) -> Result<Vec<PatternHit>, PatternTimeout> {
    let start = Instant::now();
    let mut hits = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(budget) = budget
            && start.elapsed() > budget
        {
            return Err(PatternTimeout {
                code: rule.code.clone(),
                budget,
            });
        }
        for m in rule.pattern.find_iter(line) {
            hits.push(PatternHit {
                line: i + 1,
                column: m.start() + 1,
                text: m.as_str().to_string(),
            });
        }
    }
    Ok(hits)
}
