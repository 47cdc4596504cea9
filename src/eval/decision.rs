//! Decision resolution: reduce a violation list to allow/block plus a
//! prioritized report.

use crate::eval::Violation;

/// Global enforcement policy, passed explicitly so behavior stays
/// deterministic and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// When false, every decision is Allow and rule `blocking` flags are
    /// advisory only.
    pub blocking_enabled: bool,
}

impl Mode {
    /// Report violations but never block (the default deployment).
    pub const WARN_ONLY: Mode = Mode {
        blocking_enabled: false,
    };

    /// Block when any violation comes from a blocking rule.
    pub const ENFORCING: Mode = Mode {
        blocking_enabled: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Outcome {
    Allow,
    Block,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Allow => "allow",
            Outcome::Block => "block",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Allow => "ALLOW",
            Outcome::Block => "BLOCK",
        }
    }
}

/// One formatted report line per violation, in evaluator order.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub rule_code: String,
    pub severity: crate::rules::Severity,
    pub location: String,
    /// One-line summary: code, severity, location, matched text.
    pub summary: String,
    pub guidance: String,
}

/// Resolved outcome plus the human-readable report. Never an error.
#[derive(Debug, Clone)]
pub struct Decision {
    pub outcome: Outcome,
    pub report: Vec<ReportEntry>,
}

impl Decision {
    /// Render the report as display text, one summary line per violation
    /// with its guidance indented beneath.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.report {
            out.push_str(&entry.summary);
            out.push('\n');
            for line in entry.guidance.lines() {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

/// Reduce violations to a decision under the given mode.
///
/// Warning-only mode always allows; enforcing mode blocks iff at least one
/// violation carries `blocking = true`. The report is identical either way.
pub fn resolve(violations: &[Violation], mode: Mode) -> Decision {
    let outcome = if mode.blocking_enabled && violations.iter().any(|v| v.blocking) {
        Outcome::Block
    } else {
        Outcome::Allow
    };

    let report = violations
        .iter()
        .map(|v| {
            let location = v.location.to_string();
            let excerpt: String = v.matched_text.trim().chars().take(60).collect();
            ReportEntry {
                rule_code: v.rule_code.clone(),
                severity: v.severity,
                summary: format!(
                    "{} [{}] {}: {}",
                    v.rule_code,
                    v.severity.label(),
                    location,
                    excerpt
                ),
                location,
                guidance: v.guidance.clone(),
            }
        })
        .collect();

    Decision { outcome, report }
}
