//! Rule definitions: severity, category, glob scoping, and the typed
//! immutable [`Rule`] value produced by the store at load time.

pub mod store;

pub use store::RuleStore;

use std::fmt;
use std::str::FromStr;

use globset::GlobSet;
use regex::Regex;

/// Severity of a rule, highest last so `Ord` ranks critical above low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            other => Err(format!(
                "unrecognized severity `{other}` (expected critical, high, medium, or low)"
            )),
        }
    }
}

/// Grouping a rule belongs to. One rule document per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Security,
    GitOperations,
    CodeQuality,
    FileOperations,
    ProjectFiles,
    Architecture,
    Dependencies,
    Behavioral,
    DryPrinciple,
    ResultPattern,
    Namespace,
    TypeSystem,
    SolidPrinciples,
    QualityGates,
    BashCommands,
    PythonCode,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Security => "security",
            Category::GitOperations => "git-operations",
            Category::CodeQuality => "code-quality",
            Category::FileOperations => "file-operations",
            Category::ProjectFiles => "project-files",
            Category::Architecture => "architecture",
            Category::Dependencies => "dependencies",
            Category::Behavioral => "behavioral",
            Category::DryPrinciple => "dry-principle",
            Category::ResultPattern => "flext-result-pattern",
            Category::Namespace => "namespace",
            Category::TypeSystem => "type-system",
            Category::SolidPrinciples => "solid-principles",
            Category::QualityGates => "quality-gates",
            Category::BashCommands => "bash-commands",
            Category::PythonCode => "python-code",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "security" => Ok(Category::Security),
            "git-operations" => Ok(Category::GitOperations),
            "code-quality" => Ok(Category::CodeQuality),
            "file-operations" => Ok(Category::FileOperations),
            "project-files" => Ok(Category::ProjectFiles),
            "architecture" => Ok(Category::Architecture),
            "dependencies" => Ok(Category::Dependencies),
            "behavioral" => Ok(Category::Behavioral),
            "dry-principle" => Ok(Category::DryPrinciple),
            "flext-result-pattern" => Ok(Category::ResultPattern),
            "namespace" => Ok(Category::Namespace),
            "type-system" => Ok(Category::TypeSystem),
            "solid-principles" => Ok(Category::SolidPrinciples),
            "quality-gates" => Ok(Category::QualityGates),
            "bash-commands" => Ok(Category::BashCommands),
            "python-code" => Ok(Category::PythonCode),
            other => Err(format!("unrecognized category `{other}`")),
        }
    }
}

/// Path scoping for a rule: inclusion globs and exclusion globs.
///
/// A rule is in scope for a path iff the path matches at least one
/// `applies_to` glob (or there are none, meaning all paths) and matches no
/// `exceptions` glob. Exceptions always win.
#[derive(Debug, Clone)]
pub struct RuleScope {
    applies_to: Option<GlobSet>,
    exceptions: Option<GlobSet>,
}

impl RuleScope {
    pub(crate) fn new(applies_to: Option<GlobSet>, exceptions: Option<GlobSet>) -> Self {
        Self {
            applies_to,
            exceptions,
        }
    }

    /// Unrestricted scope: every path is included.
    pub fn all() -> Self {
        Self {
            applies_to: None,
            exceptions: None,
        }
    }

    pub fn includes(&self, path: &str) -> bool {
        if let Some(exceptions) = &self.exceptions
            && exceptions.is_match(path)
        {
            return false;
        }
        match &self.applies_to {
            Some(applies_to) => applies_to.is_match(path),
            None => true,
        }
    }
}

/// A single validation rule, immutable after load.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Stable unique identifier, e.g. `SEC001`.
    pub code: String,
    /// Short machine-friendly name, e.g. `destructive-recursive-delete`.
    pub name: String,
    /// Compiled line-oriented pattern.
    pub pattern: Regex,
    pub category: Category,
    pub severity: Severity,
    /// Whether a match should block the operation under an enforcing mode.
    /// Advisory only while the global mode is warning-only.
    pub blocking: bool,
    /// Multi-line remediation text shown to the user.
    pub guidance: String,
    pub tags: Vec<String>,
    pub scope: RuleScope,
    /// Restrict to a single language (matched against the target's
    /// extension-derived language).
    pub language: Option<String>,
    /// Restrict to specific file extensions (without the leading dot).
    pub file_types: Vec<String>,
    /// Environment tags that must be active for the rule to apply.
    pub context_required: Vec<String>,
}

impl Rule {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globset::{Glob, GlobSetBuilder};

    fn glob_set(patterns: &[&str]) -> GlobSet {
        let mut builder = GlobSetBuilder::new();
        for p in patterns {
            builder.add(Glob::new(p).unwrap());
        }
        builder.build().unwrap()
    }

    #[test]
    fn severity_order_ranks_critical_highest() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn severity_round_trips_through_from_str() {
        for s in ["critical", "high", "medium", "low"] {
            assert_eq!(s.parse::<Severity>().unwrap().as_str(), s);
        }
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn category_round_trips_through_from_str() {
        for s in [
            "security",
            "git-operations",
            "code-quality",
            "file-operations",
            "project-files",
            "architecture",
            "dependencies",
            "behavioral",
            "dry-principle",
            "flext-result-pattern",
            "namespace",
            "type-system",
            "solid-principles",
            "quality-gates",
            "bash-commands",
            "python-code",
        ] {
            assert_eq!(s.parse::<Category>().unwrap().as_str(), s);
        }
        assert!("misc".parse::<Category>().is_err());
    }

    #[test]
    fn empty_scope_includes_every_path() {
        let scope = RuleScope::all();
        assert!(scope.includes("src/app.py"));
        assert!(scope.includes("command"));
        assert!(scope.includes("deeply/nested/path/file.txt"));
    }

    #[test]
    fn applies_to_limits_scope() {
        let scope = RuleScope::new(Some(glob_set(&["**/*.py"])), None);
        assert!(scope.includes("src/app.py"));
        assert!(!scope.includes("src/app.rs"));
    }

    #[test]
    fn exceptions_win_over_applies_to() {
        let scope = RuleScope::new(
            Some(glob_set(&["**/*.py"])),
            Some(glob_set(&["**/tests/**"])),
        );
        assert!(scope.includes("src/app.py"));
        assert!(!scope.includes("src/tests/foo.py"));
    }

    #[test]
    fn exceptions_apply_without_applies_to() {
        let scope = RuleScope::new(None, Some(glob_set(&["**/generated/**"])));
        assert!(scope.includes("src/app.py"));
        assert!(!scope.includes("src/generated/schema.py"));
    }
}
