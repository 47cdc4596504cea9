use std::collections::HashSet;
use std::path::Path;

/// Context for one evaluation pass: the target, its content, and the
/// ambient filters that decide which rules are in play.
#[derive(Debug)]
pub struct EvalContext<'a> {
    /// File path, or a logical source id such as `command` for shell input.
    pub target_path: &'a str,
    /// The text to check.
    pub content: &'a str,
    /// Optional allow-list of rule codes; `None` means every rule.
    pub active_rules: Option<HashSet<String>>,
    /// Environment tags currently active (matched against each rule's
    /// `context_required`).
    pub environment_tags: HashSet<String>,
}

impl<'a> EvalContext<'a> {
    pub fn new(target_path: &'a str, content: &'a str) -> Self {
        Self {
            target_path,
            content,
            active_rules: None,
            environment_tags: HashSet::new(),
        }
    }

    pub fn with_active_rules<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_rules = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_environment_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environment_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the active-rules filter admits this code.
    pub fn rule_active(&self, code: &str) -> bool {
        match &self.active_rules {
            Some(codes) => codes.contains(code),
            None => true,
        }
    }

    /// The language implied by the target's extension, if any.
    pub fn language(&self) -> Option<&'static str> {
        match self.extension()? {
            "py" | "pyi" => Some("python"),
            "sh" | "bash" | "zsh" => Some("shell"),
            "rs" => Some("rust"),
            "ts" | "tsx" => Some("typescript"),
            "js" | "jsx" | "mjs" => Some("javascript"),
            "go" => Some("go"),
            "yml" | "yaml" => Some("yaml"),
            "toml" => Some("toml"),
            "json" => Some("json"),
            "md" => Some("markdown"),
            _ => None,
        }
    }

    /// The extension of the target's final path component, without the
    /// leading dot. Dotted directories and hidden files yield `None`.
    pub fn extension(&self) -> Option<&'a str> {
        Path::new(self.target_path).extension()?.to_str()
    }
}
