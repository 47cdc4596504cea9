//! Rule store: parses the YAML rule documents into typed [`Rule`] values,
//! validating eagerly and failing the whole load on the first bad record.

use std::collections::HashMap;
use std::str::FromStr;

use globset::{Glob, GlobSet, GlobSetBuilder};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;

use crate::error::LoadError;
use crate::rules::{Category, Rule, RuleScope, Severity};

/// Embedded rule documents, one per category. Loaded in this order, which
/// fixes the insertion order reported by [`RuleStore::all`].
const RULE_DOCS: &[(&str, &str)] = &[
    ("security", include_str!("../../rules/security.yaml")),
    ("git-operations", include_str!("../../rules/git-operations.yaml")),
    ("code-quality", include_str!("../../rules/code-quality.yaml")),
    ("file-operations", include_str!("../../rules/file-operations.yaml")),
    ("project-files", include_str!("../../rules/project-files.yaml")),
    ("dependencies", include_str!("../../rules/dependencies.yaml")),
    ("bash-commands", include_str!("../../rules/bash-commands.yaml")),
    ("python-code", include_str!("../../rules/python-code.yaml")),
];

static SHARED: OnceCell<RuleStore> = OnceCell::new();

// ── Raw document schema ──
//
// Records are deserialized loosely (everything optional) so that missing or
// malformed fields produce a LoadError naming the document and rule code
// instead of an opaque serde failure.

#[derive(Debug, Deserialize)]
struct RuleDoc {
    category: String,
    rules: Vec<RuleRecord>,
}

#[derive(Debug, Deserialize)]
struct RuleRecord {
    code: Option<String>,
    name: Option<String>,
    pattern: Option<String>,
    category: Option<String>,
    severity: Option<String>,
    #[serde(default)]
    blocking: bool,
    #[serde(default)]
    guidance: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    applies_to: Vec<String>,
    #[serde(default)]
    exceptions: Vec<String>,
    language: Option<String>,
    #[serde(default)]
    file_types: Vec<String>,
    #[serde(default)]
    context_required: Vec<String>,
}

/// Immutable set of loaded rules, in document order.
#[derive(Debug)]
pub struct RuleStore {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl RuleStore {
    /// Load the embedded rule documents.
    pub fn load() -> Result<Self, LoadError> {
        Self::from_docs(RULE_DOCS)
    }

    /// Shared process-wide store, loaded on first use and cached for the
    /// life of the process. A failed load is not cached; the next call
    /// retries.
    pub fn shared() -> Result<&'static Self, LoadError> {
        SHARED.get_or_try_init(Self::load)
    }

    /// Build a store from (document name, YAML text) pairs.
    pub fn from_docs(docs: &[(&str, &str)]) -> Result<Self, LoadError> {
        let mut rules = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut origin: HashMap<String, String> = HashMap::new();

        for (doc_name, text) in docs {
            let doc: RuleDoc = serde_yaml::from_str(text).map_err(|e| LoadError::Parse {
                doc: doc_name.to_string(),
                source: e,
            })?;

            let doc_category =
                Category::from_str(&doc.category).map_err(|reason| invalid(doc_name, "-", reason))?;

            for (i, record) in doc.rules.into_iter().enumerate() {
                let rule = build_rule(doc_name, i, record, doc_category)?;
                if let Some(first_doc) = origin.get(&rule.code) {
                    return Err(LoadError::DuplicateRuleCode {
                        code: rule.code.clone(),
                        first_doc: first_doc.clone(),
                        doc: doc_name.to_string(),
                    });
                }
                origin.insert(rule.code.clone(), doc_name.to_string());
                index.insert(rule.code.clone(), rules.len());
                rules.push(rule);
            }
        }

        Ok(Self { rules, index })
    }

    /// Look up a rule by its stable code.
    pub fn get_by_code(&self, code: &str) -> Option<&Rule> {
        self.index.get(code).map(|&i| &self.rules[i])
    }

    /// All rules, in document insertion order (stable across loads).
    pub fn all(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn invalid(doc: &str, code: &str, reason: String) -> LoadError {
    LoadError::InvalidRuleDefinition {
        doc: doc.to_string(),
        code: code.to_string(),
        reason,
    }
}

fn build_rule(
    doc: &str,
    record_index: usize,
    record: RuleRecord,
    doc_category: Category,
) -> Result<Rule, LoadError> {
    // Identify the record as well as we can for error messages before the
    // code field is known to exist.
    let label = record
        .code
        .clone()
        .or_else(|| record.name.clone())
        .unwrap_or_else(|| format!("record #{}", record_index + 1));

    let code = record
        .code
        .ok_or_else(|| invalid(doc, &label, "missing required field `code`".into()))?;
    let name = record
        .name
        .ok_or_else(|| invalid(doc, &code, "missing required field `name`".into()))?;
    let raw_pattern = record
        .pattern
        .ok_or_else(|| invalid(doc, &code, "missing required field `pattern`".into()))?;

    let pattern = Regex::new(&raw_pattern)
        .map_err(|e| invalid(doc, &code, format!("pattern does not compile: {e}")))?;

    let severity_str = record
        .severity
        .ok_or_else(|| invalid(doc, &code, "missing required field `severity`".into()))?;
    let severity =
        Severity::from_str(&severity_str).map_err(|reason| invalid(doc, &code, reason))?;

    // A record may restate its category; it must agree with the document's.
    let category = match record.category {
        Some(s) => {
            let c = Category::from_str(&s).map_err(|reason| invalid(doc, &code, reason))?;
            if c != doc_category {
                return Err(invalid(
                    doc,
                    &code,
                    format!("category `{c}` disagrees with document category `{doc_category}`"),
                ));
            }
            c
        }
        None => doc_category,
    };

    let applies_to = build_glob_set(doc, &code, &record.applies_to)?;
    let exceptions = build_glob_set(doc, &code, &record.exceptions)?;

    Ok(Rule {
        code,
        name,
        pattern,
        category,
        severity,
        blocking: record.blocking,
        guidance: record.guidance,
        tags: record.tags,
        scope: RuleScope::new(applies_to, exceptions),
        language: record.language,
        file_types: record
            .file_types
            .into_iter()
            .map(|ft| ft.trim_start_matches('.').to_string())
            .collect(),
        context_required: record.context_required,
    })
}

fn build_glob_set(doc: &str, code: &str, patterns: &[String]) -> Result<Option<GlobSet>, LoadError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        let glob =
            Glob::new(p).map_err(|e| invalid(doc, code, format!("invalid glob `{p}`: {e}")))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| invalid(doc, code, format!("glob set failed to build: {e}")))?;
    Ok(Some(set))
}
