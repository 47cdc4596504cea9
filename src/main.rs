//! rulegate: PreToolUse hook binary.
//!
//! Reads a JSON tool event from stdin, validates the command or file edit
//! against the rule set, and writes a permission decision to stdout.
//!
//! Handles:
//!   - Bash events: the command string is evaluated as a logical source.
//!   - Write/Edit events: the file content is evaluated against rules
//!     scoped to the file path, and the attempt is recorded in the
//!     persisted edit tracker.
//!   - `--blocking` / `--warn-only` flags override the configured mode.

use serde::Deserialize;
use std::io::Read;

use rulegate::config::Config;
use rulegate::eval::{self, EvalContext, Evaluator, Mode, Outcome};
use rulegate::rules::RuleStore;
use rulegate::tracker::EditTracker;
use rulegate::{logging, tracker::EditSnapshot};

#[derive(Deserialize)]
struct HookInput {
    tool_name: Option<String>,
    tool_input: Option<ToolInput>,
}

#[derive(Deserialize)]
struct ToolInput {
    command: Option<String>,
    file_path: Option<String>,
    content: Option<String>,
    new_string: Option<String>,
}

/// What the hook is being asked to validate.
enum Target {
    Command(String),
    FileEdit { path: String, content: String },
}

fn parse_target(input: HookInput) -> Option<Target> {
    let tool = input.tool_name?;
    let tool_input = input.tool_input?;
    match tool.as_str() {
        "Bash" => tool_input.command.map(Target::Command),
        "Write" | "Edit" => {
            let path = tool_input.file_path?;
            let content = tool_input.content.or(tool_input.new_string)?;
            Some(Target::FileEdit { path, content })
        }
        _ => None,
    }
}

fn mode_from_args(config: &Config) -> Mode {
    let mut blocking = config.settings.blocking;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--blocking" => blocking = true,
            "--warn-only" => blocking = false,
            _ => {}
        }
    }
    Mode {
        blocking_enabled: blocking,
    }
}

fn tracker_note(snapshot: &EditSnapshot) -> Option<String> {
    if snapshot.converged && snapshot.attempt > 1 {
        return Some(format!(
            "edit session converged after {} attempts",
            snapshot.attempt
        ));
    }
    if snapshot.regressed {
        return Some(format!(
            "attempt {} regressed to {} violations; consider rolling back to the session backup",
            snapshot.attempt, snapshot.violation_count
        ));
    }
    None
}

fn main() {
    let config = Config::load();
    let state_dir = config.state_dir();
    logging::init(state_dir.as_deref());

    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        eprintln!("rulegate: failed to read stdin");
        std::process::exit(1);
    }

    let hook_input: HookInput = match serde_json::from_str(&input) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("rulegate: JSON parse error: {e}");
            std::process::exit(1);
        }
    };

    let Some(target) = parse_target(hook_input) else {
        // Not a tool we validate.
        std::process::exit(0);
    };

    // Fail-closed on load: a half-loaded rule set is worse than no answer.
    let store = match RuleStore::shared() {
        Ok(store) => store,
        Err(e) => {
            log::error!("rule load failed: {e}");
            eprintln!("rulegate: rule load failed: {e}");
            std::process::exit(2);
        }
    };

    let mut evaluator = Evaluator::new(store);
    if let Some(budget) = config.match_budget() {
        evaluator = evaluator.with_match_budget(budget);
    }

    let (source, content) = match &target {
        Target::Command(command) => ("command", command.as_str()),
        Target::FileEdit { path, content } => (path.as_str(), content.as_str()),
    };

    let mut ctx =
        EvalContext::new(source, content).with_environment_tags(config.environment.tags.clone());
    if !config.rules.disabled.is_empty() {
        let enabled = store
            .all()
            .iter()
            .map(|r| r.code.clone())
            .filter(|code| !config.rules.disabled.contains(code));
        ctx = ctx.with_active_rules(enabled);
    }

    let violations = evaluator.evaluate(&ctx);
    let mode = mode_from_args(&config);
    let decision = eval::resolve(&violations, mode);

    let mut reason = decision.render();

    // File edits feed the iterative-edit tracker, persisted across hook
    // invocations so repeated attempts on one file share a session.
    if let Target::FileEdit { path, content } = &target
        && let Some(dir) = state_dir.as_deref()
    {
        let tracker = EditTracker::load_from(dir).unwrap_or_default();
        let snapshot = tracker.record_attempt(path, content, &violations);
        if let Some(note) = tracker_note(&snapshot) {
            log::warn!("{path}: {note}");
            reason.push_str(&note);
            reason.push('\n');
        }
        if let Err(e) = tracker.save_to(dir) {
            log::warn!("failed to persist edit sessions: {e}");
        }
    }

    logging::log_decision(source, &decision);

    let permission = match decision.outcome {
        Outcome::Allow => "allow",
        Outcome::Block => "deny",
    };
    let output = serde_json::json!({
        "hookSpecificOutput": {
            "hookEventName": "PreToolUse",
            "permissionDecision": permission,
            "permissionDecisionReason": reason,
        }
    });

    println!("{output}");
}
