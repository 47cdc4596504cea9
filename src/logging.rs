//! Log initialization and decision logging.
//!
//! The hook binary logs into `<state_dir>/rulegate.log`; if that file
//! cannot be opened, diagnostics fall back to stderr. Logging must never
//! block the hook, so every failure here is swallowed.

use std::path::Path;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::eval::{Decision, Outcome};

/// Initialize the global logger, preferring a file in the state directory.
pub fn init(state_dir: Option<&Path>) {
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Some(dir) = state_dir
        && std::fs::create_dir_all(dir).is_ok()
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("rulegate.log"))
    {
        let _ = WriteLogger::init(LevelFilter::Info, config, file);
        return;
    }

    // Stdout carries only the hook's decision JSON; diagnostics go to
    // stderr.
    let _ = WriteLogger::init(LevelFilter::Warn, config, std::io::stderr());
}


/// Record a resolved decision. One line per call; report entries are
/// flattened so the log stays grep-friendly.
pub fn log_decision(target: &str, decision: &Decision) {
    let target_truncated: String = target.chars().take(200).collect();
    match decision.outcome {
        Outcome::Allow if decision.report.is_empty() => {
            log::info!("allow {target_truncated}");
        }
        outcome => {
            let summaries: Vec<&str> = decision
                .report
                .iter()
                .map(|e| e.summary.as_str())
                .collect();
            log::info!(
                "{} {} [{}]",
                outcome.as_str(),
                target_truncated,
                summaries.join("; ")
            );
        }
    }
}
