//! Iterative-edit tracking: per-path backups and violation history across
//! successive edit attempts, with optional persistence to a scratch
//! directory so a restart keeps rollback targets.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::eval::Violation;

const SESSIONS_FILE: &str = "sessions.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SessionState {
    InProgress,
    Converged,
}

/// Per-path edit session. The backup is captured on the first attempt of a
/// session and never overwritten until the session converges.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EditSession {
    backup_content: String,
    attempt_count: u32,
    violation_history: Vec<usize>,
    state: SessionState,
}

/// What one `record_attempt` call observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSnapshot {
    /// 1-based attempt number within the current session.
    pub attempt: u32,
    pub violation_count: usize,
    /// Violation count strictly increased versus the previous attempt.
    /// Advisory only; rollback stays an explicit caller action.
    pub regressed: bool,
    /// This attempt reached zero violations.
    pub converged: bool,
}

/// Tracks edit attempts per file path.
///
/// The map is guarded by a mutex; callers must still not interleave
/// attempts for a single path from multiple threads, since attempt order
/// is part of the contract.
#[derive(Debug, Default)]
pub struct EditTracker {
    sessions: Mutex<HashMap<String, EditSession>>,
}

impl EditTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one edit attempt for `path`.
    ///
    /// The first attempt for a path (or the first after a converged
    /// session) captures `content` as the backup. Later attempts leave the
    /// backup untouched and extend the violation history.
    pub fn record_attempt(
        &self,
        path: &str,
        content: &str,
        violations: &[Violation],
    ) -> EditSnapshot {
        let count = violations.len();
        let converged = count == 0;
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());

        match sessions.get_mut(path) {
            // Continue an in-progress session; the backup stays untouched.
            Some(session) if session.state == SessionState::InProgress => {
                session.attempt_count += 1;
                let regressed = session
                    .violation_history
                    .last()
                    .is_some_and(|&prev| count > prev);
                session.violation_history.push(count);
                if converged {
                    session.state = SessionState::Converged;
                }
                EditSnapshot {
                    attempt: session.attempt_count,
                    violation_count: count,
                    regressed,
                    converged,
                }
            }
            // Untracked path, or the previous session converged: start a
            // fresh cycle and capture a fresh backup.
            _ => {
                sessions.insert(
                    path.to_string(),
                    EditSession {
                        backup_content: content.to_string(),
                        attempt_count: 1,
                        violation_history: vec![count],
                        state: if converged {
                            SessionState::Converged
                        } else {
                            SessionState::InProgress
                        },
                    },
                );
                EditSnapshot {
                    attempt: 1,
                    violation_count: count,
                    regressed: false,
                    converged,
                }
            }
        }
    }

    /// The pre-session content for `path`, if tracked.
    pub fn get_backup(&self, path: &str) -> Option<String> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.get(path).map(|s| s.backup_content.clone())
    }

    /// Drop all state for `path`.
    pub fn clear_session(&self, path: &str) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.remove(path);
    }

    /// Number of tracked paths.
    pub fn tracked_paths(&self) -> usize {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.len()
    }

    /// Persist all sessions into `dir` as JSON.
    pub fn save_to(&self, dir: &Path) -> io::Result<()> {
        std::fs::create_dir_all(dir)?;
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let json = serde_json::to_string(&*sessions)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(dir.join(SESSIONS_FILE), json)
    }

    /// Load previously persisted sessions from `dir`. An absent file yields
    /// an empty tracker; a corrupt file is an error.
    pub fn load_from(dir: &Path) -> io::Result<Self> {
        let path = dir.join(SESSIONS_FILE);
        let sessions = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e),
        };
        Ok(Self {
            sessions: Mutex::new(sessions),
        })
    }
}
