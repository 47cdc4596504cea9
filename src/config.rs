use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Settings {
    /// Enforce blocking rules instead of warning only.
    #[serde(default)]
    pub blocking: bool,
    /// Per-rule match budget in milliseconds; 0 disables the check.
    #[serde(default)]
    pub match_budget_ms: u64,
    /// State directory; empty means ~/.local/share/rulegate.
    #[serde(default)]
    pub state_dir: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct RulesConfig {
    /// Rule codes excluded from evaluation.
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct EnvironmentConfig {
    /// Ambient tags matched against rule `context_required` lists.
    #[serde(default)]
    pub tags: Vec<String>,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    rules: RulesOverlay,
    #[serde(default)]
    environment: EnvironmentOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    blocking: Option<bool>,
    match_budget_ms: Option<u64>,
    state_dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct RulesOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    disabled: Vec<String>,
    #[serde(default)]
    remove_disabled: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct EnvironmentOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    remove_tags: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/rulegate/config.toml (if exists)
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Try to load user overlay from ~/.config/rulegate/config.toml.
    fn load_overlay() -> Option<ConfigOverlay> {
        let home = std::env::var_os("HOME")?;
        let path = std::path::Path::new(&home).join(".config/rulegate/config.toml");
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                log::error!("config parse error: {e}");
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        if let Some(v) = overlay.settings.blocking {
            self.settings.blocking = v;
        }
        if let Some(v) = overlay.settings.match_budget_ms {
            self.settings.match_budget_ms = v;
        }
        if let Some(v) = overlay.settings.state_dir {
            self.settings.state_dir = v;
        }

        let r = overlay.rules;
        merge_list(
            &mut self.rules.disabled,
            r.disabled,
            &r.remove_disabled,
            r.replace,
        );

        let e = overlay.environment;
        merge_list(&mut self.environment.tags, e.tags, &e.remove_tags, e.replace);
    }

    /// The resolved state directory, falling back to ~/.local/share/rulegate.
    pub fn state_dir(&self) -> Option<std::path::PathBuf> {
        if !self.settings.state_dir.is_empty() {
            return Some(std::path::PathBuf::from(&self.settings.state_dir));
        }
        let home = std::env::var_os("HOME")?;
        Some(std::path::Path::new(&home).join(".local/share/rulegate"))
    }

    /// The per-rule match budget, if enabled.
    pub fn match_budget(&self) -> Option<std::time::Duration> {
        if self.settings.match_budget_ms == 0 {
            None
        } else {
            Some(std::time::Duration::from_millis(self.settings.match_budget_ms))
        }
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
