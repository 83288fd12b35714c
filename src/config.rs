use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

/// Location of the optional user overlay.
const USER_CONFIG_PATH: &str = "~/.config/tinysh/config.toml";

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub builtins: Builtins,
    /// Initial variable bindings, inserted without overwriting.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Interactive prompt.
    pub prompt: String,
    /// Echo each parsed program back as normalized source before running it.
    pub print_ast: bool,
    /// Maximum `while` iterations; 0 means unlimited.
    pub loop_limit: usize,
    /// How long the scanner may wait on an interactive source.
    pub read_timeout_ms: u64,
    /// One of off, error, warn, info, debug, trace.
    pub log_level: String,
    /// Also append log records to ~/.local/share/tinysh/tinysh.log.
    pub log_file: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt: ">".into(),
            print_ast: false,
            loop_limit: 0,
            read_timeout_ms: 1000,
            log_level: "warn".into(),
            log_file: false,
        }
    }
}

impl Settings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Builtins {
    /// Command names dispatched in-process instead of spawned.
    #[serde(default)]
    pub enabled: Vec<String>,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    builtins: BuiltinsOverlay,
    #[serde(default)]
    variables: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    prompt: Option<String>,
    print_ast: Option<bool>,
    loop_limit: Option<usize>,
    read_timeout_ms: Option<u64>,
    log_level: Option<String>,
    log_file: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct BuiltinsOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    enabled: Vec<String>,
    #[serde(default)]
    remove_enabled: Vec<String>,
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

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/tinysh/config.toml (if exists)
    ///
    /// Lists extend, scalars override, variables are added or replaced.
    /// Set `replace = true` in `[builtins]` to replace its defaults entirely.
    /// Use `remove_enabled` to subtract specific builtins.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Try to load the user overlay. Runs before logging is set up, so parse
    /// errors go straight to stderr.
    fn load_overlay() -> Option<ConfigOverlay> {
        let path = shellexpand::tilde(USER_CONFIG_PATH);
        let content = std::fs::read_to_string(path.as_ref()).ok()?;
        match toml::from_str(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                eprintln!("tinysh: config parse error in {path}: {e}");
                None
            }
        }
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        let s = overlay.settings;
        override_with(&mut self.settings.prompt, s.prompt);
        override_with(&mut self.settings.print_ast, s.print_ast);
        override_with(&mut self.settings.loop_limit, s.loop_limit);
        override_with(&mut self.settings.read_timeout_ms, s.read_timeout_ms);
        override_with(&mut self.settings.log_level, s.log_level);
        override_with(&mut self.settings.log_file, s.log_file);

        let b = overlay.builtins;
        merge_list(
            &mut self.builtins.enabled,
            b.enabled,
            &b.remove_enabled,
            b.replace,
        );

        self.variables.extend(overlay.variables);
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay: ConfigOverlay = toml::from_str(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}
