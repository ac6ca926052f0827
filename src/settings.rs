use crate::hotkey::{parse_hotkey, virtual_key_from_name, Hotkey};
use crate::timing::Timings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Whether casting is active at startup.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Chord that flips the enabled state at runtime, e.g. `"Ctrl+Alt+F5"`.
    /// If `None`, the helper cannot be toggled.
    pub toggle_key: Option<String>,
    /// Trigger keys mapped to skill ids, e.g. `{"F5": 3, "Q": 12}`.
    #[serde(default)]
    pub bindings: HashMap<String, u16>,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    #[serde(default = "default_confirm_poll_ms")]
    pub confirm_poll_ms: u64,
    #[serde(default = "default_confirm_retry_limit")]
    pub confirm_retry_limit: u32,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_restore_delay_ms")]
    pub restore_delay_ms: u64,
    #[serde(default = "default_restore_poll_ms")]
    pub restore_poll_ms: u64,
    #[serde(default = "default_restore_timeout_ms")]
    pub restore_timeout_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_confirm_poll_ms() -> u64 {
    Timings::default().confirm_poll_ms
}

fn default_confirm_retry_limit() -> u32 {
    Timings::default().confirm_retry_limit
}

fn default_settle_ms() -> u64 {
    Timings::default().settle_ms
}

fn default_restore_delay_ms() -> u64 {
    Timings::default().restore_delay_ms
}

fn default_restore_poll_ms() -> u64 {
    Timings::default().restore_poll_ms
}

fn default_restore_timeout_ms() -> u64 {
    Timings::default().restore_timeout_ms
}

impl Default for Settings {
    fn default() -> Self {
        let timings = Timings::default();
        Self {
            enabled: true,
            toggle_key: None,
            bindings: HashMap::new(),
            debug_logging: false,
            confirm_poll_ms: timings.confirm_poll_ms,
            confirm_retry_limit: timings.confirm_retry_limit,
            settle_ms: timings.settle_ms,
            restore_delay_ms: timings.restore_delay_ms,
            restore_poll_ms: timings.restore_poll_ms,
            restore_timeout_ms: timings.restore_timeout_ms,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Parse the toggle chord if configured. An invalid string is reported
    /// and treated as absent.
    pub fn toggle_key(&self) -> Option<Hotkey> {
        let chord = self.toggle_key.as_ref()?;
        match parse_hotkey(chord) {
            Some(hotkey) => Some(hotkey),
            None => {
                tracing::warn!("provided toggle_key string '{}' is invalid; ignoring", chord);
                None
            }
        }
    }

    /// Resolve the binding map to virtual-key codes. Unknown key names are
    /// reported and skipped.
    pub fn resolved_bindings(&self) -> HashMap<u32, u16> {
        let mut resolved = HashMap::new();
        for (name, &skill_id) in &self.bindings {
            match virtual_key_from_name(name) {
                Some(vk) => {
                    resolved.insert(vk, skill_id);
                }
                None => {
                    tracing::warn!("unknown key name '{}' in bindings; skipping", name);
                }
            }
        }
        resolved
    }

    pub fn timings(&self) -> Timings {
        Timings {
            confirm_poll_ms: self.confirm_poll_ms,
            confirm_retry_limit: self.confirm_retry_limit,
            settle_ms: self.settle_ms,
            restore_delay_ms: self.restore_delay_ms,
            restore_poll_ms: self.restore_poll_ms,
            restore_timeout_ms: self.restore_timeout_ms,
        }
    }
}
