use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use cross_xdg::BaseDirs;

use crate::tape::{Cell, MAX_BITS};

pub const DEFAULT_MEMORY: usize = 30_000;
pub const DEFAULT_BITS: u32 = 8;

/// Tape parameters for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Initial number of cells.
    pub memory: usize,
    /// Cell width; cells hold `0..=2^bits - 1`.
    pub bits: u32,
    /// Wrap on overflow/underflow instead of saturating.
    pub wrapping: bool,
    /// Grow the tape when the pointer moves past its end instead of clamping.
    pub dynamic_memory: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            memory: DEFAULT_MEMORY,
            bits: DEFAULT_BITS,
            wrapping: true,
            dynamic_memory: true,
        }
    }
}

impl VmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory == 0 {
            return Err(ConfigError::EmptyMemory);
        }
        if self.bits == 0 || self.bits > MAX_BITS {
            return Err(ConfigError::InvalidBits { bits: self.bits });
        }
        Ok(())
    }

    /// Largest value a cell can hold under this configuration.
    pub fn max_value(&self) -> Cell {
        ((1u64 << self.bits.min(MAX_BITS)) - 1) as Cell
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("memory must be at least one cell")]
    EmptyMemory,

    #[error("bits must be between 1 and 32, got {bits}")]
    InvalidBits { bits: u32 },

    #[error("invalid value for `{key}` on line {line}: {value:?}")]
    InvalidValue { key: String, value: String, line: usize },
}

static DEFAULTS: OnceLock<VmConfig> = OnceLock::new();

/// Defaults for this process: the user's config file if present and valid,
/// otherwise the built-in values.
pub fn defaults() -> &'static VmConfig {
    DEFAULTS.get_or_init(|| load_from_toml().unwrap_or_default())
}

/// `BF_CONFIG` if set, otherwise `<config home>/bf.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os("BF_CONFIG") {
        return Some(PathBuf::from(path));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}

fn load_from_toml() -> Option<VmConfig> {
    let path = config_path()?;
    let content = fs::read_to_string(&path).ok()?;
    match parse_config(&content).and_then(|cfg| cfg.validate().map(|_| cfg)) {
        Ok(cfg) => {
            tracing::debug!(path = %path.display(), ?cfg, "loaded vm config");
            Some(cfg)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
            None
        }
    }
}

/// Read the `[vm]` section of a TOML-like config. Keys missing from the file keep
/// their built-in defaults; keys outside `[vm]` and unknown keys are ignored.
pub fn parse_config(content: &str) -> Result<VmConfig, ConfigError> {
    let mut cfg = VmConfig::default();
    let mut in_vm = false;

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_vm = line[1..line.len() - 1].trim() == "vm";
            continue;
        }
        if !in_vm { continue; }
        let Some((key, raw)) = line.split_once('=') else { continue; };

        let key = key.trim();
        let raw = strip_comment(raw).trim();
        // Accept quoted or unquoted
        let value = raw.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(raw);

        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            line: index + 1,
        };

        match key {
            "memory" => cfg.memory = value.replace('_', "").parse().map_err(|_| invalid())?,
            "bits" => cfg.bits = value.parse().map_err(|_| invalid())?,
            "wrapping" => cfg.wrapping = parse_bool(value).ok_or_else(invalid)?,
            "dynamic_memory" => cfg.dynamic_memory = parse_bool(value).ok_or_else(invalid)?,
            other => tracing::debug!(key = other, "unknown config key"),
        }
    }

    Ok(cfg)
}

/// Cut a trailing `#` comment, ignoring `#` inside double quotes.
fn strip_comment(raw: &str) -> &str {
    let mut quoted = false;
    for (i, c) in raw.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return &raw[..i],
            _ => {}
        }
    }
    raw
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
