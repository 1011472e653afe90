//! Configuration for the gview viewer.
//!
//! Precedence: built-in defaults < YAML config file < environment overrides.
//! An explicitly requested config file must be readable; the default search
//! location is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const ENV_THEME: &str = "GVIEW_THEME";
pub const ENV_LOG_LEVEL: &str = "GVIEW_LOG_LEVEL";
pub const ENV_LOG_FILE: &str = "GVIEW_LOG_FILE";

const THEMES: [&str; 3] = ["dark", "light", "high-contrast"];

// ---------------------------------------------------------------------------
// Root config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Text shown in the header row.
    pub header: String,
    /// One of `dark`, `light`, `high-contrast`.
    pub theme: String,
    pub logging: LoggingConfig,
    pub display: DisplayConfig,
    pub runtime: RuntimeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header: "General Viewer".into(),
            theme: "dark".into(),
            logging: LoggingConfig::default(),
            display: DisplayConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
}

/// Logging section. An empty `file` means logs are discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "console".into(),
            file: None,
        }
    }
}

/// How messages are turned into summaries and detail views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Top-level fields joined into the summary line; empty means the whole
    /// message in compact form.
    pub summary_fields: Vec<String>,
    /// Detail view opened by `enter`.
    pub default_view: usize,
}

/// UI loop settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Upper bound on how long the loop waits for input before draining the
    /// message feed again.
    pub tick: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
        }
    }
}

impl Config {
    /// Validates the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.logging.level.to_lowercase().trim() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "logging.level must be one of trace, debug, info, warn, error".into(),
                ))
            }
        }
        match self.logging.format.to_lowercase().trim() {
            "console" | "json" => {}
            _ => {
                return Err(ConfigError::Invalid(
                    "logging.format must be one of console, json".into(),
                ))
            }
        }
        if !THEMES.contains(&self.theme.trim()) {
            return Err(ConfigError::Invalid(format!(
                "theme must be one of {} (got {:?})",
                THEMES.join(", "),
                self.theme
            )));
        }
        if self.runtime.tick.is_zero() {
            return Err(ConfigError::Invalid(
                "runtime.tick_ms must be greater than 0".into(),
            ));
        }
        if self
            .display
            .summary_fields
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "display.summary_fields must not contain empty names".into(),
            ));
        }
        Ok(())
    }

    /// Applies `GVIEW_*` environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(theme) = lookup(ENV_THEME).filter(|v| !v.trim().is_empty()) {
            self.theme = theme.trim().to_owned();
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.logging.level = level.trim().to_owned();
        }
        if let Some(file) = lookup(ENV_LOG_FILE).filter(|v| !v.trim().is_empty()) {
            self.logging.file = Some(expand_tilde(file.trim()));
        }
    }
}

// ---------------------------------------------------------------------------
// File loading
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    #[serde(default)]
    header: String,
    #[serde(default)]
    theme: String,
    #[serde(default)]
    logging: PartialLoggingConfig,
    #[serde(default)]
    display: PartialDisplayConfig,
    #[serde(default)]
    runtime: PartialRuntimeConfig,
}

#[derive(Debug, Default, Deserialize)]
struct PartialLoggingConfig {
    #[serde(default)]
    level: String,
    #[serde(default)]
    format: String,
    #[serde(default)]
    file: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialDisplayConfig {
    #[serde(default)]
    summary_fields: Vec<String>,
    #[serde(default)]
    default_view: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialRuntimeConfig {
    #[serde(default)]
    tick_ms: Option<u64>,
}

/// Load config from `config_file` (or the default location), then apply
/// environment overrides and validate.
///
/// Returns the config and the path it was read from, if any.
pub fn load_config(config_file: Option<&Path>) -> Result<(Config, Option<PathBuf>), ConfigError> {
    let (mut cfg, used) = load_file(config_file)?;
    cfg.apply_env(|key| std::env::var(key).ok());
    cfg.validate()?;
    Ok((cfg, used))
}

fn load_file(config_file: Option<&Path>) -> Result<(Config, Option<PathBuf>), ConfigError> {
    let mut cfg = Config::default();

    let explicit = config_file
        .filter(|path| !path.as_os_str().is_empty())
        .map(Path::to_path_buf);
    let required = explicit.is_some();
    let Some(path) = explicit.or_else(default_config_path) else {
        return Ok((cfg, None));
    };

    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(source) if required => return Err(ConfigError::Read { path, source }),
        Err(_) => return Ok((cfg, None)),
    };
    let partial = parse_partial(&path, &text)?;
    apply_partial(&mut cfg, partial);
    Ok((cfg, Some(path)))
}

fn parse_partial(path: &Path, text: &str) -> Result<PartialConfig, ConfigError> {
    if text.trim().is_empty() {
        return Ok(PartialConfig::default());
    }
    serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_partial(cfg: &mut Config, partial: PartialConfig) {
    if !partial.header.trim().is_empty() {
        cfg.header = partial.header.trim().to_owned();
    }
    if !partial.theme.trim().is_empty() {
        cfg.theme = partial.theme.trim().to_lowercase();
    }
    if !partial.logging.level.trim().is_empty() {
        cfg.logging.level = partial.logging.level.trim().to_owned();
    }
    if !partial.logging.format.trim().is_empty() {
        cfg.logging.format = partial.logging.format.trim().to_owned();
    }
    if !partial.logging.file.trim().is_empty() {
        cfg.logging.file = Some(expand_tilde(partial.logging.file.trim()));
    }
    if !partial.display.summary_fields.is_empty() {
        cfg.display.summary_fields = partial.display.summary_fields;
    }
    if let Some(view) = partial.display.default_view {
        cfg.display.default_view = view;
    }
    if let Some(tick_ms) = partial.runtime.tick_ms {
        cfg.runtime.tick = Duration::from_millis(tick_ms);
    }
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("gview").join("config.yaml"));
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(
                PathBuf::from(home)
                    .join(".config")
                    .join("gview")
                    .join("config.yaml"),
            );
        }
    }
    None
}

/// Expand a leading `~` to `$HOME`. Left untouched when HOME is unset.
pub fn expand_tilde(input: &str) -> PathBuf {
    let home = std::env::var("HOME").ok().filter(|h| !h.trim().is_empty());
    match (input, home) {
        ("~", Some(home)) => PathBuf::from(home),
        (path, Some(home)) if path.starts_with("~/") => PathBuf::from(home).join(&path[2..]),
        (path, _) => PathBuf::from(path),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
