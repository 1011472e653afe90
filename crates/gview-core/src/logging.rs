//! Structured logger for the viewer.
//!
//! The terminal UI owns stdout and stderr while it runs, so log lines go to
//! a configurable sink: discarded, stderr (for non-interactive use), a file,
//! or an in-memory buffer in tests.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::config;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Log level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a log level string (case-insensitive, defaults to Info).
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().trim() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    /// Returns true if a message at `msg_level` passes this filter level.
    pub fn should_log(self, msg_level: LogLevel) -> bool {
        msg_level >= self
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Log format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Console,
    Json,
}

impl LogFormat {
    /// Parse a format string (defaults to Console).
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().trim() {
            "json" => Self::Json,
            _ => Self::Console,
        }
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Destination for formatted log lines.
#[derive(Clone, Default)]
pub enum LogSink {
    #[default]
    Discard,
    Stderr,
    Writer(SharedWriter),
    Memory(Arc<Mutex<Vec<String>>>),
}

impl LogSink {
    /// Append-mode file sink.
    pub fn file(path: &Path) -> Result<Self, ConfigError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ConfigError::LogFile {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::Writer(Arc::new(Mutex::new(Box::new(file)))))
    }

    /// Buffer sink returning the shared line buffer for assertions.
    pub fn memory() -> (Self, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        (Self::Memory(Arc::clone(&lines)), lines)
    }

    fn write_line(&self, line: &str) {
        match self {
            Self::Discard => {}
            Self::Stderr => {
                let stderr = std::io::stderr();
                let mut handle = stderr.lock();
                let _ = writeln!(handle, "{line}");
            }
            Self::Writer(writer) => {
                if let Ok(mut guard) = writer.lock() {
                    let _ = writeln!(guard, "{line}");
                    let _ = guard.flush();
                }
            }
            Self::Memory(lines) => {
                if let Ok(mut guard) = lines.lock() {
                    guard.push(line.to_owned());
                }
            }
        }
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discard => "Discard",
            Self::Stderr => "Stderr",
            Self::Writer(_) => "Writer",
            Self::Memory(_) => "Memory",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Runtime logging settings, resolved from [`config::LoggingConfig`].
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub sink: LogSink,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Console,
            sink: LogSink::Discard,
        }
    }
}

impl LoggingConfig {
    /// Resolve the file-level settings, opening the log file if one is set.
    pub fn from_config(cfg: &config::LoggingConfig) -> Result<Self, ConfigError> {
        let sink = match &cfg.file {
            Some(path) => LogSink::file(path)?,
            None => LogSink::Discard,
        };
        Ok(Self {
            level: LogLevel::parse(&cfg.level),
            format: LogFormat::parse(&cfg.format),
            sink,
        })
    }
}

/// A structured logger with component/field context.
#[derive(Debug, Clone)]
pub struct Logger {
    level: LogLevel,
    format: LogFormat,
    sink: LogSink,
    fields: Vec<(String, String)>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(&LoggingConfig::default())
    }
}

impl Logger {
    pub fn new(cfg: &LoggingConfig) -> Self {
        Self {
            level: cfg.level,
            format: cfg.format,
            sink: cfg.sink.clone(),
            fields: Vec::new(),
        }
    }

    /// Logger that drops everything.
    pub fn discard() -> Self {
        Self::default()
    }

    /// Create a child logger with an additional field.
    pub fn with_field(&self, key: &str, value: &str) -> Self {
        let mut child = self.clone();
        child.fields.push((key.to_string(), value.to_string()));
        child
    }

    /// Create a child logger for a named component.
    pub fn component(&self, name: &str) -> Self {
        self.with_field("component", name)
    }

    pub fn log(&self, level: LogLevel, msg: &str) {
        self.log_with_fields(level, msg, &[]);
    }

    /// Log a message with extra inline fields.
    pub fn log_with_fields(&self, level: LogLevel, msg: &str, extra: &[(&str, &str)]) {
        if !self.level.should_log(level) {
            return;
        }
        let line = match self.format {
            LogFormat::Console => self.console_line(level, msg, extra),
            LogFormat::Json => self.json_line(level, msg, extra),
        };
        self.sink.write_line(&line);
    }

    fn console_line(&self, level: LogLevel, msg: &str, extra: &[(&str, &str)]) -> String {
        let mut line = format!("{} {level} ", chrono::Utc::now().format("%H:%M:%S"));
        for (k, v) in &self.fields {
            line.push_str(&format!("{k}={v} "));
        }
        for (k, v) in extra {
            line.push_str(&format!("{k}={v} "));
        }
        line.push_str(msg);
        line
    }

    fn json_line(&self, level: LogLevel, msg: &str, extra: &[(&str, &str)]) -> String {
        let mut object = serde_json::Map::new();
        object.insert(
            "time".into(),
            serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
        );
        object.insert("level".into(), serde_json::Value::String(level.to_string()));
        let fields = self
            .fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(extra.iter().copied());
        for (k, v) in fields {
            object.insert(k.to_owned(), serde_json::Value::String(v.to_owned()));
        }
        object.insert("message".into(), serde_json::Value::String(msg.to_owned()));
        serde_json::Value::Object(object).to_string()
    }

    pub fn trace(&self, msg: &str) {
        self.log(LogLevel::Trace, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.log(LogLevel::Debug, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(LogLevel::Info, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.log(LogLevel::Warn, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(LogLevel::Error, msg);
    }

    pub fn debug_with(&self, msg: &str, fields: &[(&str, &str)]) {
        self.log_with_fields(LogLevel::Debug, msg, fields);
    }

    pub fn info_with(&self, msg: &str, fields: &[(&str, &str)]) {
        self.log_with_fields(LogLevel::Info, msg, fields);
    }

    pub fn warn_with(&self, msg: &str, fields: &[(&str, &str)]) {
        self.log_with_fields(LogLevel::Warn, msg, fields);
    }

    pub fn error_with(&self, msg: &str, fields: &[(&str, &str)]) {
        self.log_with_fields(LogLevel::Error, msg, fields);
    }
}

/// Build the root logger for the viewer from file-level config.
pub fn init_logger(cfg: &config::LoggingConfig) -> Result<Logger, ConfigError> {
    let resolved = LoggingConfig::from_config(cfg)?;
    Ok(Logger::new(&resolved).component("gview"))
}
