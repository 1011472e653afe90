//! Configuration error taxonomy.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
///
/// All of these are fatal: the viewer refuses to start with a bad config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::ConfigError;

    #[test]
    fn invalid_message_is_prefixed() {
        let err = ConfigError::Invalid("runtime.tick_ms must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "invalid config: runtime.tick_ms must be greater than 0"
        );
    }

    #[test]
    fn read_error_names_path() {
        let err = ConfigError::Read {
            path: "/nope/config.yaml".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        let text = err.to_string();
        assert!(text.contains("/nope/config.yaml"), "{text}");
        assert!(text.contains("missing"), "{text}");
    }
}
