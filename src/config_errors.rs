//! # Configuration Error Types Module
//!
//! This module defines the error type returned while loading and compiling the
//! ingredient normalization configuration. The aggregation pipeline itself never
//! fails; only configuration loading can.

/// Custom error types for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    Io(std::io::Error),
    /// The configuration document is not valid JSON for the expected shape
    Parse(serde_json::Error),
    /// A regex pattern from one of the pattern tables does not compile
    InvalidPattern {
        /// Name of the configuration table holding the pattern
        table: &'static str,
        /// The offending pattern
        pattern: String,
        /// Underlying regex compilation error
        source: regex::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "Config read error: {err}"),
            ConfigError::Parse(err) => write!(f, "Config parse error: {err}"),
            ConfigError::InvalidPattern {
                table,
                pattern,
                source,
            } => write!(f, "Invalid pattern '{pattern}' in '{table}': {source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            ConfigError::InvalidPattern { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}
