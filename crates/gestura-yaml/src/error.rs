//! Error types for preset and trace loading.

use gestura_core::GestureError;
use thiserror::Error;

/// Errors that can occur while loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parse or write error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML write error
    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    /// JSON parse or write error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error reading a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A relation names a recognizer the preset does not define.
    #[error("invalid relation on '{recognizer}': {source}")]
    Relation {
        /// Recognizer whose relation failed
        recognizer: String,
        /// Underlying manager error
        source: GestureError,
    },

    /// File extension maps to no known format.
    #[error("unsupported format '{0}' (expected yaml, yml, toml or json)")]
    UnsupportedFormat(String),

    /// Trace timestamps go backwards.
    #[error("trace event {index} at {at}ms is earlier than the previous event at {previous}ms")]
    OutOfOrder {
        /// Position of the offending event
        index: usize,
        /// Its timestamp
        at: u64,
        /// Timestamp of the event before it
        previous: u64,
    },
}
