//! Error types for the antforage crate

use thiserror::Error;

/// Main error type for the antforage crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("unknown strategy '{name}' (expected one of: {expected})")]
    UnknownStrategy { name: String, expected: String },

    #[error("unknown learning method '{name}' (expected one of: {expected})")]
    UnknownLearningMethod { name: String, expected: String },

    #[error("unknown direction '{name}' (expected up, down, left or right)")]
    UnknownDirection { name: String },

    #[error("invalid state key '{key}': {reason}")]
    InvalidStateKey { key: String, reason: String },

    #[error("position ({x}, {y}) is outside the {width}x{height} grid")]
    PositionOutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
    },

    #[error("agent {id} not found")]
    AgentNotFound { id: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("{strategy} agents cannot import a {snapshot} snapshot")]
    SnapshotMismatch { strategy: String, snapshot: String },

    #[error("{strategy} agents carry no learned values")]
    NoValueStore { strategy: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
