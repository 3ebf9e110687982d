//! Error types for the logger system
//!
//! Logging calls never return these: a record is either written or the
//! failure is counted in [`LoggerMetrics`](super::LoggerMetrics). Errors
//! surface only from sink construction, explicit flushes and
//! configuration loading.

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration document could not be parsed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File sink error with path
    #[error("File sink error for '{path}': {message}")]
    FileSinkError { path: String, message: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file sink error
    pub fn file_sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileSinkError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
