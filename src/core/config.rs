//! Logger configuration
//!
//! A [`LoggerConfig`] holds the serializable part of a logger's setup. It
//! can be loaded from JSON, where every field is optional:
//!
//! ```json
//! { "debug_enabled": false, "time_label": "ts", "stack_buf_size": 4096 }
//! ```

use super::error::{LoggerError, Result};
use super::pool::DEFAULT_BUFFER_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TIME_LABEL: &str = "time";
pub const DEFAULT_LEVEL_LABEL: &str = "level";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Whether debug records are written
    pub debug_enabled: bool,

    /// Label of the timestamp field; empty omits the field
    pub time_label: String,

    /// Label of the level field; empty omits the field
    pub level_label: String,

    /// Byte budget for stacks captured by `error_with_stack` and events
    pub stack_buf_size: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            debug_enabled: true,
            time_label: DEFAULT_TIME_LABEL.to_string(),
            level_label: DEFAULT_LEVEL_LABEL.to_string(),
            stack_buf_size: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl LoggerConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation("reading logger config", path.display().to_string(), e)
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that labels cannot break the line format.
    pub fn validate(&self) -> Result<()> {
        validate_label("time_label", &self.time_label)?;
        validate_label("level_label", &self.level_label)?;
        if self.stack_buf_size == 0 {
            return Err(LoggerError::config(
                "stack_buf_size",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn validate_label(component: &str, label: &str) -> Result<()> {
    if let Some(c) = label.chars().find(|c| matches!(c, ':' | '\t' | '\n')) {
        return Err(LoggerError::config(
            component,
            format!("label {:?} contains forbidden character {:?}", label, c),
        ));
    }
    Ok(())
}
