//! Log level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a record.
///
/// Info and Error are always written. Debug can only be switched off when
/// the logger is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Error = 2,
}

impl LogLevel {
    /// The value written after the level label, e.g. `level:Info`.
    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Error => "Error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}
