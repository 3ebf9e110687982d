//! Core logger types and traits

pub mod config;
pub mod error;
pub mod error_fields;
pub mod escape;
pub mod event;
pub mod field;
pub mod global;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod pool;
pub mod sink;
pub mod stack;
pub mod timestamp;
pub mod value;

pub use config::LoggerConfig;
pub use error::{LoggerError, Result};
pub use error_fields::{BoxError, ErrorFields};
pub use escape::{escape, unescape};
pub use event::{Event, Fields};
pub use field::AppendFields;
pub use global::{default_logger, set_default_logger};
pub use log_level::LogLevel;
pub use logger::{prefix_with_labels, Logger, LoggerBuilder, PrefixFn};
pub use metrics::LoggerMetrics;
pub use pool::{BufferPool, BufferPoolMetrics, PoolMetricsSnapshot, PooledBuf};
pub use sink::Sink;
pub use stack::{stack_trace, StackLimit};
pub use timestamp::{format_utc_time, UTC_TIME_LEN};
pub use value::{append_value, AppendValueFn, Value, LV};
