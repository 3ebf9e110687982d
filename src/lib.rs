//! # LTSV Logger
//!
//! A low-overhead structured logger writing one Label-Tab-Separated-Value
//! line per record:
//!
//! ```text
//! time:2017-05-07T22:13:59.987654Z\tlevel:Info\tmsg:request done\tstatus:200
//! ```
//!
//! (`\t` stands for a literal tab.)
//!
//! ## Features
//!
//! - **Allocation-free hot path**: records are encoded into pooled buffers
//!   with dedicated integer, float, hex and timestamp writers
//! - **One record, one line**: tabs, newlines and backslashes in free text
//!   are escaped, so a record can never split or shift fields
//! - **Thread safe**: every record reaches the sink as one contiguous write
//! - **Errors with context**: [`ErrorFields`] gathers fields (stacks
//!   included) while an error travels up, and is logged in one record
//!
//! ## Example
//!
//! ```
//! use ltsv_logger::prelude::*;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder().sink(sink.clone()).time_label("").build();
//!
//! logger.info().str("msg", "request done").u64("status", 200).log();
//! logger.info_lv(&[LV::new("msg", "one-shot"), LV::new("ok", true)]);
//!
//! assert_eq!(
//!     sink.lines(),
//!     vec![
//!         "level:Info\tmsg:request done\tstatus:200",
//!         "level:Info\tmsg:one-shot\tok:true",
//!     ]
//! );
//! ```

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        AppendFields, ErrorFields, Event, Fields, LogLevel, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, Sink, Value, LV,
    };
    pub use crate::sinks::{
        DiscardSink, FileSink, MemorySink, StderrSink, StdoutSink, WriterSink,
    };
}

pub use crate::core::{
    append_value, default_logger, escape, format_utc_time, prefix_with_labels,
    set_default_logger, stack_trace, unescape, AppendFields, AppendValueFn, BoxError, BufferPool,
    BufferPoolMetrics, ErrorFields, Event, Fields, LogLevel, Logger, LoggerBuilder, LoggerConfig,
    LoggerError, LoggerMetrics, PoolMetricsSnapshot, PooledBuf, PrefixFn, Result, Sink,
    StackLimit, Value, LV, UTC_TIME_LEN,
};
pub use sinks::{DiscardSink, FileSink, MemorySink, StderrSink, StdoutSink, WriterSink};
