//! Logging macros for one-shot records.
//!
//! Each macro takes a logger followed by `label => value` pairs and writes
//! one record through the logger's locked one-shot path. Values are
//! anything convertible into [`Value`](crate::Value).
//!
//! # Examples
//!
//! ```
//! use ltsv_logger::prelude::*;
//! use ltsv_logger::info;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder().sink(sink.clone()).time_label("").build();
//!
//! let port = 8080u16;
//! info!(logger, "msg" => "listening", "port" => port);
//!
//! assert_eq!(sink.contents(), "level:Info\tmsg:listening\tport:8080\n");
//! ```

/// Write a record at an explicit level.
///
/// # Examples
///
/// ```
/// # use ltsv_logger::prelude::*;
/// # let logger = Logger::discard();
/// use ltsv_logger::log;
/// log!(logger, LogLevel::Info, "msg" => "simple");
/// log!(logger, LogLevel::Error, "code" => 500, "retry" => false);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr $(, $label:expr => $value:expr)* $(,)?) => {
        $logger.log($level, &[$($crate::LV::new($label, $value)),*])
    };
}

/// Write a debug record; nothing is written when debug is disabled.
///
/// # Examples
///
/// ```
/// # use ltsv_logger::prelude::*;
/// # let logger = Logger::discard();
/// use ltsv_logger::debug;
/// debug!(logger, "counter" => 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $label:expr => $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Debug $(, $label => $value)*)
    };
}

/// Write an info record.
///
/// # Examples
///
/// ```
/// # use ltsv_logger::prelude::*;
/// # let logger = Logger::discard();
/// use ltsv_logger::info;
/// info!(logger, "msg" => "started", "items" => 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr $(, $label:expr => $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Info $(, $label => $value)*)
    };
}

/// Write an error record.
///
/// # Examples
///
/// ```
/// # use ltsv_logger::prelude::*;
/// # let logger = Logger::discard();
/// use ltsv_logger::error;
/// error!(logger, "msg" => "connect failed", "code" => 500);
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $label:expr => $value:expr)* $(,)?) => {
        $crate::log!($logger, $crate::LogLevel::Error $(, $label => $value)*)
    };
}

/// Write an error record followed by the caller's stack.
///
/// # Examples
///
/// ```
/// # use ltsv_logger::prelude::*;
/// # let logger = Logger::discard();
/// use ltsv_logger::error_with_stack;
/// error_with_stack!(logger, "msg" => "unexpected state");
/// ```
#[macro_export]
macro_rules! error_with_stack {
    ($logger:expr $(, $label:expr => $value:expr)* $(,)?) => {
        $logger.error_with_stack(&[$($crate::LV::new($label, $value)),*])
    };
}
