//! Main logger implementation
//!
//! A [`Logger`] owns one sink and serializes every write to it behind a
//! mutex. Records are produced two ways:
//!
//! - one-shot calls ([`Logger::log`], [`Logger::info_lv`], [`Logger::err`],
//!   ...) build the whole line in the logger's own scratch buffer while the
//!   lock is held;
//! - builders ([`Logger::info`] returning an [`Event`], [`Logger::lvs`]
//!   returning [`Fields`]) encode into a pooled buffer without any lock and
//!   only take it to hand the finished line to the sink.
//!
//! Either way each record reaches the sink as one contiguous byte range.

use super::{
    config::{LoggerConfig, DEFAULT_LEVEL_LABEL, DEFAULT_TIME_LABEL},
    error::Result,
    error_fields::ErrorFields,
    event::{Event, Fields},
    field::begin_field,
    log_level::LogLevel,
    metrics::LoggerMetrics,
    pool::{BufferPool, DEFAULT_BUFFER_CAPACITY},
    sink::Sink,
    stack::{append_stack, StackLimit},
    timestamp::append_now,
    value::{append_fmt, append_value, AppendValueFn, Value, LV},
};
use crate::sinks::{DiscardSink, StdoutSink, WriterSink};
use parking_lot::Mutex;
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

/// Renders the record prefix (time and level fields) into an empty buffer.
///
/// The prefix must not end with a field separator; one is added before
/// the first field when the prefix is non-empty.
pub type PrefixFn = dyn Fn(&mut Vec<u8>, LogLevel) + Send + Sync;

/// Failures between two stderr diagnostics.
const FAILURE_REPORT_INTERVAL: u64 = 1000;

/// Alert on the first failure and on every `FAILURE_REPORT_INTERVAL`th.
fn should_report_failure(previous: u64) -> bool {
    previous == 0 || (previous + 1).is_multiple_of(FAILURE_REPORT_INTERVAL)
}

/// Sink plus the scratch buffer one-shot calls build into.
struct Output {
    sink: Box<dyn Sink>,
    scratch: Vec<u8>,
}

pub struct Logger {
    output: Mutex<Output>,
    debug_enabled: bool,
    append_prefix: Arc<PrefixFn>,
    append_value: Arc<AppendValueFn>,
    stack_buf_size: usize,
    metrics: LoggerMetrics,
}

/// Prefix strategy writing `time:<now>` and `level:<Level>` under the given
/// labels, skipping either one when its label is empty.
pub fn prefix_with_labels(time_label: &str, level_label: &str) -> Arc<PrefixFn> {
    let time_label = time_label.to_string();
    let level_label = level_label.to_string();
    Arc::new(move |buf: &mut Vec<u8>, level: LogLevel| {
        if !time_label.is_empty() {
            begin_field(buf, &time_label);
            append_now(buf);
        }
        if !level_label.is_empty() {
            begin_field(buf, &level_label);
            buf.extend_from_slice(level.to_str().as_bytes());
        }
    })
}

impl Logger {
    /// Logger writing to `sink` with the default configuration.
    #[must_use]
    pub fn new<S: Sink + 'static>(sink: S) -> Self {
        Self::builder().sink(sink).build()
    }

    /// Logger that writes nothing and skips debug encoding entirely.
    #[must_use]
    pub fn discard() -> Self {
        Self::builder()
            .sink(DiscardSink)
            .debug_enabled(false)
            .build()
    }

    /// Validate `config` and build a logger writing to `sink`.
    pub fn from_config<S: Sink + 'static>(config: LoggerConfig, sink: S) -> Result<Self> {
        config.validate()?;
        Ok(Self::builder().config(config).sink(sink).build())
    }

    #[inline]
    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    /// Whether records at `level` are written.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Debug || self.debug_enabled
    }

    /// Start a debug record. Encoding is skipped when debug is disabled.
    #[inline]
    pub fn debug(&self) -> Event<'_> {
        Event::new(self, LogLevel::Debug)
    }

    #[inline]
    pub fn info(&self) -> Event<'_> {
        Event::new(self, LogLevel::Info)
    }

    #[inline]
    pub fn error(&self) -> Event<'_> {
        Event::new(self, LogLevel::Error)
    }

    /// Collect fields now and pick the level when committing.
    #[inline]
    pub fn lvs(&self) -> Fields<'_> {
        Fields::new(self)
    }

    /// Write one record made of `lvs` at `level`.
    pub fn log(&self, level: LogLevel, lvs: &[LV<'_>]) {
        if !self.enabled(level) {
            self.metrics.record_suppressed();
            return;
        }
        self.write_with(level, |buf| self.append_lvs(buf, lvs));
    }

    #[inline]
    pub fn debug_lv(&self, lvs: &[LV<'_>]) {
        self.log(LogLevel::Debug, lvs);
    }

    #[inline]
    pub fn info_lv(&self, lvs: &[LV<'_>]) {
        self.log(LogLevel::Info, lvs);
    }

    #[inline]
    pub fn error_lv(&self, lvs: &[LV<'_>]) {
        self.log(LogLevel::Error, lvs);
    }

    /// Write an error record with a trailing `stack` field.
    ///
    /// The stack starts at the caller and is cut to the configured
    /// `stack_buf_size`, ending in `...` when frames were left out.
    #[inline(never)]
    pub fn error_with_stack(&self, lvs: &[LV<'_>]) {
        let mut stack = BufferPool::global().acquire_default();
        append_stack(&mut stack, 1, StackLimit::Bytes(self.stack_buf_size));
        self.write_with(LogLevel::Error, |buf| {
            self.append_lvs(buf, lvs);
            begin_field(buf, "stack");
            buf.extend_from_slice(&stack);
        });
    }

    /// Write `err` as an error record.
    ///
    /// An [`ErrorFields`] carrier contributes its message and every field
    /// gathered on the way up; any other error is written as `err:<message>`.
    pub fn err(&self, err: &(dyn Error + 'static)) {
        self.write_with(LogLevel::Error, |buf| {
            match err.downcast_ref::<ErrorFields>() {
                Some(carrier) => carrier.append_to(buf),
                None => {
                    begin_field(buf, "err");
                    append_fmt(buf, format_args!("{}", err));
                }
            }
        });
    }

    /// Get the logger metrics for detailed observability
    ///
    /// # Example
    ///
    /// ```
    /// use ltsv_logger::prelude::*;
    ///
    /// let logger = Logger::new(MemorySink::new());
    /// logger.info_lv(&[LV::new("msg", "hello")]);
    ///
    /// let metrics = logger.metrics();
    /// assert_eq!(metrics.lines_written(), 1);
    /// assert_eq!(metrics.write_failures(), 0);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn flush(&self) -> Result<()> {
        self.output.lock().sink.flush()
    }

    /// Render the prefix for `level` into `buf`.
    #[inline]
    pub(crate) fn append_prefix(&self, buf: &mut Vec<u8>, level: LogLevel) {
        (self.append_prefix)(buf, level);
    }

    /// Encode `value` with the configured value encoder.
    #[inline]
    pub(crate) fn append_value(&self, buf: &mut Vec<u8>, value: &Value<'_>) {
        (self.append_value)(buf, value);
    }

    #[inline]
    pub(crate) fn stack_buf_size(&self) -> usize {
        self.stack_buf_size
    }

    pub(crate) fn record_suppressed(&self) {
        self.metrics.record_suppressed();
    }

    fn append_lvs(&self, buf: &mut Vec<u8>, lvs: &[LV<'_>]) {
        for lv in lvs {
            begin_field(buf, lv.label);
            self.append_value(buf, &lv.value);
        }
    }

    /// Build a record in the scratch buffer and write it, all under the lock.
    pub(crate) fn write_with(&self, level: LogLevel, fields: impl FnOnce(&mut Vec<u8>)) {
        let mut output = self.output.lock();
        let Output { sink, scratch } = &mut *output;
        scratch.clear();
        self.append_prefix(scratch, level);
        fields(scratch);
        scratch.push(b'\n');
        self.emit(&mut **sink, scratch);
    }

    /// Write a finished record, newline included.
    pub(crate) fn write_record(&self, record: &[u8]) {
        let mut output = self.output.lock();
        self.emit(&mut *output.sink, record);
    }

    fn emit(&self, sink: &mut dyn Sink, record: &[u8]) {
        match sink.write_line(record) {
            Ok(()) => self.metrics.record_written(record.len()),
            Err(e) => {
                let previous = self.metrics.record_failure();
                if should_report_failure(previous) {
                    let _ = writeln!(
                        io::stderr(),
                        "[LOGGER ERROR] Sink '{}' failed ({} failures so far): {}",
                        sink.name(),
                        previous + 1,
                        e
                    );
                }
            }
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.output.get_mut().sink.flush() {
            let _ = writeln!(io::stderr(), "[LOGGER ERROR] Failed to flush on drop: {}", e);
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("debug_enabled", &self.debug_enabled)
            .field("stack_buf_size", &self.stack_buf_size)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use ltsv_logger::prelude::*;
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder()
///     .sink(sink.clone())
///     .debug_enabled(false)
///     .time_label("")
///     .level_label("lv")
///     .build();
///
/// logger.debug().str("msg", "dropped").log();
/// logger.info().str("msg", "kept").log();
/// assert_eq!(sink.contents(), "lv:Info\tmsg:kept\n");
/// ```
pub struct LoggerBuilder {
    sink: Option<Box<dyn Sink>>,
    debug_enabled: bool,
    time_label: String,
    level_label: String,
    stack_buf_size: usize,
    append_prefix: Option<Arc<PrefixFn>>,
    append_value: Option<Arc<AppendValueFn>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            sink: None,
            debug_enabled: true,
            time_label: DEFAULT_TIME_LABEL.to_string(),
            level_label: DEFAULT_LEVEL_LABEL.to_string(),
            stack_buf_size: DEFAULT_BUFFER_CAPACITY,
            append_prefix: None,
            append_value: None,
        }
    }

    /// Set the output sink (standard output when never called)
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Write to any `io::Write` implementation
    #[must_use = "builder methods return a new value"]
    pub fn writer<W: Write + Send + 'static>(self, writer: W) -> Self {
        self.sink(WriterSink::new(writer))
    }

    #[must_use = "builder methods return a new value"]
    pub fn debug_enabled(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self
    }

    /// Label of the timestamp field; empty omits it
    #[must_use = "builder methods return a new value"]
    pub fn time_label(mut self, label: impl Into<String>) -> Self {
        self.time_label = label.into();
        self
    }

    /// Label of the level field; empty omits it
    #[must_use = "builder methods return a new value"]
    pub fn level_label(mut self, label: impl Into<String>) -> Self {
        self.level_label = label.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn stack_buf_size(mut self, size: usize) -> Self {
        self.stack_buf_size = size;
        self
    }

    /// Replace the whole prefix; the time and level labels are then unused.
    ///
    /// # Example
    ///
    /// ```
    /// use ltsv_logger::prelude::*;
    ///
    /// let sink = MemorySink::new();
    /// let logger = Logger::builder()
    ///     .sink(sink.clone())
    ///     .append_prefix(|buf, level| {
    ///         buf.extend_from_slice(b"app:demo\tsev:");
    ///         buf.extend_from_slice(level.to_str().as_bytes());
    ///     })
    ///     .build();
    ///
    /// logger.error_lv(&[LV::new("n", 1)]);
    /// assert_eq!(sink.contents(), "app:demo\tsev:Error\tn:1\n");
    /// ```
    #[must_use = "builder methods return a new value"]
    pub fn append_prefix<F>(mut self, prefix: F) -> Self
    where
        F: Fn(&mut Vec<u8>, LogLevel) + Send + Sync + 'static,
    {
        self.append_prefix = Some(Arc::new(prefix));
        self
    }

    /// Replace the encoder used for dynamically typed values
    #[must_use = "builder methods return a new value"]
    pub fn append_value<F>(mut self, encoder: F) -> Self
    where
        F: Fn(&mut Vec<u8>, &Value<'_>) + Send + Sync + 'static,
    {
        self.append_value = Some(Arc::new(encoder));
        self
    }

    /// Take every setting from `config`
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.debug_enabled = config.debug_enabled;
        self.time_label = config.time_label;
        self.level_label = config.level_label;
        self.stack_buf_size = config.stack_buf_size;
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let sink = self.sink.unwrap_or_else(|| Box::new(StdoutSink::new()));
        let prefix_fn = match self.append_prefix {
            Some(prefix) => prefix,
            None => prefix_with_labels(&self.time_label, &self.level_label),
        };
        let value_fn: Arc<AppendValueFn> = match self.append_value {
            Some(encoder) => encoder,
            None => Arc::new(append_value),
        };

        Logger {
            output: Mutex::new(Output {
                sink,
                scratch: Vec::with_capacity(DEFAULT_BUFFER_CAPACITY),
            }),
            debug_enabled: self.debug_enabled,
            append_prefix: prefix_fn,
            append_value: value_fn,
            stack_buf_size: self.stack_buf_size,
            metrics: LoggerMetrics::new(),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
