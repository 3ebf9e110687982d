//! Record builders
//!
//! An [`Event`] knows its level up front: the prefix is rendered when it
//! is created and a suppressed event never touches the buffer pool.
//! [`Fields`] collects fields first and takes its level when committed.
//!
//! Both own a pooled buffer for their whole life and return it when
//! dropped. Consuming `self` on commit rules out writing a record twice.

use super::field::{begin_field, AppendFields};
use super::log_level::LogLevel;
use super::logger::Logger;
use super::pool::{BufferPool, PooledBuf};
use super::stack::StackLimit;
use super::value::Value;

/// Record builder with a fixed level, created by [`Logger::debug`],
/// [`Logger::info`] and [`Logger::error`].
#[must_use = "an event is only written by calling `log`"]
#[derive(Debug)]
pub struct Event<'l> {
    logger: &'l Logger,
    level: LogLevel,
    buf: Option<PooledBuf<'static>>,
}

impl<'l> Event<'l> {
    pub(crate) fn new(logger: &'l Logger, level: LogLevel) -> Self {
        let buf = logger.enabled(level).then(|| {
            let mut buf = BufferPool::global().acquire_default();
            logger.append_prefix(&mut buf, level);
            buf
        });
        Self { logger, level, buf }
    }

    /// Whether this event will produce output.
    #[inline]
    pub fn enabled(&self) -> bool {
        self.buf.is_some()
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Terminate the record and write it.
    pub fn log(self) {
        let Event { logger, buf, .. } = self;
        match buf {
            Some(mut buf) => {
                buf.push(b'\n');
                logger.write_record(&buf);
            }
            None => logger.record_suppressed(),
        }
    }
}

impl AppendFields for Event<'_> {
    #[inline]
    fn field_buf(&mut self) -> Option<&mut Vec<u8>> {
        self.buf.as_deref_mut()
    }

    fn stack_limit(&self) -> StackLimit {
        StackLimit::Bytes(self.logger.stack_buf_size())
    }

    fn lv<'v>(mut self, label: &str, value: impl Into<Value<'v>>) -> Self {
        if let Some(buf) = self.buf.as_deref_mut() {
            begin_field(buf, label);
            self.logger.append_value(buf, &value.into());
        }
        self
    }
}

/// Field list whose level is chosen on commit, created by [`Logger::lvs`].
///
/// ```
/// use ltsv_logger::prelude::*;
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder().sink(sink.clone()).time_label("").build();
///
/// let fields = logger.lvs().str("user", "alice").i64("attempts", 3);
/// fields.error();
///
/// assert_eq!(sink.contents(), "level:Error\tuser:alice\tattempts:3\n");
/// ```
#[must_use = "fields are only written by committing them at a level"]
#[derive(Debug)]
pub struct Fields<'l> {
    logger: &'l Logger,
    buf: PooledBuf<'static>,
}

impl<'l> Fields<'l> {
    pub(crate) fn new(logger: &'l Logger) -> Self {
        Self {
            logger,
            buf: BufferPool::global().acquire_default(),
        }
    }

    pub fn debug(self) {
        self.commit(LogLevel::Debug);
    }

    pub fn info(self) {
        self.commit(LogLevel::Info);
    }

    pub fn error(self) {
        self.commit(LogLevel::Error);
    }

    /// Write the collected fields at `level`.
    pub fn commit(self, level: LogLevel) {
        if !self.logger.enabled(level) {
            self.logger.record_suppressed();
            return;
        }
        let fields: &[u8] = &self.buf;
        self.logger.write_with(level, |out| {
            if !fields.is_empty() {
                if !out.is_empty() {
                    out.push(b'\t');
                }
                out.extend_from_slice(fields);
            }
        });
    }
}

impl AppendFields for Fields<'_> {
    #[inline]
    fn field_buf(&mut self) -> Option<&mut Vec<u8>> {
        Some(&mut *self.buf)
    }

    fn stack_limit(&self) -> StackLimit {
        StackLimit::Bytes(self.logger.stack_buf_size())
    }

    fn lv<'v>(mut self, label: &str, value: impl Into<Value<'v>>) -> Self {
        begin_field(&mut self.buf, label);
        self.logger.append_value(&mut self.buf, &value.into());
        self
    }
}
