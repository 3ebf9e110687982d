//! Typed field appenders shared by every builder
//!
//! A field is `label:value`. Fields are separated by a single tab; the
//! separator is written before a field whenever the buffer already holds
//! something, so a record never starts or ends with a tab.

use super::escape::append_escaped;
use super::stack::{append_stack, StackLimit};
use super::timestamp::append_utc_time;
use super::value::{
    append_bool, append_debug, append_display, append_f32, append_f64, append_fmt, append_hex,
    append_i64, append_u64, append_value, Value,
};
use chrono::{DateTime, TimeZone};
use std::fmt;

/// Write the separator (if needed), the label and the colon.
#[inline]
pub(crate) fn begin_field(buf: &mut Vec<u8>, label: &str) {
    if !buf.is_empty() {
        buf.push(b'\t');
    }
    buf.extend_from_slice(label.as_bytes());
    buf.push(b':');
}

/// Fluent `label:value` appenders.
///
/// Implementors only say where fields go. A builder whose record is
/// suppressed returns `None` from [`field_buf`](Self::field_buf) and every
/// appender becomes a no-op that skips encoding.
///
/// # Example
///
/// ```
/// use ltsv_logger::prelude::*;
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder().sink(sink.clone()).time_label("").build();
///
/// logger.info()
///     .str("msg", "request done")
///     .u64("status", 200)
///     .hex("digest", &[0xde, 0xad])
///     .log();
///
/// assert_eq!(sink.contents(), "level:Info\tmsg:request done\tstatus:200\tdigest:0xdead\n");
/// ```
pub trait AppendFields: Sized {
    /// Buffer the next field is appended to, or `None` when suppressed.
    fn field_buf(&mut self) -> Option<&mut Vec<u8>>;

    /// Size policy for [`stack`](Self::stack).
    fn stack_limit(&self) -> StackLimit {
        StackLimit::Unbounded
    }

    /// Append a dynamically typed value with the default encoding.
    fn lv<'v>(mut self, label: &str, value: impl Into<Value<'v>>) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_value(buf, &value.into());
        }
        self
    }

    /// Append an escaped string.
    fn str(mut self, label: &str, value: &str) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_escaped(buf, value);
        }
        self
    }

    /// Append bytes as `0x` followed by lowercase hex.
    fn hex(mut self, label: &str, value: &[u8]) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_hex(buf, value);
        }
        self
    }

    /// Append a single byte as `0x` and two hex digits.
    fn byte(self, label: &str, value: u8) -> Self {
        self.hex(label, &[value])
    }

    /// Append escaped `format_args!` output.
    fn format(mut self, label: &str, args: fmt::Arguments<'_>) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_fmt(buf, args);
        }
        self
    }

    fn bool(mut self, label: &str, value: bool) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_bool(buf, value);
        }
        self
    }

    fn i64(mut self, label: &str, value: i64) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_i64(buf, value);
        }
        self
    }

    fn u64(mut self, label: &str, value: u64) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_u64(buf, value);
        }
        self
    }

    fn f32(mut self, label: &str, value: f32) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_f32(buf, value);
        }
        self
    }

    fn f64(mut self, label: &str, value: f64) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_f64(buf, value);
        }
        self
    }

    /// Append a time in the record timestamp format, converted to UTC.
    fn utc_time<Tz: TimeZone>(mut self, label: &str, value: &DateTime<Tz>) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_utc_time(buf, value);
        }
        self
    }

    /// Append a time rendered with a strftime `format`; RFC 3339 when empty.
    fn time<Tz>(mut self, label: &str, value: &DateTime<Tz>, format: &str) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            if format.is_empty() {
                append_escaped(buf, &value.to_rfc3339());
            } else {
                append_fmt(buf, format_args!("{}", value.format(format)));
            }
        }
        self
    }

    /// Append escaped `Display` output.
    fn display(mut self, label: &str, value: &dyn fmt::Display) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_display(buf, value);
        }
        self
    }

    /// Append escaped `{:?}` output.
    fn debug_value(mut self, label: &str, value: &dyn fmt::Debug) -> Self {
        if let Some(buf) = self.field_buf() {
            begin_field(buf, label);
            append_debug(buf, value);
        }
        self
    }

    /// Append the caller's stack trace; an empty label means `stack`.
    ///
    /// The first frame is the function that called this method.
    #[inline(never)]
    fn stack(mut self, label: &str) -> Self {
        let limit = self.stack_limit();
        if let Some(buf) = self.field_buf() {
            begin_field(buf, if label.is_empty() { "stack" } else { label });
            append_stack(buf, 1, limit);
        }
        self
    }
}
