//! Errors that carry log fields
//!
//! [`ErrorFields`] wraps an error and collects `label:value` fields while
//! the error travels up the call stack. The frame that finally handles it
//! logs everything in one record with [`Logger::err`](super::Logger::err):
//!
//! ```
//! use ltsv_logger::prelude::*;
//!
//! fn read_config(path: &str) -> Result<String, ErrorFields> {
//!     std::fs::read_to_string(path)
//!         .map_err(|e| ErrorFields::new(e).str("path", path).stack(""))
//! }
//!
//! fn start() -> Result<(), ErrorFields> {
//!     read_config("/nonexistent/app.conf")
//!         .map_err(|e| e.context(|cause| format!("start: {}", cause)).u64("attempt", 1))?;
//!     Ok(())
//! }
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder().sink(sink.clone()).time_label("").build();
//! if let Err(e) = start() {
//!     logger.err(&e);
//! }
//! let line = sink.contents();
//! assert!(line.starts_with("level:Error\terr:start: "));
//! assert!(line.contains("\tpath:/nonexistent/app.conf\tstack:["));
//! assert!(line.trim_end().ends_with("\tattempt:1"));
//! ```

use super::escape::append_escaped;
use super::field::{begin_field, AppendFields};
use super::pool::{BufferPool, PooledBuf};
use chrono::Utc;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Owned, thread-safe error object.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

type SharedError = Arc<dyn Error + Send + Sync + 'static>;

/// Gives transforms an owned handle on the original error.
struct Original(SharedError);

impl fmt::Debug for Original {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Original {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl Error for Original {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

/// An error plus the fields gathered for it.
///
/// Field methods come from [`AppendFields`]. The record rendering is
/// `err:<message>` followed by the fields in the order they were added.
pub struct ErrorFields {
    original: SharedError,
    /// Replacement set by `context`; `None` means the original's message.
    current: Option<BoxError>,
    fields: PooledBuf<'static>,
}

impl ErrorFields {
    /// Wrap `err`. An error that already is a carrier is returned as is.
    pub fn new(err: impl Into<BoxError>) -> Self {
        let boxed: BoxError = err.into();
        match boxed.downcast::<ErrorFields>() {
            Ok(carrier) => *carrier,
            Err(plain) => Self {
                original: Arc::from(plain),
                current: None,
                fields: BufferPool::global().acquire(0),
            },
        }
    }

    /// Wrap `err` and replace its message with `transform`'s result.
    ///
    /// Fields already gathered by a carrier are kept; a plain error is
    /// promoted to a carrier first.
    pub fn wrap<F, E>(err: impl Into<BoxError>, transform: F) -> Self
    where
        F: FnOnce(BoxError) -> E,
        E: Into<BoxError>,
    {
        Self::new(err).context(transform)
    }

    /// Replace the message with `transform` applied to the current error.
    pub fn context<F, E>(mut self, transform: F) -> Self
    where
        F: FnOnce(BoxError) -> E,
        E: Into<BoxError>,
    {
        let current = match self.current.take() {
            Some(current) => current,
            None => Box::new(Original(Arc::clone(&self.original))),
        };
        self.current = Some(transform(current).into());
        self
    }

    /// Message of the current error, without fields.
    pub fn message(&self) -> String {
        match &self.current {
            Some(current) => current.to_string(),
            None => self.original.to_string(),
        }
    }

    /// The error first wrapped, whatever context was added since.
    pub fn original(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.original
    }

    /// Record when the error happened as an `errtime` field.
    pub fn errtime(self) -> Self {
        self.utc_time("errtime", &Utc::now())
    }

    /// Rendered fields without the `err` field.
    pub fn fields(&self) -> &[u8] {
        &self.fields
    }

    /// Append `err:<message>` and the gathered fields to `buf`.
    pub fn append_to(&self, buf: &mut Vec<u8>) {
        begin_field(buf, "err");
        append_escaped(buf, &self.message());
        if !self.fields.is_empty() {
            buf.push(b'\t');
            buf.extend_from_slice(&self.fields);
        }
    }
}

impl AppendFields for ErrorFields {
    #[inline]
    fn field_buf(&mut self) -> Option<&mut Vec<u8>> {
        Some(&mut *self.fields)
    }
}

impl fmt::Display for ErrorFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::with_capacity(self.fields.len() + 64);
        self.append_to(&mut buf);
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

impl fmt::Debug for ErrorFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorFields")
            .field("message", &self.message())
            .field("original", &self.original)
            .field("fields", &String::from_utf8_lossy(&self.fields))
            .finish()
    }
}

impl Error for ErrorFields {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.original)
    }
}
