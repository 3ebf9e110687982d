//! Sink trait for record output destinations

use super::error::Result;

/// Byte destination for finished records.
///
/// The logger calls `write_line` with one complete record, trailing
/// newline included, while holding its write lock; a sink never sees two
/// records interleaved.
pub trait Sink: Send {
    fn write_line(&mut self, line: &[u8]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        (**self).write_line(line)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
