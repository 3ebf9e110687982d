//! Adapters for arbitrary writers

use crate::core::{Result, Sink};
use std::io::Write;

/// Wraps any [`Write`] implementation as a sink.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.writer.write_all(line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "writer"
    }
}

/// Accepts and drops every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl Sink for DiscardSink {
    fn write_line(&mut self, _line: &[u8]) -> Result<()> {
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "discard"
    }
}
