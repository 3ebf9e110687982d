//! Standard stream sinks

use crate::core::{Result, Sink};
use std::io::{self, Write};

/// Writes records to the process's standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

impl Sink for StdoutSink {
    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        // One write_all under the stdout lock keeps the record contiguous
        // even next to println! from other threads.
        io::stdout().lock().write_all(line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}

/// Writes records to the process's standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl StderrSink {
    pub fn new() -> Self {
        Self
    }
}

impl Sink for StderrSink {
    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        io::stderr().lock().write_all(line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "stderr"
    }
}
