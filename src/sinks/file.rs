//! File sink implementation

use crate::core::{LoggerError, Result, Sink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends records to a file through a buffered writer.
///
/// Records reach the disk on [`flush`](Sink::flush), when the internal
/// buffer fills, or when the sink is dropped.
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Open (or create) `path` for appending.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ltsv_logger::prelude::*;
    ///
    /// let sink = FileSink::new("/var/log/app.ltsv")?;
    /// let logger = Logger::builder().sink(sink).build();
    /// logger.info().str("msg", "started").log();
    /// # Ok::<(), LoggerError>(())
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation("opening log file", path.display().to_string(), e)
            })?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.writer.write_all(line)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
