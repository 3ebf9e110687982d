//! In-memory capture sink

use crate::core::{Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

/// Collects records in a shared buffer.
///
/// Clones share the same buffer, so one clone can be handed to a logger
/// while another is kept to inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    /// Written records without their trailing newlines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    /// Raw bytes written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.buf.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.buf.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.lock().is_empty()
    }

    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.buf.lock().extend_from_slice(line);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
