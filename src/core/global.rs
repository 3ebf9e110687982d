//! Process-wide default logger
//!
//! Libraries should take a `&Logger` from their caller. The default slot is
//! for the outermost application layer: install a configured logger once
//! during startup with [`set_default_logger`] and fetch it with
//! [`default_logger`].
//!
//! Replacing the default does not redirect writers that already hold the
//! previous `Arc<Logger>`; they keep writing to it until they drop it.

use super::logger::Logger;
use parking_lot::RwLock;
use std::sync::Arc;

static DEFAULT_LOGGER: RwLock<Option<Arc<Logger>>> = RwLock::new(None);

/// The current default logger.
///
/// Until one is installed this is a standard-output logger with debug
/// output enabled and the default labels.
pub fn default_logger() -> Arc<Logger> {
    if let Some(logger) = DEFAULT_LOGGER.read().as_ref() {
        return Arc::clone(logger);
    }
    let mut slot = DEFAULT_LOGGER.write();
    Arc::clone(slot.get_or_insert_with(|| Arc::new(Logger::default())))
}

/// Install `logger` as the default, returning the previous one if any.
pub fn set_default_logger(logger: Logger) -> Option<Arc<Logger>> {
    DEFAULT_LOGGER.write().replace(Arc::new(logger))
}
