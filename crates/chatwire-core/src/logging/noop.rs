//! No-op logger implementation

use super::traits::{LogLevel, Logger};

/// A logger that drops every record
///
/// The default for embedders that route diagnostics elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}

    fn log(&self, _level: LogLevel, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::SharedLogger;
    use std::sync::Arc;

    #[test]
    fn test_noop_logger_through_macros() {
        let logger: SharedLogger = Arc::new(NoOpLogger::new());
        crate::log_debug!(logger, "[{}] dropped", "local");
        crate::log_error!(logger, "{} frames", 3);
        logger.log(LogLevel::Warn, "dropped");
    }
}
