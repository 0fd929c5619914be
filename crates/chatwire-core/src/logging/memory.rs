//! In-memory logger that records every message

use parking_lot::Mutex;

use super::traits::{LogLevel, Logger};

/// A captured log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Logger that keeps records in memory
///
/// Useful for asserting on what the stream pipeline reported.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    /// Create an empty memory logger
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Messages logged at exactly `level`
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    /// Whether any record at `level` contains `needle`
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    /// Drop all records
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.records.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_logger_records_levels() {
        let logger = MemoryLogger::new();
        logger.info("starting");
        logger.warn("bad frame: {oops");
        logger.log(LogLevel::Error, "failed");

        assert_eq!(logger.records().len(), 3);
        assert_eq!(logger.messages_at(LogLevel::Warn), vec!["bad frame: {oops"]);
        assert!(logger.contains(LogLevel::Error, "failed"));
        assert!(!logger.contains(LogLevel::Debug, "failed"));

        logger.clear();
        assert!(logger.records().is_empty());
    }

    #[test]
    fn test_macros_format_through_shared_logger() {
        let logger = Arc::new(MemoryLogger::new());
        let shared: crate::logging::SharedLogger = logger.clone();
        crate::log_warn!(shared, "skipping frame {}", 3);
        crate::log_info!(shared, "{} deltas", 2);

        assert!(logger.contains(LogLevel::Warn, "skipping frame 3"));
        assert!(logger.contains(LogLevel::Info, "2 deltas"));
    }
}
