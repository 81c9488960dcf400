//! Logger collaborator for validation diagnostics and conflict reports
//!
//! Validators and the conflict reporter only hand strings to a
//! [`TermsLogger`]; where the text ends up (tracing, the terminal, a test
//! buffer) is chosen by the caller.

use colored::Colorize;
use std::sync::Mutex;

/// Sink for human-readable diagnostic lines
pub trait TermsLogger: Send + Sync {
    fn log(&self, message: &str);
}

/// Forwards diagnostics to `tracing` at WARN level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl TermsLogger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::warn!(target: "terms::validation", "{}", message);
    }
}

/// Writes diagnostics to stderr in yellow
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl TermsLogger for ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("{}", message.yellow());
    }
}

/// Captures diagnostics in memory
#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line logged so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// True if any logged line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }
}

impl TermsLogger for MemoryLogger {
    fn log(&self, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_captures_lines() {
        let logger = MemoryLogger::new();
        assert!(logger.is_empty());

        logger.log("first");
        logger.log("second line");

        assert_eq!(logger.lines(), vec!["first", "second line"]);
        assert!(logger.contains("second"));
        assert!(!logger.contains("third"));
    }

    #[test]
    fn test_loggers_are_object_safe() {
        let loggers: Vec<Box<dyn TermsLogger>> = vec![
            Box::new(TracingLogger),
            Box::new(ConsoleLogger),
            Box::new(MemoryLogger::new()),
        ];
        for logger in &loggers {
            logger.log("diagnostic");
        }
    }
}
