//! Append-only status log

use chrono::Local;

/// Ordered status messages, each prefixed with the local wall-clock time.
/// Entries are never removed or rewritten during a session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogSink {
    entries: Vec<String>,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return the stored entry
    pub fn append(&mut self, message: &str) -> &str {
        let entry = format!("[{}] {}", Local::now().format("%H:%M:%S"), message);
        self.entries.push(entry);
        self.entries.last().map(String::as_str).unwrap_or_default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
