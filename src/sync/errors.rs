//! Per-operation error banners with automatic expiry.

use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// Operations whose failures are reported separately.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Status,
    Qr,
    Statistik,
    Logs,
    Disconnect,
    Refresh,
    Socket,
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    pub message: String,
    pub raised_at: Instant,
}

/// The latest error of each operation. A new error of the same operation replaces
/// the previous one and restarts its expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationErrors {
    entries: BTreeMap<Operation, OperationError>,
}

impl OperationErrors {
    pub fn set(&mut self, operation: Operation, message: impl Into<String>, now: Instant) {
        self.entries.insert(
            operation,
            OperationError {
                message: message.into(),
                raised_at: now,
            },
        );
    }

    /// Returns whether an error was removed.
    pub fn clear(&mut self, operation: Operation) -> bool {
        self.entries.remove(&operation).is_some()
    }

    pub fn get(&self, operation: Operation) -> Option<&str> {
        self.entries.get(&operation).map(|e| e.message.as_str())
    }

    /// Drops errors older than `ttl`. Returns whether anything expired.
    pub fn expire(&mut self, now: Instant, ttl: Duration) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|_, error| now.saturating_duration_since(error.raised_at) < ttl);
        self.entries.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(operation, message)` pairs in a stable order.
    pub fn messages(&self) -> Vec<(Operation, String)> {
        self.entries
            .iter()
            .map(|(op, e)| (*op, e.message.clone()))
            .collect()
    }
}
