//! Event System
//!
//! Activity events emitted by the synchronizer and push channel

use crate::logging::{LogLevel, should_log_with_env};
use chrono::Local;
use std::fmt::Display;
use tokio::sync::mpsc;

/// Which part of the console produced an event.
#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum Source {
    /// Periodic status polling.
    Poller,
    /// Pairing QR fetches and the countdown.
    QrCode,
    /// Server push channel.
    Push,
    /// User-triggered actions (disconnect, refresh).
    Action,
    /// Statistics and recent log refreshes.
    Feed,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, strum::Display)]
pub enum EventType {
    Success,
    Error,
    Refresh,
    Waiting,
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub source: Source,
    pub msg: String,
    pub timestamp: String,
    pub event_type: EventType,
    pub log_level: LogLevel,
}

impl Event {
    pub fn new(source: Source, msg: String, event_type: EventType, log_level: LogLevel) -> Self {
        Self {
            source,
            msg,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type,
            log_level,
        }
    }

    pub fn info(source: Source, msg: impl Into<String>, event_type: EventType) -> Self {
        Self::new(source, msg.into(), event_type, LogLevel::Info)
    }

    pub fn error(source: Source, msg: impl Into<String>, log_level: LogLevel) -> Self {
        Self::new(source, msg.into(), EventType::Error, log_level)
    }

    pub fn should_display(&self) -> bool {
        // Always show success events and info level events
        if self.event_type == EventType::Success || self.log_level >= LogLevel::Info {
            return true;
        }
        should_log_with_env(self.log_level)
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.event_type, self.timestamp, self.source, self.msg
        )
    }
}

/// Cloneable handle for publishing activity events.
#[derive(Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Send a generic event. A closed channel is ignored.
    pub async fn send_event(&self, event: Event) {
        if self.sender.send(event).await.is_err() {
            log::trace!("event consumer gone");
        }
    }

    pub async fn send_info(&self, source: Source, message: impl Into<String>, event_type: EventType) {
        self.send_event(Event::info(source, message, event_type)).await;
    }

    pub async fn send_error(&self, source: Source, message: impl Into<String>, log_level: LogLevel) {
        self.send_event(Event::error(source, message, log_level)).await;
    }
}
