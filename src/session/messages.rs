//! Unified messaging system for session operations

use crate::sync::{LoadState, SyncSnapshot};

// ANSI Color Codes for session messages
pub const COLOR_INFO: &str = "\x1b[1;36m"; // Bold Cyan
pub const COLOR_SUCCESS: &str = "\x1b[1;32m"; // Bold Green
pub const COLOR_RESET: &str = "\x1b[0m";

/// Session-specific message types
#[derive(Debug, Clone)]
pub enum SessionMessage {
    /// Normal session start/shutdown messages
    Info(String),
    /// Success messages for completed operations
    Success(String),
}

impl SessionMessage {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn success(msg: impl Into<String>) -> Self {
        Self::Success(msg.into())
    }

    pub fn print(&self) {
        match self {
            Self::Info(msg) => {
                println!("{}[INFO]{} {}", COLOR_INFO, COLOR_RESET, msg);
            }
            Self::Success(msg) => {
                println!("{}[SUCCESS]{} {}", COLOR_SUCCESS, COLOR_RESET, msg);
            }
        }
    }
}

/// One-line summary of the connection, used when it changes in headless mode.
pub fn status_line(snapshot: &SyncSnapshot) -> String {
    let status = &snapshot.status;
    match (status.load_state, status.connected) {
        (LoadState::Loading, _) => "WhatsApp: checking...".to_string(),
        (LoadState::Error, _) => "WhatsApp: status unavailable".to_string(),
        (LoadState::Ok, true) => format!(
            "WhatsApp: connected as {}",
            status.phone_number.as_deref().unwrap_or("unknown number")
        ),
        (LoadState::Ok, false) => match &snapshot.qr {
            Some(_) => "WhatsApp: not connected, pairing QR ready (`otp-gateway qr` saves it)"
                .to_string(),
            None => "WhatsApp: not connected".to_string(),
        },
    }
}

/// Print session startup message
pub fn print_session_starting(mode: &str, user: &str, api_url: &str) {
    SessionMessage::info(format!(
        "Starting {} mode as {} against {}",
        mode, user, api_url
    ))
    .print();
}

/// Print session shutdown message
pub fn print_session_shutdown() {
    SessionMessage::info("Shutting down...").print();
}

/// Print session exit message
pub fn print_session_exit_success() {
    SessionMessage::success("OTP gateway console exited successfully").print();
}
