//! Centralized error handling and classification

use crate::gateway::error::GatewayError;
use crate::logging::LogLevel;
use reqwest::StatusCode;

/// Centralized error handler for all gateway operations
#[derive(Debug, Clone, Default)]
pub struct ErrorHandler;

impl ErrorHandler {
    pub fn new() -> Self {
        Self
    }

    /// Classify error and determine appropriate log level
    pub fn classify_error(&self, error: &GatewayError) -> LogLevel {
        match error {
            // Rate limiting - low priority
            GatewayError::Http { status, .. } if *status == 429 => LogLevel::Debug,

            // Server errors - temporary issues
            GatewayError::Http { status, .. } if (500..=599).contains(status) => LogLevel::Warn,

            // Authentication errors - critical
            GatewayError::Http { status, .. } if *status == 401 => LogLevel::Error,
            GatewayError::Http { status, .. } if *status == 403 => LogLevel::Error,

            // Malformed payloads point at a backend/client mismatch
            GatewayError::Decode(_) | GatewayError::MissingField(_) => LogLevel::Error,

            // Network issues and timeouts - usually temporary
            GatewayError::Reqwest(_) | GatewayError::Timeout => LogLevel::Warn,

            // Other errors
            _ => LogLevel::Warn,
        }
    }

    /// Short label suitable for an inline error banner.
    pub fn short_message(&self, error: &GatewayError) -> String {
        match error {
            GatewayError::Timeout => "Request timed out".to_string(),
            GatewayError::Http { status, .. } => {
                if let Some(message) = error.server_message() {
                    return format!("HTTP {}: {}", status, message);
                }
                let reason = StatusCode::from_u16(*status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unexpected status");
                format!("HTTP {}: {}", status, reason)
            }
            GatewayError::Reqwest(e) if e.is_connect() => "Cannot reach gateway".to_string(),
            GatewayError::Reqwest(_) => "Network error".to_string(),
            GatewayError::Decode(_) => "Malformed response".to_string(),
            GatewayError::MissingField(field) => format!("Response missing '{}'", field),
        }
    }
}
