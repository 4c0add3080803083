//! Error handling for the gateway module

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request did not complete within the request timeout.
    #[error("Request timed out")]
    Timeout,

    /// Reqwest error, typically related to network issues or request failures.
    #[error("Reqwest error: {0}")]
    Reqwest(reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body was not the JSON shape we expected.
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response decoded but lacked a field the operation depends on.
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Reqwest(error)
        }
    }
}

impl GatewayError {
    pub async fn from_response(response: reqwest::Response) -> GatewayError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());

        GatewayError::Http { status, message }
    }

    /// Pulls a human-readable message out of a JSON error body such as
    /// `{"message": "..."}` or `{"error": "..."}`.
    pub fn server_message(&self) -> Option<String> {
        let GatewayError::Http { message, .. } = self else {
            return None;
        };
        let body: serde_json::Value = serde_json::from_str(message).ok()?;
        ["message", "error"]
            .iter()
            .find_map(|key| body.get(key).and_then(|v| v.as_str()))
            .map(str::to_string)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_reads_json_body() {
        let error = GatewayError::Http {
            status: 409,
            message: r#"{"message":"Email sudah terdaftar"}"#.to_string(),
        };
        assert_eq!(
            error.server_message().as_deref(),
            Some("Email sudah terdaftar")
        );
        assert_eq!(error.status(), Some(409));
    }

    #[test]
    fn server_message_ignores_plain_bodies() {
        let error = GatewayError::Http {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(error.server_message(), None);
        assert_eq!(GatewayError::Timeout.server_message(), None);
    }
}
