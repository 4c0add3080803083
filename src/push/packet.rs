//! Engine.IO v4 / Socket.IO v5 text framing.
//!
//! Only the default namespace and the packets the gateway emits are handled:
//!
//! | Frame            | Meaning                    |
//! |------------------|----------------------------|
//! | `0{...}`         | Engine.IO open handshake   |
//! | `1`              | Engine.IO close            |
//! | `2` / `3`        | ping / pong                |
//! | `40{...}`        | Socket.IO namespace connect|
//! | `41`             | Socket.IO disconnect       |
//! | `42["name",..]`  | Socket.IO event            |
//! | `44{...}`        | Socket.IO connect error    |

use crate::push::channel::PushError;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Parameters announced by the server in the open packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default = "default_ping_interval")]
    pub ping_interval: u64,
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout: u64,
}

fn default_ping_interval() -> u64 {
    25_000
}

fn default_ping_timeout() -> u64 {
    20_000
}

impl OpenInfo {
    /// Silence after which the connection is considered dead.
    pub fn liveness_window(&self) -> Duration {
        Duration::from_millis(self.ping_interval + self.ping_timeout)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(OpenInfo),
    Close,
    Ping,
    Pong,
    Noop,
    Connect,
    Disconnect,
    Event { name: String, payload: Value },
    ConnectError(String),
}

impl Packet {
    pub fn decode(frame: &str) -> Result<Packet, PushError> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| PushError::Protocol("empty frame".to_string()))?;
        let rest = chars.as_str();
        match kind {
            '0' => Ok(Packet::Open(serde_json::from_str(rest)?)),
            '1' => Ok(Packet::Close),
            '2' => Ok(Packet::Ping),
            '3' => Ok(Packet::Pong),
            '4' => Self::decode_socket(rest),
            '6' => Ok(Packet::Noop),
            other => Err(PushError::Protocol(format!(
                "unknown engine packet type '{}'",
                other
            ))),
        }
    }

    fn decode_socket(body: &str) -> Result<Packet, PushError> {
        let mut chars = body.chars();
        let kind = chars
            .next()
            .ok_or_else(|| PushError::Protocol("empty socket packet".to_string()))?;
        let rest = chars.as_str();
        match kind {
            '0' => Ok(Packet::Connect),
            '1' => Ok(Packet::Disconnect),
            '2' => Self::decode_event(rest),
            '4' => {
                let detail: Value = serde_json::from_str(rest).unwrap_or(Value::Null);
                let message = detail
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| rest.to_string());
                Ok(Packet::ConnectError(message))
            }
            other => Err(PushError::Protocol(format!(
                "unsupported socket packet type '{}'",
                other
            ))),
        }
    }

    fn decode_event(body: &str) -> Result<Packet, PushError> {
        // Acknowledgement ids precede the argument array.
        let body = body.trim_start_matches(|c: char| c.is_ascii_digit());
        let mut args: Vec<Value> = serde_json::from_str(body)?;
        if args.is_empty() {
            return Err(PushError::Protocol("event without a name".to_string()));
        }
        let name = match args.remove(0) {
            Value::String(name) => name,
            other => {
                return Err(PushError::Protocol(format!(
                    "event name is not a string: {}",
                    other
                )));
            }
        };
        let payload = if args.is_empty() {
            Value::Null
        } else {
            args.remove(0)
        };
        Ok(Packet::Event { name, payload })
    }

    /// Text frame for packets the client sends.
    pub fn encode(&self) -> Result<String, PushError> {
        match self {
            Packet::Close => Ok("1".to_string()),
            Packet::Ping => Ok("2".to_string()),
            Packet::Pong => Ok("3".to_string()),
            Packet::Connect => Ok("40".to_string()),
            Packet::Disconnect => Ok("41".to_string()),
            Packet::Event { name, payload } => Ok(format!(
                "42{}",
                serde_json::to_string(&Value::Array(vec![
                    Value::String(name.clone()),
                    payload.clone()
                ]))?
            )),
            other => Err(PushError::Protocol(format!(
                "client never sends {:?}",
                other
            ))),
        }
    }
}
