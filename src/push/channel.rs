//! Server push subscription.
//!
//! Connects to the gateway's Socket.IO endpoint over WebSocket, keeps the
//! Engine.IO heartbeat alive and forwards `whatsapp-status` and `otp-log`
//! events. Lost connections are retried with a fixed delay until the attempt
//! budget is spent; a successful handshake restores the full budget.

use crate::consts::cli_consts::push::{RECONNECT_ATTEMPTS, connect_timeout, reconnect_delay};
use crate::gateway::types::{LogEntry, StatusUpdate};
use crate::push::packet::Packet;
use futures::{SinkExt, StreamExt};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::{self, Message};

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Malformed push payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid push URL: {0}")]
    InvalidUrl(String),

    #[error("Push channel timed out")]
    Timeout,

    #[error("Connection rejected: {0}")]
    Rejected(String),

    #[error("Push consumer went away")]
    ReceiverGone,
}

/// What the push channel reports to the synchronizer.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Connected,
    /// The connection dropped; a reconnect is scheduled.
    Disconnected(String),
    /// The reconnect budget is spent; no further events will arrive.
    GaveUp(String),
    WhatsappStatus(StatusUpdate),
    OtpLog(LogEntry),
}

impl PushEvent {
    /// Maps a Socket.IO event. Unknown events and empty payloads yield `None`.
    pub fn from_event(name: &str, payload: Value) -> Result<Option<PushEvent>, PushError> {
        if payload.is_null() {
            return Ok(None);
        }
        match name {
            "whatsapp-status" => Ok(Some(PushEvent::WhatsappStatus(serde_json::from_value(
                payload,
            )?))),
            "otp-log" => Ok(Some(PushEvent::OtpLog(serde_json::from_value(payload)?))),
            _ => Ok(None),
        }
    }
}

/// WebSocket address of the Socket.IO endpoint served at `base`.
pub fn socket_io_url(base: &str) -> Result<Url, PushError> {
    let mut url =
        Url::parse(base).map_err(|e| PushError::InvalidUrl(format!("{}: {}", base, e)))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(PushError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                other, base
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| PushError::InvalidUrl(base.to_string()))?;
    url.set_path("/socket.io/");
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}

pub struct PushChannel {
    url: Url,
    sender: mpsc::Sender<PushEvent>,
    reconnect_delay: Duration,
    max_attempts: u32,
}

impl PushChannel {
    pub fn new(base_url: &str, sender: mpsc::Sender<PushEvent>) -> Result<Self, PushError> {
        Ok(Self {
            url: socket_io_url(base_url)?,
            sender,
            reconnect_delay: reconnect_delay(),
            max_attempts: RECONNECT_ATTEMPTS,
        })
    }

    pub fn with_reconnect(mut self, delay: Duration, max_attempts: u32) -> Self {
        self.reconnect_delay = delay;
        self.max_attempts = max_attempts;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Runs until shutdown, until the consumer is dropped, or until reconnects are exhausted.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut failures: u32 = 0;
        loop {
            let outcome = tokio::select! {
                _ = shutdown.recv() => {
                    log::debug!("push channel shutting down");
                    return;
                }
                outcome = self.session(&mut failures) => outcome,
            };

            let reason = match outcome {
                Ok(()) => "connection closed by server".to_string(),
                Err(PushError::ReceiverGone) => return,
                Err(e) => e.to_string(),
            };

            failures += 1;
            if failures > self.max_attempts {
                log::warn!(
                    "push channel giving up after {} reconnect attempts: {}",
                    self.max_attempts,
                    reason
                );
                let _ = self.sender.send(PushEvent::GaveUp(reason)).await;
                return;
            }

            log::info!(
                "push channel lost ({}), reconnect {}/{} in {:?}",
                reason,
                failures,
                self.max_attempts,
                self.reconnect_delay
            );
            if self
                .sender
                .send(PushEvent::Disconnected(reason))
                .await
                .is_err()
            {
                return;
            }

            tokio::select! {
                _ = shutdown.recv() => return,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }
    }

    async fn emit(&self, event: PushEvent) -> Result<(), PushError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| PushError::ReceiverGone)
    }

    /// One connection from handshake to close.
    async fn session(&self, failures: &mut u32) -> Result<(), PushError> {
        let (ws, _response) =
            tokio::time::timeout(connect_timeout(), tokio_tungstenite::connect_async(self.url.as_str()))
                .await
                .map_err(|_| PushError::Timeout)??;
        let (mut ws_tx, mut ws_rx) = ws.split();

        // Replaced by the server's heartbeat window once the open packet arrives.
        let mut liveness = connect_timeout();

        loop {
            let message = match tokio::time::timeout(liveness, ws_rx.next()).await {
                Err(_) => return Err(PushError::Timeout),
                Ok(None) => return Ok(()),
                Ok(Some(message)) => message?,
            };
            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => return Ok(()),
                _ => continue,
            };

            let packet = match Packet::decode(text.as_str()) {
                Ok(packet) => packet,
                Err(e) => {
                    log::warn!("skipping push frame: {}", e);
                    continue;
                }
            };

            match packet {
                Packet::Open(info) => {
                    log::debug!("push session {} opened", info.sid);
                    liveness = info.liveness_window();
                    ws_tx
                        .send(Message::Text(Packet::Connect.encode()?.into()))
                        .await?;
                }
                Packet::Connect => {
                    *failures = 0;
                    log::info!("push channel connected to {}", self.url);
                    self.emit(PushEvent::Connected).await?;
                }
                Packet::Ping => {
                    ws_tx
                        .send(Message::Text(Packet::Pong.encode()?.into()))
                        .await?;
                }
                Packet::Event { name, payload } => match PushEvent::from_event(&name, payload) {
                    Ok(Some(event)) => self.emit(event).await?,
                    Ok(None) => log::debug!("ignoring push event '{}'", name),
                    Err(e) => log::warn!("malformed '{}' payload: {}", name, e),
                },
                Packet::ConnectError(message) => return Err(PushError::Rejected(message)),
                Packet::Close | Packet::Disconnect => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    return Ok(());
                }
                Packet::Pong | Packet::Noop => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::net::TcpListener;

    #[test]
    fn socket_url_switches_scheme_and_path() {
        assert_eq!(
            socket_io_url("http://localhost:3001").unwrap().as_str(),
            "ws://localhost:3001/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            socket_io_url("https://otp.example.com/api").unwrap().as_str(),
            "wss://otp.example.com/socket.io/?EIO=4&transport=websocket"
        );
        assert!(socket_io_url("ftp://otp.example.com").is_err());
        assert!(socket_io_url("not a url").is_err());
    }

    #[test]
    fn maps_known_events() {
        let status = PushEvent::from_event(
            "whatsapp-status",
            json!({"whatsapp_connected": true, "phone_number": "628123456789"}),
        )
        .unwrap();
        assert_eq!(
            status,
            Some(PushEvent::WhatsappStatus(
                StatusUpdate::connected(true).with_phone_number("628123456789")
            ))
        );

        let log = PushEvent::from_event("otp-log", json!({"phone": "628555", "status": "failed"}))
            .unwrap();
        assert!(matches!(log, Some(PushEvent::OtpLog(entry)) if entry.phone == "628555"));

        assert_eq!(PushEvent::from_event("otp-log", Value::Null).unwrap(), None);
        assert_eq!(PushEvent::from_event("typing", json!({})).unwrap(), None);
    }

    #[tokio::test]
    /// Full handshake against a local Socket.IO look-alike.
    async fn forwards_events_and_answers_pings() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (frames_tx, mut frames_rx) = mpsc::channel::<String>(8);

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Text(
                r#"0{"sid":"abc","pingInterval":25000,"pingTimeout":20000}"#.into(),
            ))
            .await
            .unwrap();
            let connect = ws.next().await.unwrap().unwrap();
            frames_tx.send(connect.to_text().unwrap().to_string()).await.unwrap();

            ws.send(Message::Text("40".into())).await.unwrap();
            ws.send(Message::Text("2".into())).await.unwrap();
            let pong = ws.next().await.unwrap().unwrap();
            frames_tx.send(pong.to_text().unwrap().to_string()).await.unwrap();

            ws.send(Message::Text(
                r#"42["whatsapp-status",{"whatsapp_connected":false,"qrcode":"data:image/png;base64,QUFB"}]"#.into(),
            ))
            .await
            .unwrap();
            ws.send(Message::Text(
                r#"42["otp-log",{"phone":"628555","status":"success"}]"#.into(),
            ))
            .await
            .unwrap();
            while ws.next().await.is_some() {}
        });

        let (events_tx, mut events_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let channel = PushChannel::new(&format!("http://{}", addr), events_tx).unwrap();
        let handle = tokio::spawn(channel.run(shutdown_rx));

        assert_eq!(events_rx.recv().await, Some(PushEvent::Connected));
        assert_eq!(
            events_rx.recv().await,
            Some(PushEvent::WhatsappStatus(
                StatusUpdate::connected(false).with_qrcode("data:image/png;base64,QUFB")
            ))
        );
        assert!(matches!(events_rx.recv().await, Some(PushEvent::OtpLog(_))));

        assert_eq!(frames_rx.recv().await.as_deref(), Some("40"));
        assert_eq!(frames_rx.recv().await.as_deref(), Some("3"));

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn gives_up_after_reconnect_budget() {
        // Bind then drop to get a port nothing listens on.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let (events_tx, mut events_rx) = mpsc::channel(8);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let channel = PushChannel::new(&format!("http://{}", addr), events_tx)
            .unwrap()
            .with_reconnect(Duration::from_millis(10), 2);

        channel.run(shutdown_rx).await;

        assert!(matches!(events_rx.recv().await, Some(PushEvent::Disconnected(_))));
        assert!(matches!(events_rx.recv().await, Some(PushEvent::Disconnected(_))));
        assert!(matches!(events_rx.recv().await, Some(PushEvent::GaveUp(_))));
        assert_eq!(events_rx.recv().await, None);
    }
}
