use crate::auth::SessionContext;
use crate::environment::Environment;
use crate::gateway::error::GatewayError;
use crate::gateway::types::{
    DeviceInfo, Health, LogPage, LogQuery, LoginHistoryEntry, Settings, Statistics,
    StatusUpdate, UserProfile,
};

pub(crate) mod client;
pub use client::GatewayClient;
pub mod error;
pub mod types;

#[cfg(test)]
use mockall::{automock, predicate::*};

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    fn environment(&self) -> &Environment;

    /// Liveness of the backend and its WhatsApp session.
    async fn health(&self) -> Result<Health, GatewayError>;

    /// Current connection status snapshot.
    async fn status(&self) -> Result<StatusUpdate, GatewayError>;

    /// Current pairing QR code as a data URI, if the backend has one.
    async fn qr_code(&self) -> Result<Option<String>, GatewayError>;

    /// Logs the WhatsApp session out.
    async fn disconnect(&self) -> Result<(), GatewayError>;

    /// Asks the backend to start a new pairing attempt.
    async fn refresh_qr(&self) -> Result<(), GatewayError>;

    /// One page of OTP delivery logs.
    async fn logs(&self, query: &LogQuery) -> Result<LogPage, GatewayError>;

    /// Today's delivery counters.
    async fn statistics(&self) -> Result<Statistics, GatewayError>;

    async fn settings(&self) -> Result<Settings, GatewayError>;

    async fn update_settings(&self, settings: &Settings) -> Result<(), GatewayError>;

    /// Issues a new API key and returns it.
    async fn generate_api_key(&self) -> Result<String, GatewayError>;

    /// Restarts the gateway service. Requires the admin API key.
    async fn restart(&self, api_key: &str) -> Result<(), GatewayError>;

    /// Exchanges credentials for a session. Any failure yields `None`.
    async fn login(&self, email: &str, password: &str) -> Option<SessionContext>;

    /// Creates a new admin account.
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, GatewayError>;

    /// Account-level status, including when the session was last seen.
    async fn account_status(&self) -> Result<StatusUpdate, GatewayError>;

    async fn device_info(&self) -> Result<DeviceInfo, GatewayError>;

    async fn login_history(&self) -> Result<Vec<LoginHistoryEntry>, GatewayError>;
}
