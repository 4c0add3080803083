//! OTP Gateway REST Client
//!
//! A JSON client for the gateway backend: connection status, pairing QR codes,
//! OTP logs, settings and authentication.

use crate::auth::SessionContext;
use crate::consts::cli_consts::requests;
use crate::environment::Environment;
use crate::gateway::Gateway;
use crate::gateway::error::GatewayError;
use crate::gateway::types::{
    ApiKeyResponse, DeviceInfo, Health, LogPage, LogQuery, LoginHistoryEntry, LoginRequest,
    LoginResponse, QrResponse, RegisterRequest, RegisterResponse, Settings, Statistics,
    StatusUpdate, UserProfile,
};
use reqwest::{Client, ClientBuilder, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

// Build timestamp in milliseconds since epoch
const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP", "Build timestamp not available");

// User-Agent string with CLI version
const USER_AGENT: &str = concat!("otp-gateway-cli/", env!("CARGO_PKG_VERSION"));

/// Header carrying the admin API key.
const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    environment: Environment,
    session: Option<SessionContext>,
}

impl GatewayClient {
    pub fn new(environment: Environment) -> Result<Self, GatewayError> {
        let client = ClientBuilder::new()
            .connect_timeout(requests::timeout())
            .timeout(requests::timeout())
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            environment,
            session: None,
        })
    }

    /// Attaches a logged-in session; its token is sent as a bearer credential.
    pub fn with_session(mut self, session: Option<SessionContext>) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.api_url().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("X-Build-Timestamp", BUILD_TIMESTAMP);
        match &self.session {
            Some(session) => request.bearer_auth(&session.token),
            None => request,
        }
    }

    fn decode_response<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, GatewayError> {
        serde_json::from_slice(bytes).map_err(GatewayError::Decode)
    }

    async fn handle_response_status(response: Response) -> Result<Response, GatewayError> {
        if !response.status().is_success() {
            return Err(GatewayError::from_response(response).await);
        }
        Ok(response)
    }

    async fn send_for_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = self.decorate(request).send().await?;
        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_response(&response_bytes)
    }

    async fn send_no_response(&self, request: RequestBuilder) -> Result<(), GatewayError> {
        let response = self.decorate(request).send().await?;
        Self::handle_response_status(response).await?;
        Ok(())
    }

    async fn get_request<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, GatewayError> {
        let url = self.build_url(endpoint);
        self.send_for_json(self.client.get(&url)).await
    }

    async fn post_request<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let url = self.build_url(endpoint);
        self.send_for_json(self.client.post(&url).json(body)).await
    }

    async fn post_request_no_response(&self, endpoint: &str) -> Result<(), GatewayError> {
        let url = self.build_url(endpoint);
        self.send_no_response(
            self.client
                .post(&url)
                .header("Content-Type", "application/json"),
        )
        .await
    }
}

#[async_trait::async_trait]
impl Gateway for GatewayClient {
    fn environment(&self) -> &Environment {
        &self.environment
    }

    async fn health(&self) -> Result<Health, GatewayError> {
        self.get_request("health").await
    }

    async fn status(&self) -> Result<StatusUpdate, GatewayError> {
        self.get_request("api/status").await
    }

    async fn qr_code(&self) -> Result<Option<String>, GatewayError> {
        let response: QrResponse = self.get_request("api/whatsapp/qrcode").await?;
        Ok(response.qrcode.filter(|code| !code.is_empty()))
    }

    async fn disconnect(&self) -> Result<(), GatewayError> {
        self.post_request_no_response("api/whatsapp/disconnect")
            .await
    }

    async fn refresh_qr(&self) -> Result<(), GatewayError> {
        self.post_request_no_response("api/whatsapp/refresh-qrcode")
            .await
    }

    async fn logs(&self, query: &LogQuery) -> Result<LogPage, GatewayError> {
        let url = self.build_url("api/logs");
        let request = self.client.get(&url).query(&query.to_query_pairs());
        self.send_for_json(request).await
    }

    async fn statistics(&self) -> Result<Statistics, GatewayError> {
        self.get_request("api/statistik").await
    }

    async fn settings(&self) -> Result<Settings, GatewayError> {
        self.get_request("api/settings").await
    }

    async fn update_settings(&self, settings: &Settings) -> Result<(), GatewayError> {
        let url = self.build_url("api/settings");
        self.send_no_response(self.client.post(&url).json(settings))
            .await
    }

    async fn generate_api_key(&self) -> Result<String, GatewayError> {
        let url = self.build_url("api/settings/generate-apikey");
        let response: ApiKeyResponse = self.send_for_json(self.client.post(&url)).await?;
        response
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or(GatewayError::MissingField("api_key"))
    }

    async fn restart(&self, api_key: &str) -> Result<(), GatewayError> {
        let url = self.build_url("api/restart");
        self.send_no_response(self.client.post(&url).header(API_KEY_HEADER, api_key))
            .await
    }

    async fn login(&self, email: &str, password: &str) -> Option<SessionContext> {
        let request = LoginRequest { email, password };
        let response: LoginResponse = match self.post_request("auth/login", &request).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("login failed: {}", e);
                return None;
            }
        };
        if let Some(reason) = response.error.as_ref().or(response.message.as_ref()) {
            log::debug!("login response message: {}", reason);
        }
        match (response.token, response.user) {
            (Some(token), Some(user)) if !token.is_empty() => Some(SessionContext::new(token, user)),
            _ => {
                log::warn!("login response carried no token or user");
                None
            }
        }
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, GatewayError> {
        let request = RegisterRequest {
            nama: name,
            email,
            password,
        };
        let response: RegisterResponse = self.post_request("auth/register", &request).await?;
        response.user.ok_or(GatewayError::MissingField("user"))
    }

    async fn account_status(&self) -> Result<StatusUpdate, GatewayError> {
        self.get_request("api/whatsapp/status").await
    }

    async fn device_info(&self) -> Result<DeviceInfo, GatewayError> {
        self.get_request("api/whatsapp/device-info").await
    }

    async fn login_history(&self) -> Result<Vec<LoginHistoryEntry>, GatewayError> {
        self.get_request("api/whatsapp/login-history").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_without_double_slashes() {
        let client = GatewayClient::new(Environment::Custom {
            api_url: "https://otp.example.com/".to_string(),
            socket_url: None,
        })
        .unwrap();
        assert_eq!(
            client.build_url("/api/status"),
            "https://otp.example.com/api/status"
        );
        assert_eq!(
            client.build_url("health"),
            "https://otp.example.com/health"
        );
    }

    #[tokio::test]
    /// Credential exchange failures surface as `None`, never as an error.
    async fn login_against_unreachable_backend_returns_none() {
        let client = GatewayClient::new(Environment::Custom {
            api_url: "http://127.0.0.1:9".to_string(),
            socket_url: None,
        })
        .unwrap();
        assert!(client.login("admin@example.com", "secret").await.is_none());
    }
}
