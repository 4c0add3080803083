//! Signing in, signing up and signing out of the gateway admin panel.

use crate::config::Config;
use crate::gateway::Gateway;
use crate::gateway::types::UserProfile;
use crate::network::ErrorHandler;
use crate::validation::{self, FormError};
use crate::{print_cmd_error, print_cmd_info, print_cmd_success, print_cmd_warn};
use std::error::Error;
use std::fmt::{Debug, Formatter};
use std::path::Path;

/// Environment variable holding the secret used to sign the session file.
pub const SESSION_SECRET_VAR: &str = "OTP_GATEWAY_SESSION_SECRET";

/// Logged-in admin: bearer token plus the profile it was issued for.
///
/// Passed explicitly to the gateway client and the dashboard session.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub token: String,
    pub user: UserProfile,
}

impl SessionContext {
    pub fn new(token: String, user: UserProfile) -> Self {
        Self { token, user }
    }
}

impl Debug for SessionContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

fn session_secret() -> Option<String> {
    std::env::var(SESSION_SECRET_VAR)
        .ok()
        .filter(|s| !s.is_empty())
}

/// Reads the persisted session for `api_url`, if one exists and is trustworthy.
///
/// A session issued by a different backend, or one whose signature does not
/// match the configured secret, is ignored.
pub fn load_session(config_path: &Path, api_url: &str) -> Option<SessionContext> {
    let config = Config::load_from_file(config_path).ok()?;
    if config.api_url.trim_end_matches('/') != api_url.trim_end_matches('/') {
        log::debug!(
            "ignoring session issued by {} (current backend {})",
            config.api_url,
            api_url
        );
        return None;
    }
    if let Some(secret) = session_secret() {
        if !config.verify(&secret) {
            print_cmd_warn!(
                "Session signature mismatch.",
                "Please log in again with `otp-gateway login`."
            );
            return None;
        }
    }
    Some(config.session())
}

/// Logs in and persists the session.
///
/// Rejected credentials are reported, not raised: the backend answer is `None`.
pub async fn login(
    email: &str,
    password: &str,
    config_path: &Path,
    gateway: &dyn Gateway,
) -> Result<(), Box<dyn Error>> {
    if email.trim().is_empty() || password.is_empty() {
        print_cmd_error!("Email and password are required.");
        return Err(Box::new(FormError::MissingFields));
    }

    let Some(session) = gateway.login(email.trim(), password).await else {
        print_cmd_error!("Invalid email or password.");
        return Err(Box::from("Invalid credentials"));
    };

    let mut config = Config::new(gateway.environment().api_url(), session);
    if let Some(secret) = session_secret() {
        config = config.sign(&secret)?;
    }
    config
        .save(config_path)
        .map_err(|e| format!("Failed to save session: {}", e))?;

    print_cmd_success!(
        "Logged in.",
        "Welcome, {} <{}>",
        config.user.name,
        config.user.email
    );
    Ok(())
}

/// Creates a new admin account. The user still has to log in afterwards.
pub async fn register(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
    gateway: &dyn Gateway,
) -> Result<(), Box<dyn Error>> {
    if let Err(e) = validation::validate_registration(name, email, password, confirm_password) {
        print_cmd_error!("Registration rejected.", &e.to_string());
        return Err(Box::new(e));
    }

    match gateway.register(name.trim(), email.trim(), password).await {
        Ok(user) => {
            print_cmd_success!("Registration successful.", "Account ID: {}", user.id);
            print_cmd_info!(
                "Next step",
                "otp-gateway login --email {}",
                user.email
            );
            Ok(())
        }
        Err(e) => {
            let detail = e
                .server_message()
                .unwrap_or_else(|| ErrorHandler::new().short_message(&e));
            print_cmd_error!("Registration failed.", &detail);
            Err(Box::new(e))
        }
    }
}

/// Forgets the persisted session.
pub fn logout(config_path: &Path) -> Result<(), Box<dyn Error>> {
    println!("Logging out and clearing the saved session...");
    Config::clear_session(config_path)?;
    Ok(())
}
