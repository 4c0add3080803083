//! `settings` and `restart`: gateway configuration.

use super::{CommandResult, report};
use crate::cli_messages::print_field;
use crate::consts::cli_consts::requests;
use crate::gateway::Gateway;
use crate::sync::runtime::bounded;
use crate::validation::validate_webhook_url;
use crate::{print_cmd_error, print_cmd_info, print_cmd_success};

/// Environment variable with the admin API key sent to `/api/restart`.
pub const API_KEY_VAR: &str = "OTP_GATEWAY_API_KEY";

/// Hides all but the last four characters of a key.
pub fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = key.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

pub async fn show(gateway: &dyn Gateway, reveal: bool) -> CommandResult {
    let settings = bounded(requests::timeout(), gateway.settings())
        .await
        .map_err(|e| report("Failed to fetch settings.", e))?;

    print_cmd_info!("Gateway settings", "{}", gateway.environment().api_url());
    print_field("Webhook URL", settings.webhook_url.as_deref());
    let api_key = settings
        .api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .map(|key| if reveal { key.to_string() } else { mask_key(key) });
    print_field("API key", api_key.as_deref());
    print_field("API key header", Some("x-api-key"));
    Ok(())
}

/// Updates the webhook URL and keeps the current API key.
pub async fn set_webhook(gateway: &dyn Gateway, webhook_url: &str) -> CommandResult {
    if let Err(e) = validate_webhook_url(webhook_url) {
        print_cmd_error!("Invalid webhook URL.", &e.to_string());
        return Err(Box::new(e));
    }
    let mut settings = bounded(requests::timeout(), gateway.settings())
        .await
        .map_err(|e| report("Failed to fetch settings.", e))?;
    settings.webhook_url = Some(webhook_url.trim().to_string());

    bounded(requests::timeout(), gateway.update_settings(&settings))
        .await
        .map_err(|e| report("Failed to save settings.", e))?;
    print_cmd_success!(
        "Settings saved.",
        "Webhook URL: {}",
        settings.webhook_url.as_deref().filter(|u| !u.is_empty()).unwrap_or("(none)")
    );
    Ok(())
}

pub async fn generate_api_key(gateway: &dyn Gateway) -> CommandResult {
    let key = bounded(requests::timeout(), gateway.generate_api_key())
        .await
        .map_err(|e| report("Failed to generate an API key.", e))?;
    print_cmd_success!("API key generated.", "{}", key);
    print_cmd_info!(
        "Usage",
        "Send it in the x-api-key header, e.g. export {}={}",
        API_KEY_VAR,
        key
    );
    Ok(())
}

/// Restarts the gateway service.
pub async fn restart(gateway: &dyn Gateway, api_key: Option<&str>) -> CommandResult {
    let Some(api_key) = api_key.map(str::trim).filter(|key| !key.is_empty()) else {
        print_cmd_error!(
            "Missing API key.",
            &format!("Pass --api-key or set {}.", API_KEY_VAR)
        );
        return Err(Box::from("Missing API key"));
    };
    bounded(requests::timeout(), gateway.restart(api_key))
        .await
        .map_err(|e| report("Failed to restart the gateway.", e))?;
    print_cmd_success!("Restart requested.", "The gateway will reconnect WhatsApp shortly.");
    Ok(())
}
