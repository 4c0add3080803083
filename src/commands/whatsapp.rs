//! WhatsApp session commands: `status`, `qr`, `disconnect`, `refresh-qr`, `account`.

use super::{CommandResult, report};
use crate::cli_messages::print_field;
use crate::consts::cli_consts::{LOGIN_HISTORY_LIMIT, requests};
use crate::gateway::Gateway;
use crate::gateway::types::LoginHistoryEntry;
use crate::network::ErrorHandler;
use crate::qr_image;
use crate::sync::runtime::bounded;
use crate::sync::state::Effect;
use crate::sync::{Operation, SyncSnapshot, SyncState};
use crate::{print_cmd_error, print_cmd_info, print_cmd_success, print_cmd_warn};
use std::error::Error;
use std::path::PathBuf;
use tokio::time::Instant;

/// One poll plus the QR fetch it calls for, reconciled like the dashboard does.
pub async fn sync_once(gateway: &dyn Gateway) -> Result<SyncSnapshot, Box<dyn Error>> {
    let mut state = SyncState::new();
    let ticket = state.begin_poll();
    let update = bounded(requests::timeout(), gateway.status())
        .await
        .map_err(|e| report("Failed to fetch WhatsApp status.", e))?;

    let outcome = state.apply_poll(ticket, update);
    if outcome.effects.contains(&Effect::FetchQr) {
        match bounded(requests::timeout(), gateway.qr_code()).await {
            Ok(image) => {
                state.apply_qr(image);
            }
            Err(e) => state.record_failure(
                Operation::Qr,
                ErrorHandler::new().short_message(&e),
                Instant::now(),
            ),
        }
    }
    Ok(state.snapshot())
}

pub fn print_status(snapshot: &SyncSnapshot) {
    let status = &snapshot.status;
    if status.connected {
        print_cmd_success!(
            "WhatsApp connected.",
            "{}",
            status.phone_number.as_deref().unwrap_or("unknown number")
        );
    } else if status.qr_available {
        print_cmd_warn!("WhatsApp not connected.", "Waiting for a QR code scan");
    } else {
        print_cmd_warn!("WhatsApp not connected.", "No pairing attempt in progress");
    }

    print_field("Phone number", status.phone_number.as_deref());
    print_field("Last seen", status.last_seen.as_deref());
    match &snapshot.qr {
        Some(qr) => print_field(
            "QR code",
            Some(
                format!(
                    "ready, expires in {}s (save it with `otp-gateway qr`)",
                    qr.expires_in_seconds
                )
                .as_str(),
            ),
        ),
        None if status.qr_available && !status.connected => {
            print_field("QR code", Some("not received yet"))
        }
        None => {}
    }
    for (operation, message) in &snapshot.errors {
        print_cmd_warn!(&format!("{} failed.", operation), "{}", message);
    }
}

pub async fn status(gateway: &dyn Gateway) -> CommandResult {
    let snapshot = sync_once(gateway).await?;
    print_status(&snapshot);
    Ok(())
}

/// Saves the current pairing QR code as a PNG.
pub async fn save_qr(gateway: &dyn Gateway, output: Option<PathBuf>) -> CommandResult {
    let snapshot = sync_once(gateway).await?;
    if snapshot.status.connected {
        print_cmd_info!("WhatsApp is already connected.", "There is no QR code to save.");
        return Ok(());
    }
    let Some(qr) = snapshot.qr else {
        let detail = snapshot
            .error(Operation::Qr)
            .map(str::to_string)
            .unwrap_or_else(|| "Run `otp-gateway refresh-qr` to start a pairing attempt.".to_string());
        print_cmd_error!("No QR code available.", &detail);
        return Err(Box::from("No QR code available"));
    };

    let path = output.unwrap_or_else(qr_image::default_file_name);
    let written = qr_image::save(&qr.image_data_uri, &path).map_err(|e| {
        print_cmd_error!("Failed to save QR code.", &e.to_string());
        e
    })?;
    print_cmd_success!(
        "QR code saved.",
        "{} ({} bytes, expires in {}s)",
        path.display(),
        written,
        qr.expires_in_seconds
    );
    Ok(())
}

/// Logs the WhatsApp session out, then shows the status the backend reports.
pub async fn disconnect(gateway: &dyn Gateway) -> CommandResult {
    bounded(requests::timeout(), gateway.disconnect())
        .await
        .map_err(|e| report("Failed to disconnect WhatsApp.", e))?;
    print_cmd_success!("Disconnect requested.", "Resynchronizing...");
    status(gateway).await
}

/// Starts a new pairing attempt, then shows the status the backend reports.
pub async fn refresh_qr(gateway: &dyn Gateway) -> CommandResult {
    bounded(requests::timeout(), gateway.refresh_qr())
        .await
        .map_err(|e| report("Failed to refresh the QR code.", e))?;
    print_cmd_success!("New pairing attempt requested.", "Resynchronizing...");
    status(gateway).await
}

fn format_login(entry: &LoginHistoryEntry) -> String {
    format!(
        "{:<20} {:<8} {}",
        entry.timestamp.as_deref().unwrap_or("-"),
        if entry.success { "success" } else { "failed" },
        entry.ip_address.as_deref().unwrap_or("-")
    )
}

/// Account overview: status, device details when connected, recent logins.
pub async fn account(gateway: &dyn Gateway) -> CommandResult {
    let status = bounded(requests::timeout(), gateway.account_status())
        .await
        .map_err(|e| report("Failed to fetch account status.", e))?;
    let connected = status.connected.unwrap_or(false);

    print_cmd_info!("WhatsApp account", "{}", gateway.environment().api_url());
    print_field(
        "Status",
        Some(if connected { "Connected" } else { "Disconnected" }),
    );
    print_field("Phone number", status.phone_number.as_deref());
    print_field("Last seen", status.last_seen.as_deref());

    if connected {
        match bounded(requests::timeout(), gateway.device_info()).await {
            Ok(device) => {
                print_field("Platform", device.platform.as_deref());
                print_field("Browser", device.browser.as_deref());
                print_field("WhatsApp version", device.wa_version.as_deref());
                print_field("Device ID", device.device_id.as_deref());
            }
            Err(e) => print_cmd_warn!(
                "Device info unavailable.",
                "{}",
                ErrorHandler::new().short_message(&e)
            ),
        }
    }

    match bounded(requests::timeout(), gateway.login_history()).await {
        Ok(history) => {
            println!("\nRecent logins:");
            if history.is_empty() {
                println!("  (none)");
            }
            for entry in history.iter().take(LOGIN_HISTORY_LIMIT) {
                println!("  {}", format_login(entry));
            }
        }
        Err(e) => print_cmd_warn!(
            "Login history unavailable.",
            "{}",
            ErrorHandler::new().short_message(&e)
        ),
    }
    Ok(())
}
