//! `health`: backend liveness.

use super::{CommandResult, report};
use crate::cli_messages::print_field;
use crate::consts::cli_consts::requests;
use crate::gateway::Gateway;
use crate::sync::runtime::bounded;
use crate::{print_cmd_success, print_cmd_warn};

pub async fn health(gateway: &dyn Gateway) -> CommandResult {
    let health = bounded(requests::timeout(), gateway.health())
        .await
        .map_err(|e| report("Gateway health check failed.", e))?;

    let api_url = gateway.environment().api_url();
    if health.whatsapp_connected() {
        print_cmd_success!("Gateway is up.", "{}", api_url);
    } else {
        print_cmd_warn!("Gateway is up, WhatsApp is not connected.", "{}", api_url);
    }
    print_field("Service status", health.status.as_deref());
    print_field(
        "WhatsApp",
        Some(if health.whatsapp_connected() {
            "connected"
        } else {
            "disconnected"
        }),
    );
    print_field("Phone number", health.phone_number.as_deref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::gateway::MockGateway;
    use crate::gateway::error::GatewayError;
    use crate::gateway::types::{Health, HealthWhatsapp};

    #[tokio::test]
    async fn reports_healthy_gateway() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_environment()
            .return_const(Environment::Local);
        gateway.expect_health().returning(|| {
            Ok(Health {
                whatsapp: Some(HealthWhatsapp { connected: true }),
                phone_number: Some("628123456789".to_string()),
                status: Some("ok".to_string()),
            })
        });
        assert!(health(&gateway).await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_gateway_fails() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_health()
            .returning(|| Err(GatewayError::Timeout));
        assert!(health(&gateway).await.is_err());
    }
}
