//! `stats`: today's delivery counters.

use super::{CommandResult, report};
use crate::cli_messages::print_field;
use crate::consts::cli_consts::requests;
use crate::gateway::Gateway;
use crate::gateway::types::Statistics;
use crate::print_cmd_info;
use crate::sync::runtime::bounded;

pub fn format_rate(statistics: &Statistics) -> String {
    format!("{:.1}%", statistics.success_rate)
}

pub async fn stats(gateway: &dyn Gateway) -> CommandResult {
    let statistics = bounded(requests::timeout(), gateway.statistics())
        .await
        .map_err(|e| report("Failed to fetch statistics.", e))?;

    print_cmd_info!("OTP statistics", "today");
    print_field("Sent", Some(statistics.sent_today.to_string().as_str()));
    print_field("Failed", Some(statistics.failed_today.to_string().as_str()));
    print_field("Success rate", Some(format_rate(&statistics).as_str()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;

    #[test]
    fn rate_has_one_decimal() {
        let statistics = Statistics {
            sent_today: 40,
            failed_today: 3,
            success_rate: 92.5,
        };
        assert_eq!(format_rate(&statistics), "92.5%");
        assert_eq!(format_rate(&Statistics::default()), "0.0%");
    }

    #[tokio::test]
    async fn prints_counters() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_statistics()
            .times(1)
            .returning(|| Ok(Statistics::default()));
        assert!(stats(&gateway).await.is_ok());
    }
}
