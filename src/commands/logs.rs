//! `logs`: filtered, paginated OTP delivery history.

use super::{CommandResult, report};
use crate::consts::cli_consts::requests;
use crate::gateway::Gateway;
use crate::gateway::types::{LogEntry, LogQuery, Pagination};
use crate::print_cmd_info;
use crate::sync::runtime::bounded;

const MESSAGE_WIDTH: usize = 40;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Plain-text table, one row per entry. Messages are cut to fit unless `full`.
pub fn render_table(entries: &[LogEntry], full: bool) -> String {
    let mut out = format!(
        "{:<19}  {:<16}  {:<8}  {}\n",
        "TIME", "PHONE", "STATUS", "MESSAGE"
    );
    for entry in entries {
        let message = entry.message.as_deref().unwrap_or("-");
        let message = if full {
            message.to_string()
        } else {
            truncate(message, MESSAGE_WIDTH)
        };
        out.push_str(&format!(
            "{:<19}  {:<16}  {:<8}  {}\n",
            entry.display_time(),
            entry.phone,
            entry.status,
            message
        ));
    }
    out
}

/// "Showing X to Y of Z results" plus page navigation hints.
pub fn pagination_summary(pagination: &Pagination) -> String {
    let mut lines = Vec::new();
    match pagination.item_range() {
        Some((first, last)) => lines.push(format!(
            "Showing {} to {} of {} results",
            first, last, pagination.total_items
        )),
        None => lines.push("No results".to_string()),
    }
    if pagination.total_pages > 1 {
        let mut nav = format!(
            "Page {} of {}",
            pagination.current_page, pagination.total_pages
        );
        if pagination.has_previous() {
            nav.push_str(&format!(
                "  previous: --page {}",
                pagination.current_page - 1
            ));
        }
        if pagination.has_next() {
            nav.push_str(&format!("  next: --page {}", pagination.current_page + 1));
        }
        lines.push(nav);
    }
    lines.join("\n")
}

pub async fn logs(gateway: &dyn Gateway, query: LogQuery, full: bool) -> CommandResult {
    let page = bounded(requests::timeout(), gateway.logs(&query))
        .await
        .map_err(|e| report("Failed to fetch OTP logs.", e))?;

    if page.data.is_empty() {
        print_cmd_info!("No logs found.", "Adjust the filters and try again.");
        return Ok(());
    }
    print!("{}", render_table(&page.data, full));
    if let Some(pagination) = &page.pagination {
        println!("{}", pagination_summary(pagination));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use crate::gateway::types::LogPage;

    fn entry(phone: &str, status: &str, message: Option<&str>) -> LogEntry {
        LogEntry {
            id: None,
            phone: phone.to_string(),
            time: None,
            status: status.to_string(),
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn table_has_header_and_rows() {
        let table = render_table(
            &[
                entry("628123456789", "success", Some("OTP 123456")),
                entry("628987654321", "failed", None),
            ],
            false,
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("TIME"));
        assert!(lines[1].contains("628123456789"));
        assert!(lines[1].ends_with("OTP 123456"));
        assert!(lines[2].ends_with("-"));
    }

    #[test]
    fn long_messages_are_truncated() {
        let long = "x".repeat(60);
        let table = render_table(&[entry("62811", "failed", Some(&long))], false);
        let row = table.lines().nth(1).unwrap();
        assert!(row.ends_with("..."));
        assert!(!row.contains(&long));
    }

    #[test]
    fn full_mode_keeps_whole_message() {
        let long = format!("Kode OTP anda 482913. {}", "Jangan bagikan kode ini. ".repeat(3));
        let table = render_table(&[entry("62811", "success", Some(&long))], true);
        let row = table.lines().nth(1).unwrap();
        assert!(row.ends_with(long.as_str()));
        assert!(!row.ends_with("..."));
    }

    #[test]
    fn summary_for_middle_page() {
        let pagination = Pagination {
            current_page: 2,
            per_page: 10,
            total_items: 35,
            total_pages: 4,
        };
        assert_eq!(
            pagination_summary(&pagination),
            "Showing 11 to 20 of 35 results\nPage 2 of 4  previous: --page 1  next: --page 3"
        );
    }

    #[test]
    fn summary_for_last_partial_page() {
        let pagination = Pagination {
            current_page: 4,
            per_page: 10,
            total_items: 35,
            total_pages: 4,
        };
        assert_eq!(
            pagination_summary(&pagination),
            "Showing 31 to 35 of 35 results\nPage 4 of 4  previous: --page 3"
        );
    }

    #[test]
    fn summary_for_single_page() {
        let pagination = Pagination {
            current_page: 1,
            per_page: 10,
            total_items: 0,
            total_pages: 1,
        };
        assert_eq!(pagination_summary(&pagination), "No results");
    }

    #[tokio::test]
    async fn passes_filters_through() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_logs()
            .withf(|query| {
                query.status.as_deref() == Some("failed") && query.page == 3 && query.limit == 25
            })
            .times(1)
            .returning(|_| Ok(LogPage::default()));

        let query = LogQuery {
            status: Some("failed".to_string()),
            page: 3,
            limit: 25,
            ..LogQuery::default()
        };
        assert!(logs(&gateway, query, false).await.is_ok());
    }
}
