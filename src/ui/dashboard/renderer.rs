//! Dashboard main renderer

use super::components::{footer, header, info_panel, logs, otp_logs, stats};
use super::state::DashboardState;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Color, Style};
use ratatui::widgets::Block;

pub fn render_dashboard(f: &mut Frame, state: &DashboardState) {
    if state.with_background_color {
        f.render_widget(
            Block::default().style(Style::default().bg(Color::Rgb(16, 20, 24))),
            f.area(),
        );
    }

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Length(10),
            Constraint::Length(2),
        ])
        .margin(1)
        .split(f.area());

    header::render_header(f, main_chunks[0], state);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(main_chunks[1]);

    info_panel::render_info_panel(f, content_chunks[0], state);
    logs::render_logs_panel(f, content_chunks[1], state);

    let feed_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(main_chunks[2]);

    stats::render_stats_panel(f, feed_chunks[0], state);
    otp_logs::render_otp_logs_panel(f, feed_chunks[1], state);
    footer::render_footer(f, main_chunks[3], &state.errors());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::gateway::types::{LogEntry, Statistics};
    use crate::sync::{ConnectionStatus, LoadState, Operation, SyncSnapshot};
    use crate::ui::app::UIConfig;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::time::Instant;

    fn screen_text(snapshot: SyncSnapshot) -> String {
        let state = DashboardState::new(
            Environment::Local,
            Instant::now(),
            snapshot,
            UIConfig::new(true, "Admin".to_string()),
        );
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| render_dashboard(f, &state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_connected_dashboard() {
        let text = screen_text(SyncSnapshot {
            status: ConnectionStatus {
                connected: true,
                phone_number: Some("6281234".to_string()),
                load_state: LoadState::Ok,
                ..Default::default()
            },
            statistics: Some(Statistics {
                sent_today: 12,
                failed_today: 1,
                success_rate: 92.3,
            }),
            recent_logs: vec![LogEntry {
                id: None,
                phone: "628555".to_string(),
                time: None,
                status: "success".to_string(),
                message: Some("Kode OTP 1234".to_string()),
            }],
            ..Default::default()
        });

        assert!(text.contains("CONNECTED - 6281234"));
        assert!(text.contains("RECENT OTP"));
        assert!(text.contains("628555"));
        assert!(text.contains("92.3%"));
        assert!(text.contains("[Q] Quit"));
        assert!(text.contains("[P] Retry"));
    }

    #[test]
    fn errors_replace_key_help() {
        let text = screen_text(SyncSnapshot {
            errors: vec![(Operation::Status, "request timed out".to_string())],
            ..Default::default()
        });

        assert!(text.contains("status: request timed out"));
        assert!(!text.contains("[Q] Quit"));
    }
}
