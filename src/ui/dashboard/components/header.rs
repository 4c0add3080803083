//! Dashboard header component
//!
//! Renders the title and the connection / QR countdown gauge

use super::super::state::DashboardState;
use crate::consts::cli_consts::sync::QR_WINDOW_SECS;
use crate::sync::{LoadState, SyncSnapshot};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph};

/// Label, color and fill of the header gauge.
pub fn gauge_content(snapshot: &SyncSnapshot, tick: usize) -> (String, Color, u16) {
    // Loops every 20 ticks for a moving bar while nothing is known yet
    let animated = ((tick % 20) as f64 / 20.0 * 100.0) as u16;
    let status = &snapshot.status;

    match status.load_state {
        LoadState::Loading => ("CHECKING STATUS".to_string(), Color::LightBlue, animated),
        LoadState::Error => ("STATUS UNAVAILABLE".to_string(), Color::LightRed, 100),
        LoadState::Ok if status.connected => (
            format!(
                "CONNECTED - {}",
                status.phone_number.as_deref().unwrap_or("unknown number")
            ),
            Color::LightGreen,
            100,
        ),
        LoadState::Ok => match &snapshot.qr {
            Some(qr) => {
                let percent =
                    (qr.expires_in_seconds.min(QR_WINDOW_SECS) * 100 / QR_WINDOW_SECS) as u16;
                (
                    format!("SCAN QR - refreshes in {}s", qr.expires_in_seconds),
                    Color::LightYellow,
                    percent,
                )
            }
            None => (
                "NOT CONNECTED - waiting for QR".to_string(),
                Color::LightBlue,
                animated,
            ),
        },
    }
}

pub fn render_header(f: &mut Frame, area: Rect, state: &DashboardState) {
    let header_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let title = Paragraph::new(format!(
        "OTP GATEWAY CONSOLE v{}",
        env!("CARGO_PKG_VERSION")
    ))
    .alignment(Alignment::Center)
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_type(BorderType::Thick),
    );
    f.render_widget(title, header_chunks[0]);

    let (label, color, percent) = gauge_content(&state.snapshot, state.tick);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .gauge_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .percent(percent.min(100))
        .label(label);

    f.render_widget(gauge, header_chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{ConnectionStatus, QrCode};

    #[test]
    fn countdown_drains_the_gauge() {
        let snapshot = SyncSnapshot {
            status: ConnectionStatus {
                load_state: LoadState::Ok,
                qr_available: true,
                ..Default::default()
            },
            qr: Some(QrCode {
                image_data_uri: "data:image/png;base64,QUFB".to_string(),
                expires_in_seconds: 5,
            }),
            ..Default::default()
        };
        let (label, _, percent) = gauge_content(&snapshot, 0);
        assert_eq!(label, "SCAN QR - refreshes in 5s");
        assert_eq!(percent, 25);
    }

    #[test]
    fn connected_shows_number() {
        let snapshot = SyncSnapshot {
            status: ConnectionStatus {
                connected: true,
                phone_number: Some("6281234".to_string()),
                load_state: LoadState::Ok,
                ..Default::default()
            },
            ..Default::default()
        };
        let (label, color, percent) = gauge_content(&snapshot, 7);
        assert_eq!(label, "CONNECTED - 6281234");
        assert_eq!(color, Color::LightGreen);
        assert_eq!(percent, 100);
    }
}
