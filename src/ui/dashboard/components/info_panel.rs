//! Dashboard info panel component
//!
//! Renders the WhatsApp connection panel

use super::super::state::DashboardState;
use super::super::utils::format_uptime;
use crate::environment::Environment;
use crate::sync::LoadState;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap};

fn field(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

pub fn render_info_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    let status = &state.snapshot.status;

    let (status_text, status_color) = match status.load_state {
        LoadState::Loading => ("Checking...".to_string(), Color::LightBlue),
        LoadState::Error => ("Unavailable".to_string(), Color::LightRed),
        LoadState::Ok if status.connected => ("Connected".to_string(), Color::LightGreen),
        LoadState::Ok => ("Not connected".to_string(), Color::LightYellow),
    };

    let qr_text = match (&state.snapshot.qr, status.qr_available) {
        (Some(qr), _) => format!("ready, {}s left [S] save", qr.expires_in_seconds),
        (None, true) => "loading...".to_string(),
        (None, false) => "-".to_string(),
    };

    let env_color = match state.environment {
        Environment::Local => Color::Green,
        Environment::Custom { .. } => Color::Yellow,
    };

    let last_update = state
        .snapshot
        .last_update
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let info_lines = vec![
        field("WhatsApp", status_text, status_color),
        field(
            "Phone",
            status.phone_number.clone().unwrap_or_else(|| "-".to_string()),
            Color::LightCyan,
        ),
        field(
            "Last seen",
            status.last_seen.clone().unwrap_or_else(|| "-".to_string()),
            Color::White,
        ),
        field("QR", qr_text, Color::LightMagenta),
        field("Updated", last_update, Color::White),
        Line::from(""),
        field("Admin", state.user_name.clone(), Color::LightBlue),
        field("Backend", state.environment.api_url(), env_color),
        field(
            "Uptime",
            format_uptime(state.start_time.elapsed()),
            Color::LightGreen,
        ),
    ];

    let info_block = Block::default()
        .title("WHATSAPP")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::uniform(1));

    let info_paragraph = Paragraph::new(info_lines)
        .block(info_block)
        .wrap(Wrap { trim: true });
    f.render_widget(info_paragraph, area);
}
