//! Dashboard recent OTP component
//!
//! Renders the most recent delivery attempts

use super::super::state::DashboardState;
use super::super::utils::{format_compact_timestamp, truncate};
use crate::sync::Operation;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};

const MESSAGE_WIDTH: usize = 32;

pub fn render_otp_logs_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    let lines: Vec<Line> = state
        .snapshot
        .recent_logs
        .iter()
        .map(|entry| {
            let (icon, color) = if entry.is_success() {
                ("✅", Color::LightGreen)
            } else {
                ("❌", Color::LightRed)
            };
            Line::from(vec![
                Span::raw(format!("{} ", icon)),
                Span::styled(
                    format!("{} ", format_compact_timestamp(&entry.display_time())),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{:<15} ", entry.phone), Style::default().fg(color)),
                Span::styled(
                    truncate(entry.message.as_deref().unwrap_or(""), MESSAGE_WIDTH),
                    Style::default().fg(Color::White),
                ),
            ])
        })
        .collect();

    let paragraph = if !lines.is_empty() {
        Paragraph::new(lines)
    } else if state.snapshot.error(Operation::Logs).is_some() {
        Paragraph::new("Recent OTP logs unavailable")
    } else {
        Paragraph::new("No OTP sent yet")
    };

    let block = Block::default()
        .title("RECENT OTP")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));

    f.render_widget(paragraph.block(block), area);
}
