//! Dashboard statistics component
//!
//! Renders today's delivery counters

use super::super::state::DashboardState;
use crate::commands::stats::format_rate;
use crate::sync::Operation;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Padding, Paragraph};

fn rate_color(percent: u16) -> Color {
    match percent {
        90.. => Color::LightGreen,
        70..=89 => Color::LightYellow,
        _ => Color::LightRed,
    }
}

pub fn render_stats_panel(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(3)])
        .split(area);

    let counters_block = Block::default()
        .title("TODAY")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));

    let Some(statistics) = &state.snapshot.statistics else {
        let text = if state.snapshot.error(Operation::Statistik).is_some() {
            "Statistics unavailable"
        } else {
            "Loading statistics..."
        };
        f.render_widget(
            Paragraph::new(text).block(counters_block),
            area,
        );
        return;
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Sent:   ", Style::default().fg(Color::Gray)),
            Span::styled(
                statistics.sent_today.to_string(),
                Style::default()
                    .fg(Color::LightGreen)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Failed: ", Style::default().fg(Color::Gray)),
            Span::styled(
                statistics.failed_today.to_string(),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).block(counters_block), chunks[0]);

    let percent = statistics.success_percent();
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title("Success rate")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(rate_color(percent))),
        )
        .gauge_style(
            Style::default()
                .fg(rate_color(percent))
                .add_modifier(Modifier::BOLD),
        )
        .percent(percent)
        .label(format_rate(statistics));
    f.render_widget(gauge, chunks[1]);
}
