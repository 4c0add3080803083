//! Dashboard footer component
//!
//! Renders key bindings, or the current operation errors when there are any

use crate::sync::Operation;

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

pub const KEY_HELP: &str = "[Q] Quit | [P] Retry | [R] Refresh QR | [D] Disconnect | [S] Save QR";

/// Error banner text, one `operation: message` pair per error.
pub fn error_banner(errors: &[(Operation, String)]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    Some(
        errors
            .iter()
            .map(|(operation, message)| format!("{}: {}", operation, message))
            .collect::<Vec<_>>()
            .join(" | "),
    )
}

pub fn render_footer(f: &mut Frame, area: Rect, errors: &[(Operation, String)]) {
    let (text, color) = match error_banner(errors) {
        Some(banner) => (banner, Color::LightRed),
        None => (KEY_HELP.to_string(), Color::Cyan),
    };

    let footer = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_type(BorderType::Thick),
        );
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_lists_each_failed_operation() {
        assert_eq!(error_banner(&[]), None);

        let errors = vec![
            (Operation::Status, "timeout".to_string()),
            (Operation::Disconnect, "HTTP 500".to_string()),
        ];
        assert_eq!(
            error_banner(&errors).unwrap(),
            "status: timeout | disconnect: HTTP 500"
        );
    }
}
