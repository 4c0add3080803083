//! Dashboard utility functions

use crate::events::Source;
use ratatui::prelude::Color;
use std::time::Duration;

/// Color used for an activity line, by the part of the console that produced it.
pub fn get_source_color(source: &Source) -> Color {
    match source {
        Source::Poller => Color::Cyan,
        Source::QrCode => Color::LightMagenta,
        Source::Push => Color::Yellow,
        Source::Action => Color::Green,
        Source::Feed => Color::LightBlue,
    }
}

/// "YYYY-MM-DD HH:MM:SS" to "MM-DD HH:MM:SS"; anything else is returned unchanged.
pub fn format_compact_timestamp(timestamp: &str) -> String {
    match timestamp.split_once(' ') {
        Some((date, time)) if date.len() == 10 => match date.get(5..) {
            Some(month_day) => format!("{} {}", month_day, time),
            None => timestamp.to_string(),
        },
        _ => timestamp.to_string(),
    }
}

pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    if secs >= 86400 {
        format!(
            "{}d {}h {}m",
            secs / 86400,
            (secs % 86400) / 3600,
            (secs % 3600) / 60
        )
    } else if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Cuts `text` to `max` characters, marking the cut with "...".
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
