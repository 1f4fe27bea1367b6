//! Small rendering helpers shared by the TUI screens.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;

/// A rect centered inside `r`, sized as percentages of it. Used for the
/// editor modal and dialogs.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Convert a `#RRGGBB` card color into a terminal color. Unparseable
/// values fall back to the default foreground.
pub fn hex_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return Color::Reset;
    }
    match (
        u8::from_str_radix(&hex[0..2], 16),
        u8::from_str_radix(&hex[2..4], 16),
        u8::from_str_radix(&hex[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => Color::Rgb(r, g, b),
        _ => Color::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_palette_colors() {
        assert_eq!(hex_color("#10B981"), Color::Rgb(0x10, 0xB9, 0x81));
        assert_eq!(hex_color("3B82F6"), Color::Rgb(0x3B, 0x82, 0xF6));
    }

    #[test]
    fn bad_input_falls_back() {
        assert_eq!(hex_color(""), Color::Reset);
        assert_eq!(hex_color("#zzzzzz"), Color::Reset);
        assert_eq!(hex_color("#fff"), Color::Reset);
    }
}
