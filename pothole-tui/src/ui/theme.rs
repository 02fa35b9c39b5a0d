//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use pothole_types::Severity;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for fetch errors.
    pub error: Color,
    /// Color for the loading indicator.
    pub loading: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Color for map markers of the most recent events.
    pub marker: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            error: Color::Red,
            loading: Color::Yellow,
            border: Color::Gray,
            marker: Color::White,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            error: Color::Red,
            loading: Color::Magenta,
            border: Color::DarkGray,
            marker: Color::Black,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Color of a severity tier, taken from its chart color hint.
    pub fn severity_color(&self, severity: Severity) -> Color {
        hint_color(severity.color_hint()).unwrap_or(match severity {
            Severity::Severe => Color::Red,
            Severity::High => Color::LightRed,
            Severity::Medium => Color::Yellow,
        })
    }

    /// Get style for a severity tier
    pub fn severity_style(&self, severity: Severity) -> Style {
        let style = Style::default().fg(self.severity_color(severity));
        match severity {
            Severity::Severe => style.add_modifier(Modifier::BOLD),
            Severity::High | Severity::Medium => style,
        }
    }
}

/// Parse a `#rrggbb` color hint.
pub fn hint_color(hint: &str) -> Option<Color> {
    let hex = hint.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    Some(Color::from_u32(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_colors_follow_hints() {
        let theme = Theme::dark();
        assert_eq!(
            theme.severity_color(Severity::Severe),
            Color::Rgb(0xef, 0x44, 0x44)
        );
        assert_eq!(
            theme.severity_color(Severity::High),
            Color::Rgb(0xf9, 0x73, 0x16)
        );
        assert_eq!(
            theme.severity_color(Severity::Medium),
            Color::Rgb(0xea, 0xb3, 0x08)
        );
    }

    #[test]
    fn malformed_hints_are_ignored() {
        assert_eq!(hint_color("ef4444"), None);
        assert_eq!(hint_color("#ef44"), None);
        assert_eq!(hint_color("#zzzzzz"), None);
    }
}
