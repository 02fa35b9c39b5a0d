//! Detail overlay rendering.
//!
//! Displays a modal overlay with everything known about the selected event.

use chrono::{Local, SecondsFormat};
use pothole_types::Event;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::common::centered;

/// Minimum width required for the detail overlay to render properly.
const MIN_OVERLAY_WIDTH: u16 = 44;
/// Minimum height required for the detail overlay to render properly.
const MIN_OVERLAY_HEIGHT: u16 = 12;

/// Label and value rows for an event.
pub fn detail_rows(event: &Event) -> Vec<(&'static str, String)> {
    vec![
        ("Event ID", event.id_label()),
        ("Magnitude", format!("{:.2} G", event.magnitude)),
        ("Severity", event.severity.label().to_string()),
        ("Location", format!("{:.6}, {:.6}", event.lat, event.lon)),
        (
            "Local time",
            event
                .occurred_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S %Z")
                .to_string(),
        ),
        (
            "UTC",
            event
                .occurred_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ),
    ]
}

/// Render the event detail as a modal overlay.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Skip rendering if terminal is too small for the overlay
    if area.width < MIN_OVERLAY_WIDTH || area.height < MIN_OVERLAY_HEIGHT {
        return;
    }

    let overlay_area = centered(area, 56, 12);
    frame.render_widget(Clear, overlay_area);

    let mut lines = Vec::new();
    match app.detail() {
        Some(event) => {
            lines.push(Line::from(""));
            for (label, value) in detail_rows(event) {
                let value_style = if label == "Severity" {
                    app.theme.severity_style(event.severity)
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<12}", label), app.theme.header),
                    Span::styled(value, value_style),
                ]));
            }
        }
        None => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "  This event is no longer in the feed.",
                Style::default().add_modifier(Modifier::DIM),
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  ↑↓:previous/next  Esc:close",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Impact Event ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn rows_cover_every_field() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap();
        let event = Event::new(42, 3.6, 30.7634, 76.6016, at);

        let rows = detail_rows(&event);
        let labels: Vec<&str> = rows.iter().map(|(l, _)| *l).collect();
        assert_eq!(
            labels,
            ["Event ID", "Magnitude", "Severity", "Location", "Local time", "UTC"]
        );
        assert_eq!(rows[0].1, "#42");
        assert_eq!(rows[1].1, "3.60 G");
        assert_eq!(rows[2].1, "Severe");
        assert_eq!(rows[3].1, "30.763400, 76.601600");
        assert_eq!(rows[5].1, "2025-03-01T10:30:00.000Z");
    }
}
