//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use pothole_types::Severity;

use crate::app::{App, View};
use crate::duration::format_age;

/// Render the header bar with the headline numbers.
///
/// Displays: feed, event totals, severe count, average magnitude.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = &app.snapshot;
    let title = Span::styled(" POTHOLE WATCH ", Style::default().add_modifier(Modifier::BOLD));

    if snapshot.generated_at.is_none() {
        let line = Line::from(vec![
            title,
            Span::raw(format!("│ {} │ ", app.source_description())),
            Span::styled(
                "Waiting for first poll...",
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let severe = snapshot.bucket(Severity::Severe).map_or(0, |b| b.count);
    let severe_span = if severe > 0 {
        Span::styled(
            format!("{}", severe),
            app.theme.severity_style(Severity::Severe),
        )
    } else {
        Span::styled("0", Style::default().add_modifier(Modifier::DIM))
    };

    let line = Line::from(vec![
        Span::styled(" ● ", Style::default().fg(app.theme.highlight)),
        title,
        Span::raw(format!("│ {} │ ", app.source_description())),
        Span::styled(
            format!("{}", snapshot.kpis.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" events │ "),
        Span::raw(format!("{} in 24h │ ", snapshot.kpis.last_24h)),
        severe_span,
        Span::raw(" severe │ "),
        Span::raw(format!("avg {:.2} G", snapshot.kpis.avg_magnitude)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .map(|view| Line::from(format!(" {}:{} ", view.index() + 1, view.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Text of the status bar when no temporary message is showing.
pub fn status_line(app: &App) -> String {
    let loading = if app.is_loading() { "Polling… | " } else { "" };

    let age = match app.update_age() {
        Some(age) => format!("Updated {} ago", format_age(age)),
        None => "No data yet".to_string(),
    };

    let error = app
        .last_error()
        .map(|e| format!(" | Last poll failed: {}", e))
        .unwrap_or_default();

    format!(
        " {}{} (every {}){} | {}",
        loading,
        age,
        format_age(app.poll_interval()),
        error,
        controls_hint(app.current_view)
    )
}

/// Key hints for a view. Export works everywhere.
pub fn controls_hint(view: View) -> &'static str {
    match view {
        View::Dashboard | View::Logs => {
            "↑↓:select Enter:detail Tab:switch r:refresh e:export ?:help q:quit"
        }
        View::Map | View::Charts => "Tab:switch r:refresh e:export ?:help q:quit",
    }
}

/// Render the status bar at the bottom.
///
/// Shows: loading state, time since last update, the last fetch error and
/// available controls. Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let style = if app.last_error().is_some() {
        Style::default().fg(app.theme.error)
    } else if app.is_loading() {
        Style::default().fg(app.theme.loading)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    };

    frame.render_widget(Paragraph::new(status_line(app)).style(style), area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  1-4         Jump to view"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Enter       Event detail"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Poll the feed now"),
        Line::from("  e         Export snapshot to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_area = centered(area, 42, 21);
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// A rectangle of at most `width` x `height` centered in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// A bordered block in the theme's style.
pub fn block<'a>(app: &App, title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let inner = centered(area, 42, 21);
        assert_eq!(inner, Rect::new(29, 9, 42, 21));

        let small = Rect::new(0, 0, 30, 10);
        let inner = centered(small, 42, 21);
        assert_eq!(inner.width, 26);
        assert_eq!(inner.height, 8);
    }

    #[test]
    fn every_view_hints_export() {
        for view in View::ALL {
            assert!(controls_hint(view).contains("e:export"), "{:?}", view);
        }
    }
}
