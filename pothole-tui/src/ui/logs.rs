//! Logs view rendering.
//!
//! Displays every event in the snapshot, newest first, in a selectable table.

use chrono::Local;
use pothole_types::Event;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::common::block;

/// Render the Logs view showing all events.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Event Log ({}) ", app.snapshot.len());
    render_event_table(frame, app, area, &app.snapshot.events, title);
}

/// Render a selectable table of events.
///
/// Shared with the dashboard, which passes only the most recent events.
pub fn render_event_table(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    events: &[Event],
    title: String,
) {
    let header = Row::new(vec![
        Cell::from("ID"),
        Cell::from("Time"),
        Cell::from("Magnitude"),
        Cell::from("Severity"),
        Cell::from("Location"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = events
        .iter()
        .map(|e| {
            Row::new(vec![
                Cell::from(e.id_label()),
                Cell::from(
                    e.occurred_at
                        .with_timezone(&Local)
                        .format("%b %d %H:%M:%S")
                        .to_string(),
                ),
                Cell::from(format!("{:.2} G", e.magnitude)),
                Cell::from(e.severity.label()).style(app.theme.severity_style(e.severity)),
                Cell::from(format!("{:.5}, {:.5}", e.lat, e.lon))
                    .style(Style::default().add_modifier(Modifier::DIM)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(8),
        Constraint::Min(16),
        Constraint::Min(10),
        Constraint::Min(9),
        Constraint::Fill(1),
    ];

    // Show scroll position if there are items
    let title = if events.is_empty() {
        title
    } else {
        format!("{}[{}/{}] ", title, app.selected_index + 1, events.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(block(app, title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    if !events.is_empty() {
        state.select(Some(app.selected_index.min(events.len() - 1)));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
