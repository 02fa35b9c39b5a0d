//! Dashboard view rendering.
//!
//! KPI cards on top, severity and timeline charts in the middle, the most
//! recent events at the bottom.

use pothole_types::Kpis;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, RECENT_LIMIT};
use crate::ui::{charts, common::block, logs};

/// Render the Dashboard view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(4), // KPI cards
        Constraint::Min(8),    // Charts
        Constraint::Length(RECENT_LIMIT as u16 + 3),
    ])
    .split(area);

    render_kpis(frame, app, chunks[0]);

    let charts_row =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).split(chunks[1]);
    charts::render_severity(frame, app, charts_row[0], false);
    charts::render_timeline(frame, app, charts_row[1]);

    let title = format!(" Recent Events ({}) ", app.visible_events().len());
    logs::render_event_table(frame, app, chunks[2], app.visible_events(), title);
}

/// Card text for each KPI, in display order.
pub fn kpi_cards(kpis: &Kpis) -> [(&'static str, String); 3] {
    [
        ("Total Events", kpis.total.to_string()),
        ("Last 24 Hours", kpis.last_24h.to_string()),
        ("Avg Magnitude", format!("{:.2} G", kpis.avg_magnitude)),
    ]
}

fn render_kpis(frame: &mut Frame, app: &App, area: Rect) {
    let cards = kpi_cards(&app.snapshot.kpis);
    let columns = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);

    for ((label, value), column) in cards.into_iter().zip(columns.iter()) {
        let text = vec![
            Line::from(Span::styled(
                value,
                Style::default()
                    .fg(app.theme.highlight)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                label,
                Style::default().add_modifier(Modifier::DIM),
            )),
        ];
        let card = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(block(app, ""));
        frame.render_widget(card, *column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kpi_cards_format_values() {
        let kpis = Kpis {
            total: 12,
            last_24h: 4,
            avg_magnitude: 3.1,
        };
        let cards = kpi_cards(&kpis);
        assert_eq!(cards[0], ("Total Events", "12".to_string()));
        assert_eq!(cards[1].1, "4");
        assert_eq!(cards[2].1, "3.10 G");
    }

    #[test]
    fn empty_kpis_show_zero() {
        let cards = kpi_cards(&Kpis::default());
        assert_eq!(cards[2].1, "0.00 G");
    }
}
