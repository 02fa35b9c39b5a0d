//! Charts view rendering.
//!
//! Severity distribution and the daily timeline. The compact variants are
//! reused by the dashboard.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::common::block;

const BAR_GAP: u16 = 1;

/// Render the Charts view: severity on top, timeline below.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Percentage(45), Constraint::Percentage(55)]).split(area);
    render_severity(frame, app, chunks[0], true);
    render_timeline(frame, app, chunks[1]);
}

/// Severity bar chart. With `shares` the bars are labelled with their
/// percentage of all events.
pub fn render_severity(frame: &mut Frame, app: &App, area: Rect, shares: bool) {
    let snapshot = &app.snapshot;
    let bars: Vec<Bar> = snapshot
        .severity_buckets
        .iter()
        .map(|bucket| {
            let text = if shares {
                format!(
                    "{} ({:.0}%)",
                    bucket.count,
                    snapshot.severity_share(bucket.severity)
                )
            } else {
                bucket.count.to_string()
            };
            let style = app.theme.severity_style(bucket.severity);
            Bar::default()
                .value(bucket.count as u64)
                .label(Line::from(bucket.label.clone()))
                .text_value(text)
                .style(style)
                .value_style(style.add_modifier(Modifier::REVERSED))
        })
        .collect();

    let block = block(app, " Severity Distribution ");
    let inner_width = block.inner(area).width;
    let bar_width = fitted_bar_width(inner_width, bars.len() as u16).clamp(1, 20);

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(BAR_GAP);

    frame.render_widget(chart, area);
}

/// Daily event counts, oldest day on the left. When there are more days
/// than fit, the most recent ones are shown.
pub fn render_timeline(frame: &mut Frame, app: &App, area: Rect) {
    let timeline = &app.snapshot.timeline;
    let block = block(app, " Events per Day (UTC) ");
    let inner = block.inner(area);

    if timeline.is_empty() {
        let empty = Paragraph::new("No events yet")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // Each bar needs room for a label like "Mar 05"
    let min_bar = 6;
    let fit = (inner.width / (min_bar + BAR_GAP)).max(1) as usize;
    let shown = &timeline[timeline.len().saturating_sub(fit)..];

    let bars: Vec<Bar> = shown
        .iter()
        .map(|bucket| {
            Bar::default()
                .value(bucket.count as u64)
                .label(Line::from(bucket.label.clone()))
                .style(Style::default().fg(app.theme.highlight))
        })
        .collect();

    let bar_width = fitted_bar_width(inner.width, bars.len() as u16).clamp(min_bar, 12);
    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(BAR_GAP);

    frame.render_widget(chart, area);
}

/// Widest bar that lets `count` bars and their gaps fit in `width`.
pub fn fitted_bar_width(width: u16, count: u16) -> u16 {
    if count == 0 {
        return width;
    }
    width.saturating_sub(BAR_GAP * count.saturating_sub(1)) / count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_width_accounts_for_gaps() {
        assert_eq!(fitted_bar_width(32, 3), 10);
        assert_eq!(fitted_bar_width(10, 1), 10);
        assert_eq!(fitted_bar_width(2, 5), 0);
        assert_eq!(fitted_bar_width(10, 0), 10);
    }
}
