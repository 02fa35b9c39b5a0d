//! Map view rendering.
//!
//! Plots every event as a heat point colored by severity, with the most
//! recent ones drawn as markers. The viewport is centered on the snapshot's
//! map center and widened until every event fits.

use pothole_types::{Severity, Snapshot};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Points},
        Paragraph,
    },
    Frame,
};

use crate::app::{App, RECENT_LIMIT};
use crate::ui::common::block;

/// Smallest half-extent of the viewport, in degrees (roughly a few city blocks).
const MIN_HALF_SPAN: f64 = 0.005;

/// Visible region as `(lon_bounds, lat_bounds)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

impl Viewport {
    /// Fit all heat points around the map center, with a little margin.
    pub fn fit(snapshot: &Snapshot) -> Self {
        let (lat, lon) = snapshot.map_center();
        let half = snapshot
            .heat_points()
            .iter()
            .map(|[p_lat, p_lon, _]| (p_lat - lat).abs().max((p_lon - lon).abs()))
            .fold(MIN_HALF_SPAN, f64::max)
            * 1.1;

        Self {
            x: [(lon - half).max(-180.0), (lon + half).min(180.0)],
            y: [(lat - half).max(-90.0), (lat + half).min(90.0)],
        }
    }
}

/// Render the Map view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Min(30), Constraint::Length(28)]).split(area);
    render_canvas(frame, app, chunks[0]);
    render_legend(frame, app, chunks[1]);
}

fn render_canvas(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = &app.snapshot;
    let viewport = Viewport::fit(snapshot);
    let (center_lat, center_lon) = snapshot.map_center();
    let radius = (viewport.x[1] - viewport.x[0]) / 80.0;

    // Group coordinates per tier so each tier is one Points shape
    let layers: Vec<(Severity, Vec<(f64, f64)>)> = Severity::ALL
        .iter()
        .map(|&severity| {
            let coords = snapshot
                .events
                .iter()
                .filter(|e| e.severity == severity)
                .map(|e| (e.lon, e.lat))
                .collect();
            (severity, coords)
        })
        .collect();

    let title = format!(" Map ({:.4}, {:.4}) ", center_lat, center_lon);
    let canvas = Canvas::default()
        .block(block(app, title))
        .marker(Marker::Braille)
        .x_bounds(viewport.x)
        .y_bounds(viewport.y)
        .paint(|ctx| {
            // Medium first so severe points are drawn on top
            for (severity, coords) in layers.iter().rev() {
                ctx.draw(&Points {
                    coords,
                    color: app.theme.severity_color(*severity),
                });
            }
            ctx.layer();
            for event in snapshot.recent(RECENT_LIMIT) {
                ctx.draw(&Circle {
                    x: event.lon,
                    y: event.lat,
                    radius,
                    color: app.theme.marker,
                });
            }
        });

    frame.render_widget(canvas, area);
}

fn render_legend(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = &app.snapshot;
    let mut lines = vec![Line::from(Span::styled("Severity", app.theme.header))];
    for bucket in &snapshot.severity_buckets {
        lines.push(Line::from(vec![
            Span::styled("● ", app.theme.severity_style(bucket.severity)),
            Span::raw(format!("{:<7}{:>5}", bucket.label, bucket.count)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("○ ", Style::default().fg(app.theme.marker)),
        Span::raw(format!("{} most recent", RECENT_LIMIT)),
    ]));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Latest", app.theme.header)));
    match snapshot.events.first() {
        Some(event) => {
            lines.push(Line::from(format!("{} {:.2} G", event.id_label(), event.magnitude)));
            lines.push(Line::from(format!("{:.5}, {:.5}", event.lat, event.lon)));
        }
        None => lines.push(Line::from(Span::styled(
            "no events",
            Style::default().add_modifier(Modifier::DIM),
        ))),
    }

    frame.render_widget(Paragraph::new(lines).block(block(app, " Legend ")), area);
}
