//! Derived dashboard figures: KPIs, severity distribution and daily timeline.
//!
//! All functions are pure. The reference time is passed in so the
//! "last 24 hours" window is reproducible in tests.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use pothole_types::{Event, Kpis, Severity, SeverityBucket, Snapshot, TimelineBucket};

/// Width of the recent-activity window.
pub fn recent_window() -> Duration {
    Duration::hours(24)
}

/// Everything derived from a set of events.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub kpis: Kpis,
    pub severity_buckets: Vec<SeverityBucket>,
    pub timeline: Vec<TimelineBucket>,
}

/// Compute all aggregates in one go.
pub fn aggregate(events: &[Event], now: DateTime<Utc>) -> Aggregates {
    Aggregates {
        kpis: kpis(events, now),
        severity_buckets: severity_buckets(events),
        timeline: timeline(events),
    }
}

/// Build a complete snapshot from normalized events.
pub fn build_snapshot(events: Vec<Event>, now: DateTime<Utc>) -> Snapshot {
    let Aggregates {
        kpis,
        severity_buckets,
        timeline,
    } = aggregate(&events, now);
    Snapshot::assemble(events, kpis, severity_buckets, timeline, now)
}

/// Total count, count in the last 24 hours, and mean magnitude.
///
/// An event is recent when it occurred strictly less than 24 hours before
/// `now`. Events stamped in the future count as recent.
pub fn kpis(events: &[Event], now: DateTime<Utc>) -> Kpis {
    if events.is_empty() {
        return Kpis::default();
    }

    let window = recent_window();
    let last_24h = events
        .iter()
        .filter(|e| now.signed_duration_since(e.occurred_at) < window)
        .count();
    let sum: f64 = events.iter().map(|e| e.magnitude).sum();

    Kpis {
        total: events.len(),
        last_24h,
        avg_magnitude: round2(sum / events.len() as f64),
    }
}

/// Counts per tier, always `[Severe, High, Medium]`, zero counts included.
pub fn severity_buckets(events: &[Event]) -> Vec<SeverityBucket> {
    Severity::ALL
        .iter()
        .map(|&severity| {
            let count = events.iter().filter(|e| e.severity == severity).count();
            SeverityBucket::new(severity, count)
        })
        .collect()
}

/// One bucket per distinct UTC day that has events, oldest first.
///
/// Labels are `"Mar 01"` style. When the events span more than one calendar
/// year the year is appended so labels stay unique.
pub fn timeline(events: &[Event]) -> Vec<TimelineBucket> {
    let mut days: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for event in events {
        *days.entry(event.occurred_at.date_naive()).or_default() += 1;
    }

    let spans_years = match (days.keys().next(), days.keys().next_back()) {
        (Some(first), Some(last)) => first.year() != last.year(),
        _ => false,
    };
    let format = if spans_years { "%b %d %Y" } else { "%b %d" };

    days.into_iter()
        .map(|(date, count)| TimelineBucket {
            date,
            label: date.format(format).to_string(),
            count,
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
