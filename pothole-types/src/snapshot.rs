//! Snapshot - the complete derived dashboard state for one poll cycle.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Event, SchemaVersion, Severity};

/// Map center used when there are no events to center on.
pub const DEFAULT_MAP_CENTER: (f64, f64) = (30.7634, 76.6016);

/// Headline numbers shown on the KPI cards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Kpis {
    /// Number of events in the snapshot.
    pub total: usize,
    /// Events that occurred less than 24 hours before the snapshot was taken.
    pub last_24h: usize,
    /// Mean magnitude rounded to two decimals, 0 when there are no events.
    pub avg_magnitude: f64,
}

/// Event count for one severity tier.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeverityBucket {
    pub severity: Severity,
    pub label: String,
    pub count: usize,
    /// Chart color for the tier (hex RGB).
    pub color_hint: String,
}

impl SeverityBucket {
    /// Create a bucket, filling the label and color from the tier.
    pub fn new(severity: Severity, count: usize) -> Self {
        Self {
            severity,
            label: severity.label().to_string(),
            count,
            color_hint: severity.color_hint().to_string(),
        }
    }
}

/// Event count for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineBucket {
    pub date: NaiveDate,
    /// Short display label, e.g. `"Mar 01"`.
    pub label: String,
    pub count: usize,
}

/// A point-in-time view of the feed and everything derived from it.
///
/// Snapshots are built once per successful poll cycle and never mutated
/// afterwards; the scheduler shares them behind an `Arc`. Views that need a
/// slice (for example the ten most recent events) copy it out.
///
/// Invariants upheld by the pipeline:
/// - `events` is sorted newest first
/// - `severity_buckets` always holds exactly `[Severe, High, Medium]` and the
///   counts sum to `events.len()`
/// - `timeline` holds one bucket per distinct UTC day, oldest first
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Schema version for forward compatibility.
    pub version: SchemaVersion,

    /// When the snapshot was assembled. `None` for the initial empty snapshot.
    pub generated_at: Option<DateTime<Utc>>,

    pub events: Vec<Event>,
    pub kpis: Kpis,
    pub severity_buckets: Vec<SeverityBucket>,
    pub timeline: Vec<TimelineBucket>,
}

impl Snapshot {
    /// The snapshot views see before the first successful cycle.
    ///
    /// It has no events but still carries three zero-count severity buckets
    /// so chart consumers never have to special-case it.
    pub fn empty() -> Self {
        Self {
            version: SchemaVersion::current(),
            generated_at: None,
            events: Vec::new(),
            kpis: Kpis::default(),
            severity_buckets: Severity::ALL
                .iter()
                .map(|&s| SeverityBucket::new(s, 0))
                .collect(),
            timeline: Vec::new(),
        }
    }

    /// Assemble a snapshot from normalized events and their aggregates.
    pub fn assemble(
        events: Vec<Event>,
        kpis: Kpis,
        severity_buckets: Vec<SeverityBucket>,
        timeline: Vec<TimelineBucket>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version: SchemaVersion::current(),
            generated_at: Some(generated_at),
            events,
            kpis,
            severity_buckets,
            timeline,
        }
    }

    /// Check if the snapshot has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events in the snapshot.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// The `n` most recent events (fewer if the snapshot is smaller).
    pub fn recent(&self, n: usize) -> &[Event] {
        &self.events[..n.min(self.events.len())]
    }

    /// Heatmap layer: `[lat, lon, intensity]` per event, intensity being the magnitude.
    pub fn heat_points(&self) -> Vec<[f64; 3]> {
        self.events
            .iter()
            .map(|e| [e.lat, e.lon, e.magnitude])
            .collect()
    }

    /// Where the map should be centered: the most recent event, or
    /// [`DEFAULT_MAP_CENTER`] when there are none.
    pub fn map_center(&self) -> (f64, f64) {
        self.events
            .first()
            .map(Event::position)
            .unwrap_or(DEFAULT_MAP_CENTER)
    }

    /// Get the bucket for a severity tier.
    pub fn bucket(&self, severity: Severity) -> Option<&SeverityBucket> {
        self.severity_buckets.iter().find(|b| b.severity == severity)
    }

    /// Percentage of events in a tier, 0 when the snapshot is empty.
    pub fn severity_share(&self, severity: Severity) -> f64 {
        let total = self.events.len();
        if total == 0 {
            return 0.0;
        }
        let count = self.bucket(severity).map_or(0, |b| b.count);
        count as f64 * 100.0 / total as f64
    }

    /// Find an event by feed entry id.
    pub fn event(&self, id: u64) -> Option<&Event> {
        self.events.iter().find(|e| e.id == Some(id))
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}
