//! Validated impact events and their severity tiers.

use core::fmt;

use chrono::{DateTime, Utc};

/// Magnitude above which an impact is [`Severity::Severe`].
pub const SEVERE_THRESHOLD: f64 = 3.5;

/// Magnitude above which an impact is at least [`Severity::High`].
pub const HIGH_THRESHOLD: f64 = 2.8;

/// Severity tier of an impact, determined solely by its magnitude.
///
/// There is no low tier: anything at or below [`HIGH_THRESHOLD`] is `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Medium,
    High,
    Severe,
}

impl Severity {
    /// All tiers in chart order (most severe first).
    pub const ALL: [Severity; 3] = [Severity::Severe, Severity::High, Severity::Medium];

    /// Classify a magnitude (in G).
    ///
    /// Both thresholds are exclusive: exactly 3.5 is `High` and exactly 2.8
    /// is `Medium`. NaN compares false everywhere and lands in `Medium`.
    pub fn classify(magnitude: f64) -> Self {
        if magnitude > SEVERE_THRESHOLD {
            Severity::Severe
        } else if magnitude > HIGH_THRESHOLD {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Severe => "Severe",
            Severity::High => "High",
            Severity::Medium => "Medium",
        }
    }

    /// Fixed chart color for this tier, as a hex RGB string.
    pub fn color_hint(&self) -> &'static str {
        match self {
            Severity::Severe => "#ef4444",
            Severity::High => "#f97316",
            Severity::Medium => "#eab308",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated impact reading.
///
/// Events are only constructed from records whose magnitude, position and
/// timestamp all parsed. The entry id is carried along when the feed sent a
/// usable one. The severity is cached because every view reads it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// Feed entry id, if the record carried one. Unique per feed, not
    /// across feed resets.
    pub id: Option<u64>,
    /// Peak acceleration of the impact, in G.
    pub magnitude: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// When the impact was recorded upstream.
    pub occurred_at: DateTime<Utc>,
    /// Cached [`Severity::classify`] of `magnitude`.
    pub severity: Severity,
}

impl Event {
    /// Create an event, deriving its severity from the magnitude.
    pub fn new(
        id: impl Into<Option<u64>>,
        magnitude: f64,
        lat: f64,
        lon: f64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            magnitude,
            lat,
            lon,
            occurred_at,
            severity: Severity::classify(magnitude),
        }
    }

    /// Position as `(lat, lon)`.
    pub fn position(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }

    /// Id for display: `#42`, or `#?` when the feed sent none.
    pub fn id_label(&self) -> String {
        match self.id {
            Some(id) => format!("#{}", id),
            None => "#?".to_string(),
        }
    }
}
