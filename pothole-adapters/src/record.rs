//! Wire format of feed records.
//!
//! Records are deserialized leniently: every field is optional and numeric
//! fields may arrive as text or as JSON numbers. A field of an unexpected
//! type reads as absent, and an entry that is not an object at all becomes an
//! empty record. Validation is left to the pipeline's normalizer, which drops
//! records it cannot use, so one odd entry never costs the rest of the batch.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::FetchError;

/// A field value as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    /// Anything else (objects, arrays, booleans). Never numeric.
    Other(serde_json::Value),
}

impl FieldValue {
    /// Parse as a finite float. Text is trimmed; `inf`/`NaN` are rejected.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
            FieldValue::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Parse as a non-negative integer id.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n <= u64::MAX as f64 => {
                Some(*n as u64)
            }
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// One unvalidated entry from the feed.
///
/// `field1` carries the impact magnitude, `field2` the latitude and `field3`
/// the longitude. Any other fields in the payload are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub entry_id: Option<FieldValue>,
    #[serde(default)]
    pub field1: Option<FieldValue>,
    #[serde(default)]
    pub field2: Option<FieldValue>,
    #[serde(default)]
    pub field3: Option<FieldValue>,
    #[serde(default, deserialize_with = "text_or_absent")]
    pub created_at: Option<String>,
}

/// Accept a JSON string; anything else reads as absent.
fn text_or_absent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

impl RawRecord {
    /// Start a record with the given entry id and nothing else.
    pub fn new(entry_id: u64) -> Self {
        Self {
            entry_id: Some(FieldValue::Number(entry_id as f64)),
            ..Self::default()
        }
    }

    /// Set the magnitude field (`field1`).
    pub fn magnitude(mut self, value: impl Into<FieldValue>) -> Self {
        self.field1 = Some(value.into());
        self
    }

    /// Set the latitude field (`field2`).
    pub fn lat(mut self, value: impl Into<FieldValue>) -> Self {
        self.field2 = Some(value.into());
        self
    }

    /// Set the longitude field (`field3`).
    pub fn lon(mut self, value: impl Into<FieldValue>) -> Self {
        self.field3 = Some(value.into());
        self
    }

    /// Set the creation timestamp.
    pub fn created_at(mut self, value: impl Into<String>) -> Self {
        self.created_at = Some(value.into());
        self
    }
}

/// Channel metadata returned alongside the feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelInfo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_entry_id: Option<u64>,
}

/// The response envelope of a feed read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEnvelope {
    pub channel: Option<ChannelInfo>,
    pub feeds: Vec<RawRecord>,
}

/// Envelope as read off the wire, entries still untyped.
#[derive(Deserialize)]
struct WireEnvelope {
    #[serde(default)]
    channel: Option<Value>,
    feeds: Vec<Value>,
}

impl FeedEnvelope {
    /// Parse an envelope from a response body.
    ///
    /// A body that is not JSON, or has no `feeds` array, is a
    /// [`FetchError::Payload`]. Entries are read one by one: an entry that
    /// is not a record is kept as an empty [`RawRecord`] for the normalizer
    /// to drop, so `feeds` always has one record per upstream entry.
    pub fn parse(body: &[u8]) -> Result<Self, FetchError> {
        let wire: WireEnvelope = serde_json::from_slice(body)?;

        let channel = wire
            .channel
            .and_then(|value| ChannelInfo::deserialize(value).ok());

        let feeds = wire
            .feeds
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                RawRecord::deserialize(value).unwrap_or_else(|err| {
                    debug!(index, error = %err, "feed entry is not a record");
                    RawRecord::default()
                })
            })
            .collect();

        Ok(Self { channel, feeds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_and_numbers() {
        assert_eq!(FieldValue::from("3.25").as_f64(), Some(3.25));
        assert_eq!(FieldValue::from(" -1.5 ").as_f64(), Some(-1.5));
        assert_eq!(FieldValue::from(2.0).as_f64(), Some(2.0));
        assert_eq!(FieldValue::from("").as_f64(), None);
        assert_eq!(FieldValue::from("abc").as_f64(), None);
        assert_eq!(FieldValue::from("3.2abc").as_f64(), None);
        assert_eq!(FieldValue::from("inf").as_f64(), None);
        assert_eq!(FieldValue::from("NaN").as_f64(), None);
        assert_eq!(FieldValue::Other(serde_json::json!(true)).as_f64(), None);
    }

    #[test]
    fn parses_entry_ids() {
        assert_eq!(FieldValue::from(42.0).as_u64(), Some(42));
        assert_eq!(FieldValue::from("17").as_u64(), Some(17));
        assert_eq!(FieldValue::from(-3.0).as_u64(), None);
        assert_eq!(FieldValue::from(1.5).as_u64(), None);
    }

    #[test]
    fn envelope_tolerates_odd_records() {
        let body = br#"{
            "channel": {"id": 3153910, "name": "potholes", "last_entry_id": 3},
            "feeds": [
                {"created_at": "2025-03-01T10:00:00Z", "entry_id": 1, "field1": "2.9", "field2": "30.76", "field3": "76.60"},
                {"created_at": "2025-03-01T11:00:00Z", "entry_id": 2, "field1": null, "field2": "30.76"},
                {"created_at": "2025-03-01T12:00:00Z", "entry_id": 3, "field1": 4.1, "field2": {"x": 1}, "field3": "76.60", "field4": "ignored"}
            ]
        }"#;

        let envelope = FeedEnvelope::parse(body).unwrap();
        assert_eq!(envelope.channel.unwrap().last_entry_id, Some(3));
        assert_eq!(envelope.feeds.len(), 3);
        assert_eq!(envelope.feeds[0].field1, Some(FieldValue::from("2.9")));
        assert_eq!(envelope.feeds[1].field1, None);
        assert_eq!(envelope.feeds[1].field3, None);
        assert_eq!(envelope.feeds[2].field1, Some(FieldValue::Number(4.1)));
        assert!(matches!(envelope.feeds[2].field2, Some(FieldValue::Other(_))));
    }

    #[test]
    fn malformed_entry_does_not_cost_the_batch() {
        let body = br#"{
            "feeds": [
                {"created_at": "2025-03-01T10:00:00Z", "entry_id": 1, "field1": "2.9", "field2": "30.76", "field3": "76.60"},
                {"created_at": 1740823200, "entry_id": 2, "field1": "3.1", "field2": "30.76", "field3": "76.60"},
                null,
                "garbage",
                {"created_at": "2025-03-01T12:00:00Z", "entry_id": 5, "field1": "4.1", "field2": "30.77", "field3": "76.61"}
            ]
        }"#;

        let envelope = FeedEnvelope::parse(body).unwrap();
        assert_eq!(envelope.feeds.len(), 5);

        // valid siblings survive untouched
        assert_eq!(envelope.feeds[0].field1, Some(FieldValue::from("2.9")));
        assert_eq!(envelope.feeds[4].field1, Some(FieldValue::from("4.1")));

        // a numeric timestamp reads as absent, the rest of the entry is kept
        assert_eq!(envelope.feeds[1].created_at, None);
        assert_eq!(envelope.feeds[1].field1, Some(FieldValue::from("3.1")));

        // non-object entries become empty records
        assert_eq!(envelope.feeds[2], RawRecord::default());
        assert_eq!(envelope.feeds[3], RawRecord::default());
    }

    #[test]
    fn malformed_channel_is_ignored() {
        let body = br#"{"channel": "oops", "feeds": []}"#;
        let envelope = FeedEnvelope::parse(body).unwrap();
        assert_eq!(envelope.channel, None);
        assert!(envelope.feeds.is_empty());
    }

    #[test]
    fn envelope_without_feeds_is_payload_error() {
        let err = FeedEnvelope::parse(br#"{"channel": {}}"#).unwrap_err();
        assert!(err.is_payload());

        let err = FeedEnvelope::parse(b"<html>502</html>").unwrap_err();
        assert!(err.is_payload());
    }

    #[test]
    fn builder_helpers_fill_fields() {
        let record = RawRecord::new(9)
            .magnitude("4.0")
            .lat("30.1")
            .lon("76.2")
            .created_at("2025-03-01T10:00:00Z");
        assert_eq!(record.entry_id.as_ref().and_then(FieldValue::as_u64), Some(9));
        assert_eq!(record.field3.as_ref().and_then(FieldValue::as_f64), Some(76.2));
    }
}
