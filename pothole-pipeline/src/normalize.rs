//! Turning raw feed records into validated events.
//!
//! A record becomes an [`Event`] only when it has a timestamp and finite,
//! in-range magnitude and coordinates. The entry id is optional. Everything
//! else is dropped silently; a single bad record never fails the batch.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use pothole_adapters::{FieldValue, RawRecord};
use pothole_types::Event;

/// Why a record was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingMagnitude,
    MissingLatitude,
    MissingLongitude,
    MissingTimestamp,
    MagnitudeOutOfRange,
    LatitudeOutOfRange,
    LongitudeOutOfRange,
}

/// Validate one record.
pub fn validate(record: &RawRecord) -> Result<Event, Rejection> {
    let id = record.entry_id.as_ref().and_then(FieldValue::as_u64);
    let magnitude = number(&record.field1).ok_or(Rejection::MissingMagnitude)?;
    let lat = number(&record.field2).ok_or(Rejection::MissingLatitude)?;
    let lon = number(&record.field3).ok_or(Rejection::MissingLongitude)?;
    let occurred_at = record
        .created_at
        .as_deref()
        .and_then(parse_timestamp)
        .ok_or(Rejection::MissingTimestamp)?;

    if magnitude < 0.0 {
        return Err(Rejection::MagnitudeOutOfRange);
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(Rejection::LatitudeOutOfRange);
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(Rejection::LongitudeOutOfRange);
    }

    Ok(Event::new(id, magnitude, lat, lon, occurred_at))
}

/// Validate a batch, drop what fails, and order the rest newest first.
///
/// The sort is stable, so events sharing a timestamp keep their upstream
/// order.
pub fn normalize(records: &[RawRecord]) -> Vec<Event> {
    let mut events: Vec<Event> = records.iter().filter_map(|r| validate(r).ok()).collect();
    events.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    events
}

fn number(field: &Option<FieldValue>) -> Option<f64> {
    field.as_ref().and_then(FieldValue::as_f64)
}

/// Parse a feed timestamp.
///
/// Accepts RFC 3339 (the feed's native format) and, as a fallback, a naive
/// `YYYY-MM-DD HH:MM:SS` with an optional ` UTC` suffix, read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    let naive = raw.strip_suffix(" UTC").unwrap_or(raw);
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|ts| Utc.from_utc_datetime(&ts))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, magnitude: &str, at: &str) -> RawRecord {
        RawRecord::new(id)
            .magnitude(magnitude)
            .lat("30.7634")
            .lon("76.6016")
            .created_at(at)
    }

    #[test]
    fn valid_record_becomes_event() {
        let event = validate(&record(7, "3.6", "2025-03-01T10:00:00Z")).unwrap();
        assert_eq!(event.id, Some(7));
        assert_eq!(event.magnitude, 3.6);
        assert_eq!(event.position(), (30.7634, 76.6016));
        assert_eq!(
            event.occurred_at,
            Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn missing_or_unparsable_fields_are_rejected() {
        let base = record(1, "3.0", "2025-03-01T10:00:00Z");

        let mut r = base.clone();
        r.field3 = None;
        assert_eq!(validate(&r), Err(Rejection::MissingLongitude));

        let mut r = base.clone();
        r.field1 = Some("abc".into());
        assert_eq!(validate(&r), Err(Rejection::MissingMagnitude));

        let mut r = base.clone();
        r.field2 = Some("".into());
        assert_eq!(validate(&r), Err(Rejection::MissingLatitude));

        let mut r = base;
        r.created_at = Some("yesterday".into());
        assert_eq!(validate(&r), Err(Rejection::MissingTimestamp));
    }

    #[test]
    fn entry_id_is_optional() {
        let mut r = record(1, "3.0", "2025-03-01T10:00:00Z");
        r.entry_id = None;
        assert_eq!(validate(&r).map(|e| e.id), Ok(None));

        r.entry_id = Some("not-a-number".into());
        assert_eq!(validate(&r).map(|e| e.id), Ok(None));

        assert_eq!(normalize(&[r]).len(), 1);
    }

    #[test]
    fn every_drop_is_explained_by_a_bad_field() {
        let at = "2025-03-01T10:00:00Z";
        let mut no_id = record(0, "2.0", at);
        no_id.entry_id = None;
        let mut no_lon = record(3, "2.0", at);
        no_lon.field3 = None;
        let mut blank_lat = record(4, "2.0", at);
        blank_lat.field2 = Some("  ".into());

        let records = vec![
            record(1, "2.0", at),
            record(2, "", at),
            no_id,
            no_lon,
            blank_lat,
            record(5, "3.1", "not a time"),
            record(6, "4.2", at),
        ];

        let kept = normalize(&records);
        assert_eq!(kept.len(), 3);
        assert!(kept.len() <= records.len());

        let reasons: Vec<Rejection> = records
            .iter()
            .filter_map(|r| validate(r).err())
            .collect();
        assert_eq!(reasons.len(), records.len() - kept.len());
        assert_eq!(
            reasons,
            [
                Rejection::MissingMagnitude,
                Rejection::MissingLongitude,
                Rejection::MissingLatitude,
                Rejection::MissingTimestamp,
            ]
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let r = record(1, "-0.5", "2025-03-01T10:00:00Z");
        assert_eq!(validate(&r), Err(Rejection::MagnitudeOutOfRange));

        let r = record(1, "3.0", "2025-03-01T10:00:00Z").lat("91");
        assert_eq!(validate(&r), Err(Rejection::LatitudeOutOfRange));

        let r = record(1, "3.0", "2025-03-01T10:00:00Z").lon("-180.5");
        assert_eq!(validate(&r), Err(Rejection::LongitudeOutOfRange));
    }

    #[test]
    fn zero_magnitude_is_kept() {
        let event = validate(&record(1, "0", "2025-03-01T10:00:00Z")).unwrap();
        assert_eq!(event.magnitude, 0.0);
    }

    #[test]
    fn normalize_drops_bad_records_and_sorts_newest_first() {
        let records = vec![
            record(1, "2.0", "2025-03-01T08:00:00Z"),
            record(2, "bad", "2025-03-01T09:00:00Z"),
            record(3, "3.0", "2025-03-01T12:00:00Z"),
            record(4, "4.0", "2025-03-01T10:00:00Z"),
        ];

        let ids: Vec<u64> = normalize(&records).iter().filter_map(|e| e.id).collect();
        assert_eq!(ids, [3, 4, 1]);
    }

    #[test]
    fn equal_timestamps_keep_upstream_order() {
        let records = vec![
            record(10, "2.0", "2025-03-01T08:00:00Z"),
            record(11, "2.0", "2025-03-01T09:00:00Z"),
            record(12, "2.0", "2025-03-01T08:00:00Z"),
        ];

        let ids: Vec<u64> = normalize(&records).iter().filter_map(|e| e.id).collect();
        assert_eq!(ids, [11, 10, 12]);
    }

    #[test]
    fn empty_batch() {
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01T15:30:00+05:30"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01 10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-01 10:00:00 UTC"), Some(expected));
        assert_eq!(parse_timestamp(" 2025-03-01T10:00:00 "), Some(expected));
        assert_eq!(parse_timestamp("03/01/2025"), None);
    }
}
