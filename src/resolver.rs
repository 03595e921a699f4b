//! Field resolution across producer key spellings.
//!
//! Producers renamed fields between firmware revisions without versioning
//! the payload, so each logical field has a fixed, ordered list of accepted
//! key names. Resolution never guesses from structure: only the names in
//! [`FieldAliases`] are consulted.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::models::{Channel, RawRecord};

// ---

/// Logical field of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Timestamp,
    Latitude,
    Longitude,
    Channel(Channel),
}

/// Ordered candidate key names per logical field.
pub struct FieldAliases;

impl FieldAliases {
    pub const TIMESTAMP: &'static [&'static str] = &["created_at", "timestamp", "ts", "time"];
    pub const LATITUDE: &'static [&'static str] = &["latitude", "lat"];
    pub const LONGITUDE: &'static [&'static str] = &["longitude", "lng", "lon"];
    pub const TEMPERATURE: &'static [&'static str] = &["temp", "temperature", "temperature_c"];
    pub const HUMIDITY: &'static [&'static str] = &["humidity", "hum", "umid"];
    pub const GAS_CHANNEL_A: &'static [&'static str] = &["mq9_val", "mq9", "mq9_co"];
    pub const GAS_CHANNEL_B: &'static [&'static str] = &["mq135_val", "mq135", "mq135_co2"];

    pub fn for_field(field: Field) -> &'static [&'static str] {
        // ---
        match field {
            Field::Timestamp => Self::TIMESTAMP,
            Field::Latitude => Self::LATITUDE,
            Field::Longitude => Self::LONGITUDE,
            Field::Channel(Channel::Temperature) => Self::TEMPERATURE,
            Field::Channel(Channel::Humidity) => Self::HUMIDITY,
            Field::Channel(Channel::GasChannelA) => Self::GAS_CHANNEL_A,
            Field::Channel(Channel::GasChannelB) => Self::GAS_CHANNEL_B,
        }
    }
}

/// Return the value of the first candidate key that is present, non-null
/// and not an empty string.
pub fn resolve<'a>(record: &'a RawRecord, candidates: &[&str]) -> Option<&'a Value> {
    // ---
    candidates.iter().find_map(|key| match record.get(*key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    })
}

/// Resolve a logical field to a finite `f64`.
///
/// The first usable candidate decides: if it does not coerce to a finite
/// number the field is absent, even if a later alias would have parsed.
/// An explicit `0` resolves to `Some(0.0)`; deciding whether that zero is a
/// sentinel is left to [`crate::validity`].
pub fn resolve_number(record: &RawRecord, field: Field) -> Option<f64> {
    // ---
    let value = resolve(record, FieldAliases::for_field(field))?;
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Resolve the record's timestamp.
pub fn resolve_timestamp(record: &RawRecord) -> Option<DateTime<Utc>> {
    // ---
    match resolve(record, FieldAliases::TIMESTAMP)? {
        Value::String(s) => parse_timestamp(s.trim()),
        Value::Number(n) => n.as_i64().and_then(from_epoch),
        _ => None,
    }
}

/// Parse the textual timestamp shapes seen from producers and from
/// PostgreSQL's `timestamptz` text output. Naive values are taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    // ---
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(ts) = DateTime::parse_from_str(s, fmt) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    s.parse::<i64>().ok().and_then(from_epoch)
}

/// Integer epochs: values beyond 1e11 are milliseconds, otherwise seconds.
fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    // ---
    if n.unsigned_abs() >= 100_000_000_000 {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}
