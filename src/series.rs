//! Normalized series builder.
//!
//! Turns a fetched batch of raw records into a descending, typed series.
//! Only records without a usable timestamp are dropped; missing sensor or
//! GPS fields are carried through as `None` for the classifier to judge.

use serde::Serialize;

use crate::models::{Channel, NormalizedReading, RawRecord};
use crate::resolver::{resolve_number, resolve_timestamp, Field};

// ---

/// Readings sorted most recent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    readings: Vec<NormalizedReading>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Canonical order, most recent first.
    pub fn descending(&self) -> &[NormalizedReading] {
        &self.readings
    }

    /// Oldest first; derived from the canonical order, never stored.
    pub fn ascending(&self) -> impl DoubleEndedIterator<Item = &NormalizedReading> + '_ {
        self.readings.iter().rev()
    }

    /// Most recent reading, if any.
    pub fn latest(&self) -> Option<&NormalizedReading> {
        self.readings.first()
    }
}

/// Normalize one raw record; `None` when it has no parseable timestamp.
pub fn normalize_record(record: &RawRecord) -> Option<NormalizedReading> {
    // ---
    let timestamp = resolve_timestamp(record)?;

    Some(NormalizedReading {
        timestamp,
        latitude: resolve_number(record, Field::Latitude),
        longitude: resolve_number(record, Field::Longitude),
        temperature: resolve_number(record, Field::Channel(Channel::Temperature)),
        humidity: resolve_number(record, Field::Channel(Channel::Humidity)),
        gas_channel_a: resolve_number(record, Field::Channel(Channel::GasChannelA)),
        gas_channel_b: resolve_number(record, Field::Channel(Channel::GasChannelB)),
    })
}

/// Build a fresh series from a full batch. The result replaces any
/// previous series; nothing is merged.
pub fn build_series(records: &[RawRecord]) -> Series {
    // ---
    let mut readings: Vec<NormalizedReading> =
        records.iter().filter_map(normalize_record).collect();

    let dropped = records.len() - readings.len();
    if dropped > 0 {
        tracing::debug!("Dropped {} of {} records without a timestamp", dropped, records.len());
    }

    // Stable sort: equal timestamps keep their batch order.
    readings.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Series { readings }
}
