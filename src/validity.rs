//! Validity predicates for positions and channel values.
//!
//! Validity is evaluated at render time, never stored on the reading: a
//! reading with a dead gas sensor is still a good temperature reading.

use serde::Serialize;

use crate::models::Channel;

// ---

/// `(0, 0)` is the GPS module's "no fix" output and never a real position
/// in the deployment region. Absent or NaN coordinates are also invalid.
pub fn is_valid_position(lat: Option<f64>, lng: Option<f64>) -> bool {
    // ---
    match (lat, lng) {
        (Some(lat), Some(lng)) => {
            !lat.is_nan() && !lng.is_nan() && !(lat == 0.0 && lng == 0.0)
        }
        _ => false,
    }
}

/// Which channels treat an exact `0` as "no data this cycle".
///
/// Firmware reports `0` when a sensor produced nothing, so by default a
/// zero is a sentinel on every channel. Channels listed in `ZERO_IS_DATA`
/// keep zero as a real reading (e.g. a calibrated 0% humidity probe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SentinelPolicy {
    zero_is_data: [bool; 4],
}

impl Default for SentinelPolicy {
    fn default() -> Self {
        Self {
            zero_is_data: [false; 4],
        }
    }
}

impl SentinelPolicy {
    /// Policy where zero is real data for the given channels.
    pub fn zero_is_data_for(channels: &[Channel]) -> Self {
        // ---
        let mut policy = Self::default();
        for &channel in channels {
            policy.zero_is_data[Self::slot(channel)] = true;
        }
        policy
    }

    pub fn zero_is_missing(&self, channel: Channel) -> bool {
        !self.zero_is_data[Self::slot(channel)]
    }

    /// False when the value is absent, NaN, or a zero sentinel.
    pub fn is_valid_channel_value(&self, channel: Channel, value: Option<f64>) -> bool {
        // ---
        match value {
            None => false,
            Some(v) if v.is_nan() => false,
            Some(v) if v == 0.0 => !self.zero_is_missing(channel),
            Some(_) => true,
        }
    }

    fn slot(channel: Channel) -> usize {
        match channel {
            Channel::Temperature => 0,
            Channel::Humidity => 1,
            Channel::GasChannelA => 2,
            Channel::GasChannelB => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_position_sentinel() {
        // ---
        assert!(!is_valid_position(Some(0.0), Some(0.0)));
        assert!(is_valid_position(Some(-23.55), Some(-46.63)));
        assert!(!is_valid_position(Some(f64::NAN), Some(-46.63)));
        assert!(!is_valid_position(None, Some(-46.63)));
        assert!(!is_valid_position(Some(-23.55), None));
    }

    #[test]
    fn test_single_zero_coordinate_is_valid() {
        // ---
        // On the equator or the prime meridian, but not both.
        assert!(is_valid_position(Some(0.0), Some(-46.63)));
        assert!(is_valid_position(Some(-23.55), Some(0.0)));
    }

    #[test]
    fn test_channel_zero_sentinel() {
        // ---
        let policy = SentinelPolicy::default();
        assert!(!policy.is_valid_channel_value(Channel::Temperature, Some(0.0)));
        assert!(policy.is_valid_channel_value(Channel::Temperature, Some(0.01)));
        assert!(policy.is_valid_channel_value(Channel::Temperature, Some(-4.0)));
        assert!(!policy.is_valid_channel_value(Channel::Humidity, None));
        assert!(!policy.is_valid_channel_value(Channel::GasChannelA, Some(f64::NAN)));
    }

    #[test]
    fn test_zero_is_data_is_per_channel() {
        // ---
        let policy = SentinelPolicy::zero_is_data_for(&[Channel::Humidity]);
        assert!(policy.is_valid_channel_value(Channel::Humidity, Some(0.0)));
        assert!(!policy.is_valid_channel_value(Channel::Temperature, Some(0.0)));
        assert!(!policy.is_valid_channel_value(Channel::Humidity, None));
    }
}
