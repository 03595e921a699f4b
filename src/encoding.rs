//! Value → visual encoding for heat-map style rendering.
//!
//! Each channel carries one [`ChannelScale`]; [`encode`] is the only place
//! that turns a scalar into color and radius. Policy for every channel:
//! higher intensity draws a larger and more opaque circle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Channel, NormalizedReading, Position, Rgba, VisualEncoding};
use crate::validity::{is_valid_position, SentinelPolicy};

// ---

pub const MIN_RADIUS: f64 = 8.0;
pub const MAX_RADIUS: f64 = 30.0;
pub const MIN_OPACITY: f64 = 0.15;
pub const MAX_OPACITY: f64 = 0.65;

/// Fixed rendering scale of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelScale {
    /// Base color; only alpha varies with intensity.
    pub rgb: [u8; 3],
    /// Value at which intensity saturates.
    pub full_scale: f64,
    pub radius: (f64, f64),
    pub opacity: (f64, f64),
}

impl Channel {
    pub fn scale(&self) -> ChannelScale {
        // ---
        let (rgb, full_scale) = match self {
            Channel::Temperature => ([255, 69, 0], 40.0),
            Channel::Humidity => ([30, 144, 255], 100.0),
            Channel::GasChannelA => ([255, 140, 0], 500.0),
            Channel::GasChannelB => ([128, 0, 128], 500.0),
        };
        ChannelScale {
            rgb,
            full_scale,
            radius: (MIN_RADIUS, MAX_RADIUS),
            opacity: (MIN_OPACITY, MAX_OPACITY),
        }
    }
}

impl ChannelScale {
    /// Fraction of full scale in `0.0..=1.0`. NaN and negative values map
    /// to 0, anything at or beyond full scale (including +inf) to 1.
    pub fn intensity(&self, value: f64) -> f64 {
        // ---
        if value.is_nan() || value <= 0.0 {
            return 0.0;
        }
        (value.min(self.full_scale) / self.full_scale).clamp(0.0, 1.0)
    }

    pub fn encode(&self, value: f64) -> VisualEncoding {
        // ---
        let pct = self.intensity(value);
        let [r, g, b] = self.rgb;
        VisualEncoding {
            color: Rgba {
                r,
                g,
                b,
                a: lerp(self.opacity, pct),
            },
            radius: lerp(self.radius, pct),
        }
    }
}

fn lerp((lo, hi): (f64, f64), t: f64) -> f64 {
    (lo + (hi - lo) * t).clamp(lo, hi)
}

/// Encode `value` on `channel`'s fixed scale. Total for every input.
pub fn encode(channel: Channel, value: f64) -> VisualEncoding {
    channel.scale().encode(value)
}

/// One circle on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub timestamp: DateTime<Utc>,
    pub position: Position,
    pub value: f64,
    pub encoding: VisualEncoding,
    pub css_color: String,
    /// Every channel of the reading, for the circle's tooltip.
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub gas_channel_a: Option<f64>,
    pub gas_channel_b: Option<f64>,
}

/// Render list for `channel`: readings with an invalid position or an
/// invalid value on that channel are left out; the rest keep their order.
pub fn map_points<'a, I>(readings: I, channel: Channel, policy: &SentinelPolicy) -> Vec<MapPoint>
where
    I: IntoIterator<Item = &'a NormalizedReading>,
{
    // ---
    let scale = channel.scale();
    readings
        .into_iter()
        .filter_map(|r| {
            if !is_valid_position(r.latitude, r.longitude) {
                return None;
            }
            let value = r.value(channel);
            if !policy.is_valid_channel_value(channel, value) {
                return None;
            }
            let (lat, lng, value) = (r.latitude?, r.longitude?, value?);
            let encoding = scale.encode(value);
            Some(MapPoint {
                timestamp: r.timestamp,
                position: Position::new(lat, lng),
                value,
                css_color: encoding.color.to_css(),
                encoding,
                temperature: r.temperature,
                humidity: r.humidity,
                gas_channel_a: r.gas_channel_a,
                gas_channel_b: r.gas_channel_b,
            })
        })
        .collect()
}
