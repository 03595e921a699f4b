//! Data models for the sensor map pipeline.
//!
//! Raw records arrive as untyped JSON objects whose key names vary across
//! firmware revisions. Everything downstream of the resolver works on
//! [`NormalizedReading`], where every scalar is an `Option<f64>` so that
//! "absent" never has to be encoded as zero.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Untyped record exactly as received from a producer.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Sensor channel that can be visualized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    // ---
    Temperature,
    Humidity,
    /// MQ-9 (CO / combustible gas) analog channel.
    GasChannelA,
    /// MQ-135 (air quality) analog channel.
    GasChannelB,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Temperature,
        Channel::Humidity,
        Channel::GasChannelA,
        Channel::GasChannelB,
    ];

    pub fn as_str(&self) -> &'static str {
        // ---
        match self {
            Channel::Temperature => "temperature",
            Channel::Humidity => "humidity",
            Channel::GasChannelA => "gas_channel_a",
            Channel::GasChannelB => "gas_channel_b",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a channel name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown channel '{0}'")]
pub struct UnknownChannel(pub String);

impl FromStr for Channel {
    type Err = UnknownChannel;

    /// Accepts the canonical names plus the short mode names used by the
    /// older dashboards (`temp`, `hum`, `mq9`, `mq135`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        match s.trim().to_ascii_lowercase().as_str() {
            "temperature" | "temp" => Ok(Channel::Temperature),
            "humidity" | "hum" | "umid" => Ok(Channel::Humidity),
            "gas_channel_a" | "gas_a" | "mq9" => Ok(Channel::GasChannelA),
            "gas_channel_b" | "gas_b" | "mq135" => Ok(Channel::GasChannelB),
            other => Err(UnknownChannel(other.to_string())),
        }
    }
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Canonical, immutable reading produced by the series builder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedReading {
    // ---
    pub timestamp: DateTime<Utc>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub gas_channel_a: Option<f64>,
    pub gas_channel_b: Option<f64>,
}

impl NormalizedReading {
    /// Value carried for `channel`, if the producer sent one.
    pub fn value(&self, channel: Channel) -> Option<f64> {
        // ---
        match channel {
            Channel::Temperature => self.temperature,
            Channel::Humidity => self.humidity,
            Channel::GasChannelA => self.gas_channel_a,
            Channel::GasChannelB => self.gas_channel_b,
        }
    }
}

/// Straight RGBA color; alpha is in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    /// CSS `rgba()` form, alpha rounded to two decimals.
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {:.2})", self.r, self.g, self.b, self.a)
    }
}

/// Heat-map style encoding of one scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualEncoding {
    pub color: Rgba,
    pub radius: f64,
}
