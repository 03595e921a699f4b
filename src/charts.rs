//! Time-series chart datasets for the selected day.
//!
//! Sentinel values become gaps (`null`) instead of dropping to zero, so a
//! dead sensor does not draw a cliff in the line chart.

use chrono::FixedOffset;
use serde::Serialize;

use crate::models::{Channel, NormalizedReading};
use crate::validity::SentinelPolicy;

// ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub channel: Channel,
    pub label: &'static str,
    pub color: &'static str,
    pub data: Vec<Option<f64>>,
}

/// One chart: shared x labels plus a dataset per channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub climate: Chart,
    pub gas: Chart,
}

fn style(channel: Channel) -> (&'static str, &'static str) {
    // ---
    match channel {
        Channel::Temperature => ("Temp (°C)", "red"),
        Channel::Humidity => ("Humidity (%)", "blue"),
        Channel::GasChannelA => ("MQ9 (Gas)", "orange"),
        Channel::GasChannelB => ("MQ135 (Air)", "green"),
    }
}

fn chart(
    readings: &[&NormalizedReading],
    channels: &[Channel],
    offset: FixedOffset,
    policy: &SentinelPolicy,
) -> Chart {
    // ---
    let labels = readings
        .iter()
        .map(|r| r.timestamp.with_timezone(&offset).format("%H:%M:%S").to_string())
        .collect();

    let datasets = channels
        .iter()
        .map(|&channel| {
            let (label, color) = style(channel);
            let data = readings
                .iter()
                .map(|r| {
                    let v = r.value(channel);
                    v.filter(|_| policy.is_valid_channel_value(channel, v))
                })
                .collect();
            Dataset {
                channel,
                label,
                color,
                data,
            }
        })
        .collect();

    Chart { labels, datasets }
}

/// Build the climate and gas charts over `readings` (oldest first).
pub fn build_charts(
    readings: &[&NormalizedReading],
    offset: FixedOffset,
    policy: &SentinelPolicy,
) -> Charts {
    // ---
    Charts {
        climate: chart(readings, &[Channel::Temperature, Channel::Humidity], offset, policy),
        gas: chart(readings, &[Channel::GasChannelA, Channel::GasChannelB], offset, policy),
    }
}
