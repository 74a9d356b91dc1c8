//! Station measurement snapshot.
//!
//! A [`Snapshot`] holds the readings of the outdoor module and the indoor
//! main device as fetched at one point in time. Each reading timestamp has
//! a [`FreshnessLabel`] that is computed once, when the snapshot is built
//! from an upstream response, and then carried as is through the cache.

mod cache;

pub use cache::{DEFAULT_CACHE_TTL, MeasurementCache};

use chrono::{DateTime, Local, TimeZone, Utc};

/// Readings older than this many seconds are labelled out of date.
pub const STALE_READING_SECS: i64 = 3000;

/// Label sentinel for readings older than [`STALE_READING_SECS`].
pub const OUT_OF_DATE: &str = "outofdate";

/// Label sentinel for readings without a timestamp.
pub const UNKNOWN: &str = "unknown";

/// Human-readable timestamp format used in labels.
const LABEL_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// Companion label of a reading timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreshnessLabel {
    /// The reading is recent; holds the formatted local timestamp.
    Current(String),
    /// The reading was older than [`STALE_READING_SECS`] when fetched.
    OutOfDate,
    /// The upstream response carried no timestamp.
    Unknown,
}

impl FreshnessLabel {
    /// Compute the label of a reading taken at `timestamp` (unix seconds).
    pub fn evaluate(timestamp: Option<i64>, now: DateTime<Utc>) -> Self {
        let Some(ts) = timestamp else {
            return FreshnessLabel::Unknown;
        };

        if now.timestamp() - ts > STALE_READING_SECS {
            return FreshnessLabel::OutOfDate;
        }

        match format_reading_time(ts) {
            Some(formatted) => FreshnessLabel::Current(formatted),
            None => FreshnessLabel::Unknown,
        }
    }

    /// Parse a stored label.
    pub fn parse(s: &str) -> Self {
        match s {
            OUT_OF_DATE => FreshnessLabel::OutOfDate,
            "" | UNKNOWN => FreshnessLabel::Unknown,
            other => FreshnessLabel::Current(other.to_string()),
        }
    }

    /// Returns the label as published.
    pub fn as_str(&self) -> &str {
        match self {
            FreshnessLabel::Current(s) => s,
            FreshnessLabel::OutOfDate => OUT_OF_DATE,
            FreshnessLabel::Unknown => UNKNOWN,
        }
    }
}

/// Format a unix timestamp as local `YYYY-MM-DD_HH:MM:SS`.
pub fn format_reading_time(timestamp: i64) -> Option<String> {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|t| t.format(LABEL_FORMAT).to_string())
}

/// Readings of the outdoor module.
#[derive(Debug, Clone, PartialEq)]
pub struct OutdoorReadings {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    /// Reading time, unix seconds.
    pub time_utc: Option<i64>,
    pub time_label: FreshnessLabel,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
}

/// Readings of the indoor main device.
#[derive(Debug, Clone, PartialEq)]
pub struct IndoorReadings {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub co2: Option<f64>,
    /// Reading time, unix seconds.
    pub time_utc: Option<i64>,
    pub time_label: FreshnessLabel,
}

/// One complete set of station readings.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub outdoor: OutdoorReadings,
    pub indoor: IndoorReadings,
}

impl Snapshot {
    /// Topic → value pairs for the message bus, in a fixed order.
    ///
    /// Missing readings are published as empty strings and missing
    /// timestamps as `0`, so the topic set never changes.
    pub fn to_payloads(&self) -> Vec<(&'static str, String)> {
        let out = &self.outdoor;
        let ind = &self.indoor;

        vec![
            ("netatmo/outTemperature", reading(out.temperature)),
            ("netatmo/outHumidity", reading(out.humidity)),
            ("netatmo/outtime_utc", timestamp(out.time_utc)),
            ("netatmo/outtime_utc_str", out.time_label.as_str().to_string()),
            ("netatmo/outMinTemp", reading(out.min_temp)),
            ("netatmo/outMaxTemp", reading(out.max_temp)),
            ("netatmo/inTemperature", reading(ind.temperature)),
            ("netatmo/inHumidity", reading(ind.humidity)),
            ("netatmo/inPressure", reading(ind.pressure)),
            ("netatmo/inCO2", reading(ind.co2)),
            ("netatmo/intime_utc", timestamp(ind.time_utc)),
            ("netatmo/intime_utc_str", ind.time_label.as_str().to_string()),
        ]
    }
}

/// Shortest decimal form of a reading: `21.0` is published as `21`.
pub(crate) fn reading(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub(crate) fn timestamp(value: Option<i64>) -> String {
    value.unwrap_or(0).to_string()
}
