//! Disk cache for the last fetched snapshot.
//!
//! Freshness is judged by the cache file's modification time only. The
//! reading timestamps inside the snapshot play no part in it.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::{StoreError, read_record, write_record};

use super::{FreshnessLabel, IndoorReadings, OutdoorReadings, Snapshot, reading, timestamp};

/// Default cache TTL: 150 seconds.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(150);

/// On-disk snapshot record. Keys match the published topic suffixes.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotRecord {
    out_temperature: String,
    #[serde(rename = "outHumidity")]
    out_humidity: String,
    #[serde(rename = "outtime_utc")]
    out_time_utc: String,
    #[serde(rename = "outtime_utc_str")]
    out_time_label: String,
    #[serde(rename = "outMinTemp")]
    out_min_temp: String,
    #[serde(rename = "outMaxTemp")]
    out_max_temp: String,
    #[serde(rename = "inTemperature")]
    in_temperature: String,
    #[serde(rename = "inHumidity")]
    in_humidity: String,
    #[serde(rename = "inPressure")]
    in_pressure: String,
    #[serde(rename = "inCO2")]
    in_co2: String,
    #[serde(rename = "intime_utc")]
    in_time_utc: String,
    #[serde(rename = "intime_utc_str")]
    in_time_label: String,
}

/// A stored value that does not parse back into a reading.
#[derive(Debug, thiserror::Error)]
#[error("invalid cached value for {field}: {value:?}")]
struct InvalidValue {
    field: &'static str,
    value: String,
}

impl From<&Snapshot> for SnapshotRecord {
    fn from(s: &Snapshot) -> Self {
        Self {
            out_temperature: reading(s.outdoor.temperature),
            out_humidity: reading(s.outdoor.humidity),
            out_time_utc: timestamp(s.outdoor.time_utc),
            out_time_label: s.outdoor.time_label.as_str().to_string(),
            out_min_temp: reading(s.outdoor.min_temp),
            out_max_temp: reading(s.outdoor.max_temp),
            in_temperature: reading(s.indoor.temperature),
            in_humidity: reading(s.indoor.humidity),
            in_pressure: reading(s.indoor.pressure),
            in_co2: reading(s.indoor.co2),
            in_time_utc: timestamp(s.indoor.time_utc),
            in_time_label: s.indoor.time_label.as_str().to_string(),
        }
    }
}

impl SnapshotRecord {
    fn into_snapshot(self) -> Result<Snapshot, InvalidValue> {
        Ok(Snapshot {
            outdoor: OutdoorReadings {
                temperature: parse_reading("out_temperature", &self.out_temperature)?,
                humidity: parse_reading("outHumidity", &self.out_humidity)?,
                time_utc: parse_timestamp("outtime_utc", &self.out_time_utc)?,
                time_label: FreshnessLabel::parse(&self.out_time_label),
                min_temp: parse_reading("outMinTemp", &self.out_min_temp)?,
                max_temp: parse_reading("outMaxTemp", &self.out_max_temp)?,
            },
            indoor: IndoorReadings {
                temperature: parse_reading("inTemperature", &self.in_temperature)?,
                humidity: parse_reading("inHumidity", &self.in_humidity)?,
                pressure: parse_reading("inPressure", &self.in_pressure)?,
                co2: parse_reading("inCO2", &self.in_co2)?,
                time_utc: parse_timestamp("intime_utc", &self.in_time_utc)?,
                time_label: FreshnessLabel::parse(&self.in_time_label),
            },
        })
    }
}

fn parse_reading(field: &'static str, value: &str) -> Result<Option<f64>, InvalidValue> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<Option<i64>, InvalidValue> {
    match value.parse::<i64>() {
        Ok(0) => Ok(None),
        Ok(ts) => Ok(Some(ts)),
        Err(_) => Err(InvalidValue {
            field,
            value: value.to_string(),
        }),
    }
}

/// Disk cache holding one snapshot.
#[derive(Debug, Clone)]
pub struct MeasurementCache {
    path: PathBuf,
}

impl MeasurementCache {
    /// Create a cache backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Age of the cache file at `now`, or `None` if there is no file.
    ///
    /// A modification time in the future counts as age zero.
    pub fn age_at(&self, now: SystemTime) -> Option<Duration> {
        let modified = std::fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(now.duration_since(modified).unwrap_or(Duration::ZERO))
    }

    /// Whether the cache file is at most `ttl` old.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.is_fresh_at(ttl, SystemTime::now())
    }

    /// Whether the cache file is at most `ttl` old at `now`.
    pub fn is_fresh_at(&self, ttl: Duration, now: SystemTime) -> bool {
        self.age_at(now).is_some_and(|age| age <= ttl)
    }

    /// Load the cached snapshot.
    ///
    /// Returns `None` if there is no cache or it cannot be decoded.
    pub fn load(&self) -> Option<Snapshot> {
        let record = match read_record::<SnapshotRecord>(&self.path) {
            Ok(record) => record?,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable measurement cache");
                return None;
            }
        };

        match record.into_snapshot() {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt measurement cache");
                None
            }
        }
    }

    /// Save a snapshot, replacing the previous one.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        write_record(&self.path, &SnapshotRecord::from(snapshot))?;
        debug!(path = %self.path.display(), "measurements cached");
        Ok(())
    }

    /// Get the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measures::fixtures;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_cache() {
        let dir = tempdir().unwrap();
        let cache = MeasurementCache::new(dir.path().join("measures.json"));
        let snapshot = fixtures::snapshot();

        cache.save(&snapshot).unwrap();

        assert_eq!(cache.load(), Some(snapshot));
    }

    #[test]
    fn labels_survive_cache_unchanged() {
        let dir = tempdir().unwrap();
        let cache = MeasurementCache::new(dir.path().join("measures.json"));

        // A "current" label stays current even though its reading is
        // long past the staleness threshold by now.
        let snapshot = fixtures::snapshot();
        cache.save(&snapshot).unwrap();

        let loaded = cache.load().unwrap();
        assert_eq!(loaded.outdoor.time_label, snapshot.outdoor.time_label);
        assert_eq!(loaded.indoor.time_label, FreshnessLabel::OutOfDate);
    }

    #[test]
    fn missing_readings_round_trip() {
        let dir = tempdir().unwrap();
        let cache = MeasurementCache::new(dir.path().join("measures.json"));
        let mut snapshot = fixtures::snapshot();
        snapshot.indoor.co2 = None;
        snapshot.outdoor.time_utc = None;
        snapshot.outdoor.time_label = FreshnessLabel::Unknown;

        cache.save(&snapshot).unwrap();

        assert_eq!(cache.load(), Some(snapshot));
    }

    #[test]
    fn missing_cache_is_absent_and_stale() {
        let cache = MeasurementCache::new("/nonexistent/path/measures.json");

        assert!(cache.load().is_none());
        assert!(!cache.is_fresh(DEFAULT_CACHE_TTL));
    }

    #[test]
    fn empty_file_is_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("measures.json");
        std::fs::write(&path, "").unwrap();

        assert!(MeasurementCache::new(&path).load().is_none());
    }

    #[test]
    fn record_missing_field_is_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("measures.json");
        std::fs::write(&path, r#"{"out_temperature": "7.4"}"#).unwrap();

        assert!(MeasurementCache::new(&path).load().is_none());
    }

    #[test]
    fn unparsable_value_is_absent() {
        let dir = tempdir().unwrap();
        let cache = MeasurementCache::new(dir.path().join("measures.json"));
        cache.save(&fixtures::snapshot()).unwrap();

        let contents = std::fs::read_to_string(cache.path()).unwrap();
        std::fs::write(cache.path(), contents.replace("1013.2", "high")).unwrap();

        assert!(cache.load().is_none());
    }

    #[test]
    fn freshly_written_cache_is_fresh() {
        let dir = tempdir().unwrap();
        let cache = MeasurementCache::new(dir.path().join("measures.json"));
        cache.save(&fixtures::snapshot()).unwrap();

        assert!(cache.is_fresh(DEFAULT_CACHE_TTL));
    }

    #[test]
    fn cache_200s_old_is_stale_with_default_ttl() {
        let dir = tempdir().unwrap();
        let cache = MeasurementCache::new(dir.path().join("measures.json"));
        cache.save(&fixtures::snapshot()).unwrap();

        let modified = std::fs::metadata(cache.path()).unwrap().modified().unwrap();
        let now = modified + Duration::from_secs(200);

        assert!(!cache.is_fresh_at(DEFAULT_CACHE_TTL, now));
        assert!(cache.is_fresh_at(Duration::from_secs(300), now));
    }

    #[test]
    fn future_mtime_counts_as_fresh() {
        let dir = tempdir().unwrap();
        let cache = MeasurementCache::new(dir.path().join("measures.json"));
        cache.save(&fixtures::snapshot()).unwrap();

        let modified = std::fs::metadata(cache.path()).unwrap().modified().unwrap();
        let now = modified - Duration::from_secs(60);

        assert_eq!(cache.age_at(now), Some(Duration::ZERO));
        assert!(cache.is_fresh_at(Duration::ZERO, now));
    }
}
