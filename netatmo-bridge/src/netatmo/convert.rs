//! Conversion from Netatmo DTOs to domain types.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::measures::{FreshnessLabel, IndoorReadings, OutdoorReadings, Snapshot};
use crate::token::Token;

use super::error::NetatmoError;
use super::types::{DashboardData, StationsDataResponse, TokenResponse};

/// Maximum number of body characters kept in error messages.
const BODY_EXCERPT_CHARS: usize = 500;

pub(crate) fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

/// Decode a token endpoint body.
pub fn parse_token_response(body: &str) -> Result<TokenResponse, NetatmoError> {
    serde_json::from_str(body).map_err(|e| NetatmoError::Json {
        message: e.to_string(),
        body: Some(excerpt(body)),
    })
}

/// Decode a `getstationsdata` body.
pub fn parse_stations_data(body: &str) -> Result<StationsDataResponse, NetatmoError> {
    serde_json::from_str(body).map_err(|e| NetatmoError::Json {
        message: e.to_string(),
        body: Some(excerpt(body)),
    })
}

/// Turn a token response into a [`Token`] issued at `issued_at`.
pub fn token_from_response(
    response: TokenResponse,
    issued_at: DateTime<Utc>,
) -> Result<Token, NetatmoError> {
    Ok(Token::issue(
        response.access_token,
        response.refresh_token,
        response.expires_in,
        issued_at,
    )?)
}

/// Build a snapshot from station data, labelling readings relative to `now`.
///
/// The first device is taken as the indoor main device and its first
/// module as the outdoor module. Stations with several devices or modules
/// are not matched by module type; anything past the first is ignored.
pub fn snapshot_from_stations_data(
    response: StationsDataResponse,
    now: DateTime<Utc>,
) -> Result<Snapshot, NetatmoError> {
    if response.status.as_deref() != Some("ok") {
        return Err(NetatmoError::Status {
            status: response.status,
            detail: response.error.map(|e| match e {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }),
        });
    }

    let main = response
        .body
        .and_then(|body| body.devices.into_iter().next())
        .ok_or(NetatmoError::NoDevices)?;

    let outdoor = main
        .modules
        .into_iter()
        .next()
        .ok_or_else(|| NetatmoError::NoModules {
            device: main.id.clone(),
        })?;

    debug!(
        station = main.station_name.as_deref().unwrap_or("<unnamed>"),
        device = main.id.as_deref().unwrap_or("<unknown>"),
        module = outdoor.module_name.as_deref().unwrap_or("<unnamed>"),
        module_id = outdoor.id.as_deref().unwrap_or("<unknown>"),
        "reading first station device and module"
    );

    let out = outdoor.dashboard_data.unwrap_or_default();
    let ind = main.dashboard_data.unwrap_or_default();

    let out_time = reading_time(&out);
    let in_time = reading_time(&ind);

    Ok(Snapshot {
        outdoor: OutdoorReadings {
            temperature: out.temperature,
            humidity: out.humidity,
            time_utc: out_time,
            time_label: FreshnessLabel::evaluate(out_time, now),
            min_temp: out.min_temp,
            max_temp: out.max_temp,
        },
        indoor: IndoorReadings {
            temperature: ind.temperature,
            humidity: ind.humidity,
            pressure: ind.pressure,
            co2: ind.co2,
            time_utc: in_time,
            time_label: FreshnessLabel::evaluate(in_time, now),
        },
    })
}

/// Netatmo reports a missing reading time as absent or `0`.
fn reading_time(dashboard: &DashboardData) -> Option<i64> {
    dashboard.time_utc.filter(|&ts| ts != 0)
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// A `getstationsdata` body with readings at the given unix times.
    pub fn stations_body(indoor_time: i64, outdoor_time: i64) -> String {
        format!(
            r#"{{
                "status": "ok",
                "time_server": 1760000000,
                "body": {{
                    "devices": [{{
                        "_id": "70:ee:50:00:00:01",
                        "station_name": "Home",
                        "type": "NAMain",
                        "dashboard_data": {{
                            "time_utc": {indoor_time},
                            "Temperature": 21.3,
                            "CO2": 640,
                            "Humidity": 52,
                            "Noise": 38,
                            "Pressure": 1013.2,
                            "AbsolutePressure": 1001.4,
                            "min_temp": 20.1,
                            "max_temp": 22.0,
                            "pressure_trend": "stable"
                        }},
                        "modules": [{{
                            "_id": "02:00:00:00:00:01",
                            "type": "NAModule1",
                            "module_name": "Garden",
                            "dashboard_data": {{
                                "time_utc": {outdoor_time},
                                "Temperature": 7.4,
                                "Humidity": 81,
                                "min_temp": 4.1,
                                "max_temp": 11.9,
                                "temp_trend": "down"
                            }}
                        }}, {{
                            "_id": "03:00:00:00:00:02",
                            "type": "NAModule4",
                            "module_name": "Bedroom",
                            "dashboard_data": {{
                                "time_utc": {outdoor_time},
                                "Temperature": 19.0,
                                "Humidity": 48
                            }}
                        }}]
                    }}]
                }}
            }}"#
        )
    }
}
