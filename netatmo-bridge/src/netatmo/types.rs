//! Netatmo API response DTOs.
//!
//! These map directly to the JSON of the token and `getstationsdata`
//! endpoints. Dashboard values are optional because Netatmo omits them
//! when a module is unreachable.

use serde::Deserialize;

/// Response from the OAuth2 token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
}

/// Response from `getstationsdata`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationsDataResponse {
    /// `"ok"` on success.
    pub status: Option<String>,

    pub body: Option<StationsBody>,

    /// Error detail; an object with `code`/`message`, or a plain string.
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationsBody {
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// A main station device.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Device {
    #[serde(rename = "_id")]
    pub id: Option<String>,

    pub station_name: Option<String>,

    pub dashboard_data: Option<DashboardData>,

    #[serde(default)]
    pub modules: Vec<Module>,
}

/// An additional module attached to a main device.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Module {
    #[serde(rename = "_id")]
    pub id: Option<String>,

    pub module_name: Option<String>,

    pub dashboard_data: Option<DashboardData>,
}

/// Latest readings of a device or module.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardData {
    #[serde(rename = "Temperature")]
    pub temperature: Option<f64>,

    #[serde(rename = "Humidity")]
    pub humidity: Option<f64>,

    #[serde(rename = "Pressure")]
    pub pressure: Option<f64>,

    #[serde(rename = "CO2")]
    pub co2: Option<f64>,

    /// Reading time, unix seconds.
    pub time_utc: Option<i64>,

    pub min_temp: Option<f64>,

    pub max_temp: Option<f64>,
}
