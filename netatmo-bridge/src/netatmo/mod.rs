//! Netatmo weather station API.
//!
//! This module provides the HTTP client for the Netatmo cloud API and the
//! token session built on top of it.
//!
//! Key characteristics of the API:
//! - Tokens come from an OAuth2 endpoint (password or refresh grant) and
//!   expire after `expires_in` seconds, typically three hours
//! - `getstationsdata` returns every station of the account; only the first
//!   device and its first module are read

mod client;
mod convert;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod session;
mod types;

pub use client::{ApiConfig, NetatmoClient, StationApi};
pub use convert::{
    parse_stations_data, parse_token_response, snapshot_from_stations_data, token_from_response,
};
pub use error::NetatmoError;
pub use session::NetatmoSession;
pub use types::{DashboardData, Device, Module, StationsBody, StationsDataResponse, TokenResponse};

#[cfg(test)]
pub(crate) use convert::fixtures;
