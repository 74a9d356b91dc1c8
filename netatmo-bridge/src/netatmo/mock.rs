//! Mock Netatmo API for tests.
//!
//! Serves canned token and station data responses and records every call,
//! so tests can assert which upstream exchanges a flow performed.

use std::sync::Mutex;

use crate::credentials::Credentials;

use super::client::StationApi;
use super::convert::parse_stations_data;
use super::error::NetatmoError;
use super::types::{StationsDataResponse, TokenResponse};

/// An upstream call seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    PasswordGrant { username: String },
    RefreshGrant { refresh_token: String },
    StationsData { access_token: String },
}

/// Mock client serving fixed responses.
pub struct MockStationApi {
    token: Option<TokenResponse>,
    stations_body: Option<String>,
    calls: Mutex<Vec<ApiCall>>,
}

impl MockStationApi {
    /// A mock whose token endpoints issue `access_token` for `expires_in` seconds.
    pub fn issuing(access_token: &str, expires_in: i64) -> Self {
        Self {
            token: Some(TokenResponse {
                access_token: access_token.to_string(),
                refresh_token: format!("{access_token}-refresh"),
                expires_in,
            }),
            stations_body: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A mock whose every call fails with a server error.
    pub fn failing() -> Self {
        Self {
            token: None,
            stations_body: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serve this raw JSON body from the station data endpoint.
    pub fn with_stations_body(mut self, body: impl Into<String>) -> Self {
        self.stations_body = Some(body.into());
        self
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn token_response(&self) -> Result<TokenResponse, NetatmoError> {
        self.token.clone().ok_or_else(|| NetatmoError::ApiError {
            status: 503,
            message: "token endpoint unavailable".to_string(),
        })
    }
}

impl StationApi for MockStationApi {
    async fn request_token(
        &self,
        credentials: &Credentials,
    ) -> Result<TokenResponse, NetatmoError> {
        self.record(ApiCall::PasswordGrant {
            username: credentials.username.clone(),
        });
        self.token_response()
    }

    async fn refresh_token(
        &self,
        _credentials: &Credentials,
        refresh_token: &str,
    ) -> Result<TokenResponse, NetatmoError> {
        self.record(ApiCall::RefreshGrant {
            refresh_token: refresh_token.to_string(),
        });
        self.token_response()
    }

    async fn get_stations_data(
        &self,
        access_token: &str,
    ) -> Result<StationsDataResponse, NetatmoError> {
        self.record(ApiCall::StationsData {
            access_token: access_token.to_string(),
        });

        let body = self
            .stations_body
            .as_deref()
            .ok_or_else(|| NetatmoError::ApiError {
                status: 503,
                message: "station data endpoint unavailable".to_string(),
            })?;
        parse_stations_data(body)
    }
}

/// Credentials used throughout the tests.
pub fn credentials() -> Credentials {
    Credentials {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        username: "user@example.com".to_string(),
        password: "password".to_string(),
    }
}
