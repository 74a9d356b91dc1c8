//! Netatmo HTTP client.
//!
//! Provides the three upstream calls the bridge needs: a password grant, a
//! refresh grant and `getstationsdata`. The calls sit behind the
//! [`StationApi`] trait so the token session can be driven without network
//! access.

use reqwest::StatusCode;
use tracing::debug;

use crate::credentials::Credentials;

use super::convert::{excerpt, parse_stations_data, parse_token_response};
use super::error::NetatmoError;
use super::types::{StationsDataResponse, TokenResponse};

/// Default OAuth2 token endpoint.
const DEFAULT_TOKEN_URL: &str = "https://api.netatmo.com/oauth2/token";

/// Default station data endpoint.
const DEFAULT_STATIONS_DATA_URL: &str = "https://api.netatmo.com/api/getstationsdata";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Upstream calls made by the token session.
#[allow(async_fn_in_trait)]
pub trait StationApi {
    /// Exchange account credentials for a new token (password grant).
    async fn request_token(&self, credentials: &Credentials)
    -> Result<TokenResponse, NetatmoError>;

    /// Exchange a refresh token for a new token (refresh grant).
    async fn refresh_token(
        &self,
        credentials: &Credentials,
        refresh_token: &str,
    ) -> Result<TokenResponse, NetatmoError>;

    /// Fetch the station data visible to the access token.
    async fn get_stations_data(
        &self,
        access_token: &str,
    ) -> Result<StationsDataResponse, NetatmoError>;
}

/// Configuration for the Netatmo client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// OAuth2 token endpoint
    pub token_url: String,
    /// Station data endpoint
    pub stations_data_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Skip TLS certificate validation (debugging only)
    pub insecure: bool,
}

impl ApiConfig {
    /// Create a config pointing at the production Netatmo API.
    pub fn new() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            stations_data_url: DEFAULT_STATIONS_DATA_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            insecure: false,
        }
    }

    /// Set a custom token endpoint (for testing).
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Set a custom station data endpoint (for testing).
    pub fn with_stations_data_url(mut self, url: impl Into<String>) -> Self {
        self.stations_data_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Disable TLS certificate validation.
    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Netatmo API client.
#[derive(Debug, Clone)]
pub struct NetatmoClient {
    http: reqwest::Client,
    token_url: String,
    stations_data_url: String,
}

impl NetatmoClient {
    /// Create a new Netatmo client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, NetatmoError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.insecure)
            .build()?;

        Ok(Self {
            http,
            token_url: config.token_url,
            stations_data_url: config.stations_data_url,
        })
    }

    async fn post_token_form(&self, form: &[(&str, &str)]) -> Result<TokenResponse, NetatmoError> {
        let response = self.http.post(&self.token_url).form(form).send().await?;
        let body = checked_body(response).await?;
        parse_token_response(&body)
    }
}

impl StationApi for NetatmoClient {
    async fn request_token(
        &self,
        credentials: &Credentials,
    ) -> Result<TokenResponse, NetatmoError> {
        debug!(url = %self.token_url, "requesting token with password grant");
        self.post_token_form(&[
            ("grant_type", "password"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ])
        .await
    }

    async fn refresh_token(
        &self,
        credentials: &Credentials,
        refresh_token: &str,
    ) -> Result<TokenResponse, NetatmoError> {
        debug!(url = %self.token_url, "refreshing token");
        self.post_token_form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ])
        .await
    }

    async fn get_stations_data(
        &self,
        access_token: &str,
    ) -> Result<StationsDataResponse, NetatmoError> {
        debug!(url = %self.stations_data_url, "fetching station data");
        let response = self
            .http
            .get(&self.stations_data_url)
            .query(&[("access_token", access_token)])
            .send()
            .await?;

        let body = checked_body(response).await?;
        parse_stations_data(&body)
    }
}

/// Map non-success statuses to errors and return the body text.
async fn checked_body(response: reqwest::Response) -> Result<String, NetatmoError> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        let body = response.text().await.unwrap_or_default();
        return Err(NetatmoError::Unauthorized {
            message: excerpt(&body),
        });
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(NetatmoError::ApiError {
            status: status.as_u16(),
            message: excerpt(&body),
        });
    }

    Ok(response.text().await?)
}
