//! Token session: decides per invocation whether to reuse, refresh or
//! request a token, and fetches station measures with it.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::credentials::Credentials;
use crate::measures::Snapshot;
use crate::token::{Token, TokenState, TokenStore};

use super::client::StationApi;
use super::convert::{snapshot_from_stations_data, token_from_response};
use super::error::NetatmoError;

/// Station API client bound to one set of credentials and a token store.
pub struct NetatmoSession<A> {
    api: A,
    credentials: Credentials,
    tokens: TokenStore,
}

impl<A: StationApi> NetatmoSession<A> {
    /// Create a new session.
    pub fn new(api: A, credentials: Credentials, tokens: TokenStore) -> Self {
        Self {
            api,
            credentials,
            tokens,
        }
    }

    /// Get a usable access token, requesting or refreshing it as needed.
    pub async fn get_token(&self) -> Result<Token, NetatmoError> {
        self.get_token_at(Utc::now()).await
    }

    /// Get a usable access token as of `now`.
    ///
    /// A failed exchange leaves the stored token untouched. Only a record
    /// that cannot be parsed is deleted; a token file that cannot be read
    /// fails the call and stays in place.
    pub async fn get_token_at(&self, now: DateTime<Utc>) -> Result<Token, NetatmoError> {
        match self.tokens.state_at(now)? {
            TokenState::Valid(token) => {
                debug!(expired_at = %token.expired_at, "using stored token");
                Ok(token)
            }
            TokenState::StaleSoon(token) => {
                info!(expired_at = %token.expired_at, "token expiring soon, refreshing");
                let response = self
                    .api
                    .refresh_token(&self.credentials, &token.refresh_token)
                    .await?;
                self.persist(token_from_response(response, now)?)
            }
            TokenState::Invalid(e) => {
                warn!(path = %self.tokens.path().display(), error = %e, "discarding invalid token record");
                self.tokens.delete();
                self.request_new(now).await
            }
            TokenState::Absent => {
                info!("no token found, requesting a new token");
                self.request_new(now).await
            }
        }
    }

    /// Fetch current station measures.
    pub async fn fetch_station_measures(&self, access_token: &str) -> Result<Snapshot, NetatmoError> {
        self.fetch_station_measures_at(access_token, Utc::now()).await
    }

    /// Fetch station measures, labelling readings relative to `now`.
    pub async fn fetch_station_measures_at(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Snapshot, NetatmoError> {
        let response = self.api.get_stations_data(access_token).await?;
        snapshot_from_stations_data(response, now)
    }

    /// Access the underlying API client.
    pub fn api(&self) -> &A {
        &self.api
    }

    async fn request_new(&self, now: DateTime<Utc>) -> Result<Token, NetatmoError> {
        let response = self.api.request_token(&self.credentials).await?;
        self.persist(token_from_response(response, now)?)
    }

    fn persist(&self, token: Token) -> Result<Token, NetatmoError> {
        self.tokens.save(&token)?;
        info!(expired_at = %token.expired_at, "new token stored");
        Ok(token)
    }
}
