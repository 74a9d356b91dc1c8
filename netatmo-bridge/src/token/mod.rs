//! OAuth2 token lifecycle.
//!
//! A [`Token`] is issued by the Netatmo token endpoint and persisted by the
//! [`TokenStore`]. Each invocation classifies the stored token into a
//! [`TokenState`], which decides whether to reuse, refresh or re-request it.

mod error;
mod store;

pub use error::TokenError;
pub use store::TokenStore;

use chrono::{DateTime, TimeDelta, Utc};

/// A token is refreshed when it expires within this many seconds.
pub const STALE_MARGIN_SECS: i64 = 30;

/// An access/refresh token pair with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime granted by the server, in seconds.
    pub expires_in: i64,
    /// `issued_at + expires_in`.
    pub expired_at: DateTime<Utc>,
}

impl Token {
    /// Build a token issued at `issued_at`, validating every field.
    pub fn issue(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: i64,
        issued_at: DateTime<Utc>,
    ) -> Result<Self, TokenError> {
        let access_token = access_token.into();
        let refresh_token = refresh_token.into();

        if access_token.is_empty() {
            return Err(TokenError::MissingField("access_token"));
        }
        if refresh_token.is_empty() {
            return Err(TokenError::MissingField("refresh_token"));
        }

        let expired_at = TimeDelta::try_seconds(expires_in)
            .filter(|_| expires_in > 0)
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .ok_or_else(|| TokenError::InvalidExpiresIn(expires_in.to_string()))?;

        Ok(Self {
            access_token,
            refresh_token,
            expires_in,
            expired_at,
        })
    }

    /// Whether the token expires within [`STALE_MARGIN_SECS`] of `now`.
    pub fn is_stale_soon(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(STALE_MARGIN_SECS) >= self.expired_at
    }
}

/// What the stored token means for this invocation.
#[derive(Debug)]
pub enum TokenState {
    /// No token record exists.
    Absent,
    /// A record exists but is structurally unusable.
    Invalid(TokenError),
    /// Usable, but expires within [`STALE_MARGIN_SECS`].
    StaleSoon(Token),
    /// Usable as is.
    Valid(Token),
}

impl TokenState {
    /// Classify a successfully loaded token.
    pub fn classify(token: Token, now: DateTime<Utc>) -> Self {
        if token.is_stale_soon(now) {
            TokenState::StaleSoon(token)
        } else {
            TokenState::Valid(token)
        }
    }
}
