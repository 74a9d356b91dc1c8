//! Disk persistence for the current token.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::{StoreError, read_record, remove_record, write_record};

use super::{Token, TokenError, TokenState};

/// On-disk token record. Every value is stored as a string.
#[derive(Debug, Serialize, Deserialize)]
struct TokenRecord {
    access_token: String,
    refresh_token: String,
    expires_in: String,
    expired_at: String,
}

impl From<&Token> for TokenRecord {
    fn from(token: &Token) -> Self {
        Self {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_in: token.expires_in.to_string(),
            expired_at: token
                .expired_at
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl TryFrom<TokenRecord> for Token {
    type Error = TokenError;

    fn try_from(record: TokenRecord) -> Result<Self, Self::Error> {
        if record.access_token.is_empty() {
            return Err(TokenError::MissingField("access_token"));
        }
        if record.refresh_token.is_empty() {
            return Err(TokenError::MissingField("refresh_token"));
        }

        let expires_in = record
            .expires_in
            .parse::<i64>()
            .map_err(|_| TokenError::InvalidExpiresIn(record.expires_in.clone()))?;

        let expired_at = DateTime::parse_from_rfc3339(&record.expired_at)
            .map_err(|_| TokenError::InvalidExpiredAt(record.expired_at.clone()))?
            .with_timezone(&Utc);

        Ok(Token {
            access_token: record.access_token,
            refresh_token: record.refresh_token,
            expires_in,
            expired_at,
        })
    }
}

/// Persists the single current token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Create a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and classify the stored token relative to `now`.
    ///
    /// A record that cannot be decoded or validated is [`TokenState::Invalid`].
    /// A file that cannot be read at all is an error: the record may be fine
    /// and must not be discarded.
    pub fn state_at(&self, now: DateTime<Utc>) -> Result<TokenState, StoreError> {
        let record = match read_record::<TokenRecord>(&self.path) {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(TokenState::Absent),
            Err(e @ StoreError::Json { .. }) => return Ok(TokenState::Invalid(e.into())),
            Err(e) => return Err(e),
        };

        Ok(match Token::try_from(record) {
            Ok(token) => TokenState::classify(token, now),
            Err(e) => TokenState::Invalid(e),
        })
    }

    /// Load the stored token.
    ///
    /// Returns `None` if there is no record or it is unusable.
    pub fn load(&self) -> Option<Token> {
        match self.read() {
            Ok(token) => token,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unusable token record");
                None
            }
        }
    }

    /// Persist a token, replacing the previous record.
    pub fn save(&self, token: &Token) -> Result<(), StoreError> {
        write_record(&self.path, &TokenRecord::from(token))?;
        debug!(path = %self.path.display(), expired_at = %token.expired_at, "token saved");
        Ok(())
    }

    /// Remove the stored token. Failures are logged, never returned.
    pub fn delete(&self) {
        match remove_record(&self.path) {
            Ok(true) => debug!(path = %self.path.display(), "token record deleted"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "failed to delete token record"),
        }
    }

    /// Get the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<Token>, TokenError> {
        read_record::<TokenRecord>(&self.path)?
            .map(Token::try_from)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use tempfile::tempdir;

    fn token(expires_in: i64, issued_at: DateTime<Utc>) -> Token {
        Token::issue("access-abc", "refresh-xyz", expires_in, issued_at).unwrap()
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let saved = token(10800, Utc::now());

        store.save(&saved).unwrap();

        assert_eq!(store.load(), Some(saved));
    }

    #[test]
    fn save_replaces_previous_token() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));

        store.save(&token(10, Utc::now())).unwrap();
        let newer = Token::issue("access-2", "refresh-2", 10800, Utc::now()).unwrap();
        store.save(&newer).unwrap();

        assert_eq!(store.load(), Some(newer));
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));

        assert!(store.load().is_none());
        assert!(matches!(store.state_at(Utc::now()).unwrap(), TokenState::Absent));
    }

    #[test]
    fn empty_file_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "").unwrap();
        let store = TokenStore::new(&path);

        assert!(store.load().is_none());
        assert!(matches!(
            store.state_at(Utc::now()).unwrap(),
            TokenState::Invalid(TokenError::Unreadable(_))
        ));
    }

    #[test]
    fn record_missing_field_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            r#"{"access_token": "a", "expires_in": "10800", "expired_at": "2030-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let store = TokenStore::new(&path);

        assert!(store.load().is_none());
        assert!(matches!(store.state_at(Utc::now()).unwrap(), TokenState::Invalid(_)));
    }

    #[test]
    fn record_with_empty_token_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            r#"{"access_token": "", "refresh_token": "r", "expires_in": "10800", "expired_at": "2030-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let store = TokenStore::new(&path);

        assert!(matches!(
            store.state_at(Utc::now()).unwrap(),
            TokenState::Invalid(TokenError::MissingField("access_token"))
        ));
    }

    #[test]
    fn record_with_bad_timestamp_is_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            r#"{"access_token": "a", "refresh_token": "r", "expires_in": "10800", "expired_at": "2030-01-01 00:00:00"}"#,
        )
        .unwrap();
        let store = TokenStore::new(&path);

        assert!(matches!(
            store.state_at(Utc::now()).unwrap(),
            TokenState::Invalid(TokenError::InvalidExpiredAt(_))
        ));
    }

    #[test]
    fn unreadable_file_is_an_error_not_invalid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::create_dir(&path).unwrap();
        let store = TokenStore::new(&path);

        assert!(matches!(
            store.state_at(Utc::now()),
            Err(StoreError::Io { .. })
        ));
        assert!(path.is_dir());
    }

    #[test]
    fn state_reflects_expiry() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        let now = Utc::now();

        store.save(&token(3600, now)).unwrap();
        assert!(matches!(store.state_at(now).unwrap(), TokenState::Valid(_)));
        assert!(matches!(
            store.state_at(now + TimeDelta::seconds(3590)).unwrap(),
            TokenState::StaleSoon(_)
        ));
    }

    #[test]
    fn delete_is_best_effort() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));

        store.delete();

        store.save(&token(3600, Utc::now())).unwrap();
        store.delete();
        assert!(!store.path().exists());
    }
}
