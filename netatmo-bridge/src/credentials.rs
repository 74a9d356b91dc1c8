//! Netatmo application credentials.
//!
//! Credentials live in a settings file under an `authentication` section.
//! When the file does not exist a skeleton with placeholder values is
//! written so the user only has to fill it in.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::{StoreError, read_record, write_record};

/// Placeholder values written into a fresh settings skeleton.
const PLACEHOLDERS: [&str; 4] = ["CLIENT_ID", "CLIENT_SECRET", "USERNAME", "PASSWORD"];

/// Errors loading credentials. All of them are configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Settings file could not be read, parsed or created
    #[error("settings file error: {0}")]
    Store(#[from] StoreError),

    /// The `authentication` section is missing
    #[error("missing authentication section in {path}")]
    MissingSection { path: PathBuf },

    /// A value is empty or still a placeholder
    #[error("settings value '{field}' is not configured in {path}; edit the file and set real credentials")]
    NotConfigured { field: &'static str, path: PathBuf },
}

/// Client and account secrets used for token requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    authentication: Option<AuthenticationSection>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct AuthenticationSection {
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

impl AuthenticationSection {
    fn skeleton() -> Self {
        let [client_id, client_secret, username, password] = PLACEHOLDERS.map(String::from);
        Self {
            client_id,
            client_secret,
            username,
            password,
        }
    }
}

/// Reads credentials from the settings file.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store backed by the given settings file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load credentials, creating a placeholder skeleton if the file is missing.
    ///
    /// A freshly created skeleton fails validation, so the first run without
    /// settings always ends in [`CredentialError::NotConfigured`].
    pub fn load_or_create(&self) -> Result<Credentials, CredentialError> {
        let settings = match read_record::<SettingsFile>(&self.path)? {
            Some(settings) => settings,
            None => {
                warn!(path = %self.path.display(), "settings file not found, creating a skeleton");
                let skeleton = SettingsFile {
                    authentication: Some(AuthenticationSection::skeleton()),
                };
                write_record(&self.path, &skeleton)?;
                skeleton
            }
        };

        let auth = settings
            .authentication
            .ok_or_else(|| CredentialError::MissingSection {
                path: self.path.clone(),
            })?;

        Ok(Credentials {
            client_id: self.configured("client_id", auth.client_id)?,
            client_secret: self.configured("client_secret", auth.client_secret)?,
            username: self.configured("username", auth.username)?,
            password: self.configured("password", auth.password)?,
        })
    }

    fn configured(&self, field: &'static str, value: String) -> Result<String, CredentialError> {
        let value = value.trim();
        if value.is_empty() || PLACEHOLDERS.contains(&value) {
            return Err(CredentialError::NotConfigured {
                field,
                path: self.path.clone(),
            });
        }
        Ok(value.to_string())
    }
}
