//! Netatmo client error types.

use std::fmt;

use crate::store::StoreError;
use crate::token::TokenError;

/// Errors from the Netatmo API client and token session.
#[derive(Debug)]
pub enum NetatmoError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// Credentials or token rejected (401/403)
    Unauthorized { message: String },

    /// API returned an error status code
    ApiError { status: u16, message: String },

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Token response was well-formed JSON but not a usable token
    InvalidToken(TokenError),

    /// Station data reported a non-ok status
    Status {
        status: Option<String>,
        detail: Option<String>,
    },

    /// Station data contained no devices
    NoDevices,

    /// The first device has no modules
    NoModules { device: Option<String> },

    /// Token record could not be read or written
    Store(StoreError),
}

impl fmt::Display for NetatmoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetatmoError::Http(e) => write!(f, "HTTP error: {e}"),
            NetatmoError::Unauthorized { message } => write!(f, "unauthorized: {message}"),
            NetatmoError::ApiError { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            NetatmoError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            NetatmoError::InvalidToken(e) => write!(f, "invalid token response: {e}"),
            NetatmoError::Status { status, detail } => {
                write!(
                    f,
                    "Netatmo API error: status={}",
                    status.as_deref().unwrap_or("<missing>")
                )?;
                if let Some(detail) = detail {
                    write!(f, " error={detail}")?;
                }
                Ok(())
            }
            NetatmoError::NoDevices => write!(f, "no Netatmo devices found in response"),
            NetatmoError::NoModules { device } => match device {
                Some(id) => write!(f, "no Netatmo modules found under main device {id}"),
                None => write!(f, "no Netatmo modules found under main device"),
            },
            NetatmoError::Store(e) => write!(f, "token store error: {e}"),
        }
    }
}

impl std::error::Error for NetatmoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetatmoError::Http(e) => Some(e),
            NetatmoError::InvalidToken(e) => Some(e),
            NetatmoError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NetatmoError {
    fn from(err: reqwest::Error) -> Self {
        NetatmoError::Http(err)
    }
}

impl From<TokenError> for NetatmoError {
    fn from(err: TokenError) -> Self {
        NetatmoError::InvalidToken(err)
    }
}

impl From<StoreError> for NetatmoError {
    fn from(err: StoreError) -> Self {
        NetatmoError::Store(err)
    }
}

impl NetatmoError {
    /// Whether the API answered but reported a semantic problem.
    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            NetatmoError::Status { .. } | NetatmoError::NoDevices | NetatmoError::NoModules { .. }
        )
    }
}
