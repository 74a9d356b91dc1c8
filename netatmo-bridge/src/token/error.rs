//! Token validation errors.

/// Reasons a token record or token response cannot become a [`Token`](super::Token).
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The persisted record could not be read or decoded
    #[error("unreadable token record: {0}")]
    Unreadable(#[from] crate::store::StoreError),

    /// A required field is missing or empty
    #[error("missing token field: {0}")]
    MissingField(&'static str),

    /// `expires_in` is not a positive number of seconds
    #[error("invalid expires_in: {0:?}")]
    InvalidExpiresIn(String),

    /// `expired_at` is not an RFC 3339 timestamp
    #[error("invalid expired_at: {0:?}")]
    InvalidExpiredAt(String),
}
