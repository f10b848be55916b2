use thiserror::Error;

pub type WishlistResult<T> = Result<T, WishlistError>;

#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("email already in use")]
    EmailAlreadyInUse,
    #[error("no active session")]
    NoActiveSession,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("document not found")]
    NotFound,
    #[error("remote request failed")]
    RequestFailed,
    #[error("write succeeded but cache refresh failed: {0}")]
    RefreshFailed(#[source] Box<WishlistError>),
    #[error("keyring unavailable")]
    KeyringUnavailable,
    #[error("keyring locked")]
    KeyringLocked,
    #[error("unsupported backend: {0}")]
    UnsupportedBackend(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("crypto operation failed")]
    Crypto,
    #[error("serialization failed")]
    Serialization,
}

impl WishlistError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// True when the remote write landed but the local cache could not be reloaded.
    pub fn is_stale_cache(&self) -> bool {
        matches!(self, Self::RefreshFailed(_))
    }
}

impl From<argon2::password_hash::Error> for WishlistError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::debug!(error = %err, "password hashing failed");
        Self::Crypto
    }
}

impl From<keyring::Error> for WishlistError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => Self::NoActiveSession,
            keyring::Error::NoStorageAccess(_) => Self::KeyringLocked,
            keyring::Error::PlatformFailure(_)
            | keyring::Error::BadEncoding(_)
            | keyring::Error::TooLong(_, _)
            | keyring::Error::Invalid(_, _)
            | keyring::Error::Ambiguous(_)
            | _ => Self::KeyringUnavailable,
        }
    }
}

impl From<serde_json::Error> for WishlistError {
    fn from(err: serde_json::Error) -> Self {
        tracing::debug!(error = %err, "json conversion failed");
        Self::Serialization
    }
}

impl From<mongodb::bson::ser::Error> for WishlistError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        tracing::debug!(error = %err, "bson encoding failed");
        Self::Serialization
    }
}

impl From<mongodb::bson::de::Error> for WishlistError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        tracing::debug!(error = %err, "bson decoding failed");
        Self::Serialization
    }
}

impl From<sqlx::Error> for WishlistError {
    fn from(err: sqlx::Error) -> Self {
        tracing::debug!(error = %err, "sql request failed");
        Self::RequestFailed
    }
}

impl From<mongodb::error::Error> for WishlistError {
    fn from(err: mongodb::error::Error) -> Self {
        tracing::debug!(error = %err, "mongo request failed");
        Self::RequestFailed
    }
}

#[cfg(test)]
mod tests {
    use super::WishlistError;

    #[test]
    fn refresh_failure_reports_stale_cache() {
        let err = WishlistError::RefreshFailed(Box::new(WishlistError::RequestFailed));
        assert!(err.is_stale_cache());
        assert!(!WishlistError::RequestFailed.is_stale_cache());
        assert_eq!(
            err.to_string(),
            "write succeeded but cache refresh failed: remote request failed"
        );
    }
}
