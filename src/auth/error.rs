use thiserror::Error;

/// Errors raised by the token lifecycle manager and its persistence layer.
///
/// The flow-specific variants surface to direct callers of the corresponding
/// method; inside the [`get_access_token`](crate::auth::Auth::get_access_token)
/// cascade they are swallowed and logged so a later renewal mechanism still
/// gets a chance. Only [`AuthError::Unauthenticated`] is terminal.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No username/password available")]
    MissingCredential,
    #[error("Access token is still valid")]
    TokenStillValid,
    #[error("No refresh token stored")]
    NoRefreshToken,
    #[error("A device code is already awaiting approval")]
    DeviceCodePending,
    #[error("Device is already registered")]
    DeviceAlreadyRegistered,
    #[error("No device code stored")]
    NoDeviceCode,
    #[error("Authorization pending")]
    AuthorizationPending,
    #[error("Remote auth error: {0}")]
    Remote(String),
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
