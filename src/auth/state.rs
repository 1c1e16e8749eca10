use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Short-lived bearer credential used to authorize resource API calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expiry: DateTime<Utc>,
}

impl AccessToken {
    /// Whether the token can still be presented at `now`.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.expiry
    }
}

/// Long-lived credential exchanged for new access tokens without a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub token: String,
}

/// Device-authorization pairing state.
///
/// `expiry` is present while the pairing awaits approval and is cleared on
/// the first successful exchange; an approved pairing stays valid until it is
/// revoked server-side. The `xbmc` name survives from the set-top clients the
/// flow was built for and matches the persisted field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevicePairing {
    pub device_code: String,
    pub user_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl DevicePairing {
    /// The code has been exchanged once; it no longer lapses.
    pub fn is_approved(&self) -> bool {
        self.expiry.is_none()
    }

    /// Awaiting approval and not yet lapsed at `now`.
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| now < expiry)
    }

    /// Approved, or still pending; either way worth an exchange attempt.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_approved() || self.is_pending(now)
    }
}

/// Cached plaintext login, stored only when the caller opts in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

/// The persisted aggregate of all credential material.
///
/// Every field is optional; absence is meaningful, not an error. The record
/// is loaded from a [`StateStore`](crate::auth::StateStore) once per manager
/// instance, cached in memory, and written back wholesale after every
/// mutation. Absent fields are omitted from the serialized object, so an
/// empty record round-trips as `{}`.
///
/// # Example
/// ```
/// use stowage::auth::AuthState;
///
/// let state: AuthState = serde_json::from_str("{}").unwrap();
/// assert!(state.access.is_none());
/// assert!(state.refresh.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<RefreshToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xbmc: Option<DevicePairing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,
}

impl AuthState {
    /// The cached access token, if it has not yet expired at `now`.
    pub fn valid_access(&self, now: DateTime<Utc>) -> Option<&AccessToken> {
        self.access.as_ref().filter(|access| access.is_valid(now))
    }
}
