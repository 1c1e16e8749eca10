use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::api::AuthApi;
use super::error::AuthError;
use super::state::{AccessToken, AuthState};

/// A single way of turning stored credential material into a fresh access
/// token.
///
/// [`Auth::get_access_token`](crate::auth::Auth::get_access_token) walks the
/// strategies in cascade order, cheapest first. A failing `attempt` must
/// leave `state` untouched so the next strategy still sees intact
/// credentials; state is mutated only on success.
#[async_trait]
pub trait RenewalStrategy: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Whether the stored material gives this strategy anything to work with.
    fn eligible(&self, state: &AuthState, now: DateTime<Utc>) -> bool;

    /// Attempt the renewal, storing the new access token in `state` on
    /// success.
    async fn attempt(
        &self,
        api: &AuthApi,
        state: &mut AuthState,
    ) -> Result<AccessToken, AuthError>;
}

/// Exchanges a stored device pairing for an access token.
///
/// A pairing is attempted while approved or still pending; a pending pairing
/// that the user just approved on the other surface succeeds here, so the
/// exchange is worth the round trip on every call. The first success clears
/// the pairing expiry, marking it approved for good.
pub struct DevicePairingRenewal;

#[async_trait]
impl RenewalStrategy for DevicePairingRenewal {
    fn name(&self) -> &'static str {
        "device-pairing"
    }

    fn eligible(&self, state: &AuthState, now: DateTime<Utc>) -> bool {
        state.xbmc.as_ref().is_some_and(|pairing| pairing.is_usable(now))
    }

    async fn attempt(
        &self,
        api: &AuthApi,
        state: &mut AuthState,
    ) -> Result<AccessToken, AuthError> {
        let device_code = state
            .xbmc
            .as_ref()
            .ok_or(AuthError::NoDeviceCode)?
            .device_code
            .clone();
        let grant = api.exchange_device_code(&device_code).await?;
        let access = grant.access(Utc::now());
        if let Some(pairing) = state.xbmc.as_mut() {
            pairing.expiry = None;
        }
        state.access = Some(access.clone());
        Ok(access)
    }
}

/// Exchanges the long-lived refresh token for a new access token.
pub struct RefreshGrantRenewal;

#[async_trait]
impl RenewalStrategy for RefreshGrantRenewal {
    fn name(&self) -> &'static str {
        "refresh-grant"
    }

    fn eligible(&self, state: &AuthState, _now: DateTime<Utc>) -> bool {
        state.refresh.is_some()
    }

    async fn attempt(
        &self,
        api: &AuthApi,
        state: &mut AuthState,
    ) -> Result<AccessToken, AuthError> {
        let refresh_token = state
            .refresh
            .as_ref()
            .ok_or(AuthError::NoRefreshToken)?
            .token
            .clone();
        let grant = api.refresh_grant(&refresh_token).await?;
        let access = grant.access(Utc::now());
        // The refresh credential itself is never rotated here.
        state.access = Some(access.clone());
        Ok(access)
    }
}

/// Replays a cached username/password login.
pub struct PasswordGrantRenewal;

#[async_trait]
impl RenewalStrategy for PasswordGrantRenewal {
    fn name(&self) -> &'static str {
        "password-grant"
    }

    fn eligible(&self, state: &AuthState, _now: DateTime<Utc>) -> bool {
        state.credential.is_some()
    }

    async fn attempt(
        &self,
        api: &AuthApi,
        state: &mut AuthState,
    ) -> Result<AccessToken, AuthError> {
        let credential = state
            .credential
            .clone()
            .ok_or(AuthError::MissingCredential)?;
        let grant = api
            .password_grant(&credential.username, &credential.password)
            .await?;
        let access = grant.access(Utc::now());
        state.access = Some(access.clone());
        if let Some(refresh) = grant.refresh() {
            state.refresh = Some(refresh);
        }
        Ok(access)
    }
}

/// Cascade order: the pairing exchange costs one cheap round trip, the
/// refresh grant is the common path, and a full password login comes last.
pub(crate) static CASCADE: [&(dyn RenewalStrategy); 3] = [
    &DevicePairingRenewal,
    &RefreshGrantRenewal,
    &PasswordGrantRenewal,
];
