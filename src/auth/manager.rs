use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, MutexGuard};

use super::api::AuthApi;
use super::error::AuthError;
use super::renew::{DevicePairingRenewal, RefreshGrantRenewal, RenewalStrategy, CASCADE};
use super::state::{AccessToken, AuthState, Credential, DevicePairing, RefreshToken};
use super::store::StateStore;

/// Access and refresh tokens returned by a successful password login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: AccessToken,
    pub refresh: Option<RefreshToken>,
}

/// Pairing details returned by [`Auth::obtain_device_code`], for display.
///
/// The user enters `user_code` on the approval surface; `device_code` is what
/// this client later exchanges and is also persisted.
#[derive(Debug, Clone)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Token lifecycle manager.
///
/// Owns the cached [`AuthState`] and is its sole mutator. The record is
/// loaded from the injected [`StateStore`] on first use, cached for the
/// manager's lifetime, and written back after every mutation; the store is
/// never re-read, so concurrent external writes to it are not observed.
///
/// Resource-API callers use only [`Auth::get_access_token`]; the other
/// methods exist for explicit auth-flow initiation. Overlapping callers are
/// serialized on the state mutex, so two renewals can never interleave their
/// writes.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use stowage::auth::{Auth, FileStateStore};
///
/// # async fn example() -> Result<(), stowage::auth::AuthError> {
/// let auth = Auth::new(Arc::new(FileStateStore::new_default()));
/// auth.login_oauth(Some("alice"), Some("hunter2"), false).await?;
/// let bearer = auth.get_access_token().await?;
/// # Ok(())
/// # }
/// ```
pub struct Auth {
    api: AuthApi,
    store: Arc<dyn StateStore>,
    state: Mutex<Option<AuthState>>,
}

impl Auth {
    pub fn new(store: Arc<dyn StateStore>) -> Self {
        Self::with_api(AuthApi::new(), store)
    }

    pub fn with_api(api: AuthApi, store: Arc<dyn StateStore>) -> Self {
        Self {
            api,
            store,
            state: Mutex::new(None),
        }
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.api = self.api.with_token_url(url);
        self
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.api = self.api.with_device_code_url(url);
        self
    }

    pub fn with_device_token_url(mut self, url: impl Into<String>) -> Self {
        self.api = self.api.with_device_token_url(url);
        self
    }

    /// Lock the cached state, loading it from the store on first use.
    async fn state(&self) -> Result<MutexGuard<'_, Option<AuthState>>, AuthError> {
        let mut guard = self.state.lock().await;
        if guard.is_none() {
            *guard = Some(self.store.load()?);
        }
        Ok(guard)
    }

    /// Perform a password-grant login.
    ///
    /// A cached [`Credential`] takes precedence; `username`/`password` are
    /// the fallback. Refused with [`AuthError::TokenStillValid`] while a
    /// cached access token has not expired, so an explicit login cannot
    /// invalidate a live session. On success the new access and refresh
    /// tokens are stored and persisted; the plaintext credential is stored
    /// only when `save_credential` is set.
    pub async fn login_oauth(
        &self,
        username: Option<&str>,
        password: Option<&str>,
        save_credential: bool,
    ) -> Result<TokenPair, AuthError> {
        let mut guard = self.state().await?;
        let state = guard.get_or_insert_with(AuthState::default);

        if state.valid_access(Utc::now()).is_some() {
            return Err(AuthError::TokenStillValid);
        }

        let (username, password) = match &state.credential {
            Some(credential) => (credential.username.clone(), credential.password.clone()),
            None => match (username, password) {
                (Some(username), Some(password)) => (username.to_string(), password.to_string()),
                _ => return Err(AuthError::MissingCredential),
            },
        };

        let grant = self.api.password_grant(&username, &password).await?;
        let access = grant.access(Utc::now());
        let refresh = grant.refresh();
        state.access = Some(access.clone());
        if let Some(refresh) = &refresh {
            state.refresh = Some(refresh.clone());
        }
        if save_credential {
            state.credential = Some(Credential { username, password });
        }
        self.store.save(state)?;
        tracing::debug!("password grant login succeeded");
        Ok(TokenPair { access, refresh })
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Replaces `access` wholesale; the refresh credential is not altered.
    pub async fn refresh_token_oauth(&self) -> Result<AccessToken, AuthError> {
        let mut guard = self.state().await?;
        let state = guard.get_or_insert_with(AuthState::default);
        let access = RefreshGrantRenewal.attempt(&self.api, state).await?;
        self.store.save(state)?;
        Ok(access)
    }

    /// Request a new device/user code pair and persist it as pending.
    ///
    /// Refused while an unexpired pending code exists (it must be approved or
    /// allowed to lapse first) and once a pairing has been approved.
    pub async fn obtain_device_code(&self) -> Result<DeviceCode, AuthError> {
        let mut guard = self.state().await?;
        let state = guard.get_or_insert_with(AuthState::default);
        let now = Utc::now();

        match &state.xbmc {
            Some(pairing) if pairing.is_approved() => {
                return Err(AuthError::DeviceAlreadyRegistered)
            }
            Some(pairing) if pairing.is_pending(now) => return Err(AuthError::DeviceCodePending),
            _ => {}
        }

        let issued = self.api.issue_device_code().await?;
        let expires_at = now + Duration::seconds(issued.expires_in);
        state.xbmc = Some(DevicePairing {
            device_code: issued.device_code.clone(),
            user_code: issued.user_code.clone(),
            expiry: Some(expires_at),
        });
        self.store.save(state)?;
        Ok(DeviceCode {
            device_code: issued.device_code,
            user_code: issued.user_code,
            verification_uri: issued.verification_uri,
            expires_at,
        })
    }

    /// Exchange the stored device code for an access token.
    ///
    /// While the user has not approved the pairing yet this fails with
    /// [`AuthError::AuthorizationPending`] and leaves state unchanged. The
    /// first successful exchange marks the pairing approved for good.
    pub async fn refresh_token_xbmc(&self) -> Result<AccessToken, AuthError> {
        let mut guard = self.state().await?;
        let state = guard.get_or_insert_with(AuthState::default);
        let access = DevicePairingRenewal.attempt(&self.api, state).await?;
        self.store.save(state)?;
        Ok(access)
    }

    /// Produce a currently-valid access token, renewing if necessary.
    ///
    /// Strictly ordered, short-circuiting on the first success:
    ///
    /// 1. a cached unexpired access token is returned with zero network
    ///    calls;
    /// 2. an approved or pending device pairing is exchanged;
    /// 3. the refresh token is exchanged;
    /// 4. a cached credential is replayed through a password login.
    ///
    /// Each strategy's failure is logged and swallowed so the next one still
    /// runs; only the terminal [`AuthError::Unauthenticated`] surfaces.
    pub async fn get_access_token(&self) -> Result<String, AuthError> {
        let mut guard = self.state().await?;
        let state = guard.get_or_insert_with(AuthState::default);
        let now = Utc::now();

        if let Some(access) = state.valid_access(now) {
            return Ok(access.token.clone());
        }

        for strategy in CASCADE {
            if !strategy.eligible(state, now) {
                continue;
            }
            match strategy.attempt(&self.api, state).await {
                Ok(access) => {
                    self.store.save(state)?;
                    tracing::debug!(strategy = strategy.name(), "token renewed");
                    return Ok(access.token);
                }
                Err(err) => {
                    tracing::warn!(
                        strategy = strategy.name(),
                        error = %err,
                        "token renewal attempt failed"
                    );
                }
            }
        }

        Err(AuthError::Unauthenticated)
    }
}
