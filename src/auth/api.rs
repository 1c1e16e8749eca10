use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use super::error::AuthError;
use super::state::{AccessToken, RefreshToken};

const DEFAULT_TOKEN_URL: &str = "https://api.stowage.cloud/v2/oauth/token";
const DEFAULT_DEVICE_CODE_URL: &str = "https://api.stowage.cloud/v2/oauth/device/code";
const DEFAULT_DEVICE_TOKEN_URL: &str = "https://api.stowage.cloud/v2/oauth/device/token";

/// Client id for the password/refresh grants at the token endpoint.
const OAUTH_CLIENT_ID: &str = "stowage-desktop";
/// The device pairing endpoints are keyed by their own client id.
const DEVICE_CLIENT_ID: &str = "stowage-settop";

/// TTL applied when a grant omits `expires_in`. Device-exchange tokens are
/// long-lived server-side; a short default just means the cascade revalidates
/// within the hour.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;
/// TTL applied when a device-code issuance omits `expires_in`.
const DEFAULT_DEVICE_CODE_TTL_SECS: i64 = 900;

/// HTTP surface of the remote auth service.
///
/// Two endpoint families: a form-encoded token endpoint (`grant_type` of
/// `password` or `refresh_token`) and a GET pair for device pairing (code
/// issuance and code-to-token exchange). Responses are JSON; a non-2xx status
/// or an `error` field in the payload denotes failure.
///
/// # Example
/// ```no_run
/// use stowage::auth::AuthApi;
///
/// let api = AuthApi::new().with_token_url("http://127.0.0.1:9000/oauth/token");
/// ```
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: reqwest::Client,
    token_url: String,
    device_code_url: String,
    device_token_url: String,
}

impl Default for AuthApi {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthApi {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            device_code_url: DEFAULT_DEVICE_CODE_URL.to_string(),
            device_token_url: DEFAULT_DEVICE_TOKEN_URL.to_string(),
        }
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }

    pub fn with_device_token_url(mut self, url: impl Into<String>) -> Self {
        self.device_token_url = url.into();
        self
    }

    pub(crate) async fn password_grant(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Grant, AuthError> {
        let resp = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "password"),
                ("client_id", OAUTH_CLIENT_ID),
                ("username", username),
                ("password", password),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        parse_grant(status, &body)
    }

    pub(crate) async fn refresh_grant(&self, refresh_token: &str) -> Result<Grant, AuthError> {
        let resp = self
            .client
            .post(&self.token_url)
            .header("Accept", "application/json")
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", OAUTH_CLIENT_ID),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        parse_grant(status, &body)
    }

    pub(crate) async fn issue_device_code(&self) -> Result<IssuedDeviceCode, AuthError> {
        let resp = self
            .client
            .get(&self.device_code_url)
            .header("Accept", "application/json")
            .query(&[("client_id", DEVICE_CLIENT_ID)])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        parse_device_code(status, &body)
    }

    pub(crate) async fn exchange_device_code(&self, device_code: &str) -> Result<Grant, AuthError> {
        let resp = self
            .client
            .get(&self.device_token_url)
            .header("Accept", "application/json")
            .query(&[
                ("client_id", DEVICE_CLIENT_ID),
                ("device_code", device_code),
            ])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        parse_device_grant(status, &body)
    }
}

/// Normalized successful token-endpoint payload.
#[derive(Debug, Clone)]
pub(crate) struct Grant {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
}

impl Grant {
    pub(crate) fn access(&self, now: DateTime<Utc>) -> AccessToken {
        AccessToken {
            token: self.access_token.clone(),
            expiry: now + Duration::seconds(self.expires_in),
        }
    }

    pub(crate) fn refresh(&self) -> Option<RefreshToken> {
        self.refresh_token
            .clone()
            .map(|token| RefreshToken { token })
    }
}

/// Normalized device-code issuance payload.
#[derive(Debug, Clone)]
pub(crate) struct IssuedDeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
    access_token: Option<String>,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    #[allow(dead_code)]
    token_type: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeviceCodeEnvelope {
    device_code: Option<String>,
    user_code: Option<String>,
    verification_uri: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
    error_description: Option<String>,
}

fn remote_error(
    status: StatusCode,
    error: Option<&str>,
    description: Option<&str>,
) -> AuthError {
    let message = description
        .or(error)
        .map(str::to_string)
        .unwrap_or_else(|| format!("auth request failed with status {status}"));
    AuthError::Remote(message)
}

fn parse_grant(status: StatusCode, body: &str) -> Result<Grant, AuthError> {
    let envelope: TokenEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(AuthError::Remote(format!(
                "auth request failed with status {status}"
            )));
        }
        Err(err) => return Err(AuthError::Serialization(err.to_string())),
    };
    if !status.is_success() || envelope.error.is_some() {
        return Err(remote_error(
            status,
            envelope.error.as_deref(),
            envelope.error_description.as_deref(),
        ));
    }
    let access_token = envelope.access_token.ok_or_else(|| {
        AuthError::InvalidResponse("token response missing access_token".to_string())
    })?;
    Ok(Grant {
        access_token,
        expires_in: envelope.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
        refresh_token: envelope.refresh_token,
    })
}

fn parse_device_grant(status: StatusCode, body: &str) -> Result<Grant, AuthError> {
    // The pairing exchange reports "not yet approved" through the error
    // field, on either status family.
    if let Ok(envelope) = serde_json::from_str::<TokenEnvelope>(body) {
        if envelope.error.as_deref() == Some("authorization_pending") {
            return Err(AuthError::AuthorizationPending);
        }
    }
    parse_grant(status, body)
}

fn parse_device_code(status: StatusCode, body: &str) -> Result<IssuedDeviceCode, AuthError> {
    let envelope: DeviceCodeEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !status.is_success() => {
            return Err(AuthError::Remote(format!(
                "auth request failed with status {status}"
            )));
        }
        Err(err) => return Err(AuthError::Serialization(err.to_string())),
    };
    if !status.is_success() || envelope.error.is_some() {
        return Err(remote_error(
            status,
            envelope.error.as_deref(),
            envelope.error_description.as_deref(),
        ));
    }
    let device_code = envelope.device_code.ok_or_else(|| {
        AuthError::InvalidResponse("device code response missing device_code".to_string())
    })?;
    let user_code = envelope.user_code.ok_or_else(|| {
        AuthError::InvalidResponse("device code response missing user_code".to_string())
    })?;
    Ok(IssuedDeviceCode {
        device_code,
        user_code,
        verification_uri: envelope.verification_uri,
        expires_in: envelope.expires_in.unwrap_or(DEFAULT_DEVICE_CODE_TTL_SECS),
    })
}
