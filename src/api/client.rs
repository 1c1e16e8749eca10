use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::Auth;
use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.stowage.cloud/v2";

/// Authenticated client for the Stowage resource API.
///
/// Every call asks the token lifecycle manager for a current access token and
/// attaches it as a bearer credential, so renewal is transparent to callers.
/// The wrappers themselves are mechanical request/response mapping; all
/// credential decisions live in [`Auth`].
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use stowage::api::Client;
/// use stowage::auth::{Auth, MemoryStateStore};
///
/// # async fn example() -> stowage::error::Result<()> {
/// let auth = Arc::new(Auth::new(Arc::new(MemoryStateStore::new())));
/// auth.login_oauth(Some("alice"), Some("hunter2"), false).await?;
/// let client = Client::new(auth);
/// let root = client.list_folder(0).await?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    auth: Arc<Auth>,
}

impl Client {
    pub fn new(auth: Arc<Auth>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            auth,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let token = self.auth.get_access_token().await?;
        let resp = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await?;
        Self::parse(resp).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let token = self.auth.get_access_token().await?;
        let resp = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;
        Self::parse(resp).await
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::api(status.as_u16(), message));
        }
        Ok(resp.json().await?)
    }
}
