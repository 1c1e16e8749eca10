use serde::Deserialize;

use super::client::Client;
use super::types::AccountInfo;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct AccountEnvelope {
    account: AccountInfo,
}

impl Client {
    /// Fetch the account profile and storage quota.
    pub async fn account_info(&self) -> Result<AccountInfo> {
        let envelope: AccountEnvelope = self.get("/account/info", &[]).await?;
        Ok(envelope.account)
    }
}
