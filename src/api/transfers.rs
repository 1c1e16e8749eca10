use serde::Deserialize;
use serde_json::json;

use super::client::Client;
use super::types::Transfer;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct TransferEnvelope {
    transfer: Transfer,
}

#[derive(Debug, Deserialize)]
struct TransferListEnvelope {
    transfers: Vec<Transfer>,
}

impl Client {
    /// Queue a fetch-to-cloud transfer of `url` into the folder `parent_id`.
    pub async fn add_transfer(&self, url: &str, parent_id: u64) -> Result<Transfer> {
        let envelope: TransferEnvelope = self
            .post(
                "/transfers/add",
                &json!({ "url": url, "save_parent_id": parent_id }),
            )
            .await?;
        Ok(envelope.transfer)
    }

    /// List the account's transfers.
    pub async fn list_transfers(&self) -> Result<Vec<Transfer>> {
        let envelope: TransferListEnvelope = self.get("/transfers/list", &[]).await?;
        Ok(envelope.transfers)
    }
}
