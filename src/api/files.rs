use serde::Deserialize;
use serde_json::json;

use super::client::Client;
use super::types::{File, FolderListing};
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct FileEnvelope {
    file: File,
}

impl Client {
    /// List the contents of a folder; folder id `0` is the root.
    pub async fn list_folder(&self, parent_id: u64) -> Result<FolderListing> {
        self.get(
            "/files/list",
            &[("parent_id", parent_id.to_string())],
        )
        .await
    }

    /// Fetch a single file or folder by id.
    pub async fn get_file(&self, file_id: u64) -> Result<File> {
        let envelope: FileEnvelope = self
            .get(&format!("/files/{file_id}"), &[])
            .await?;
        Ok(envelope.file)
    }

    /// Create a folder under `parent_id`.
    pub async fn create_folder(&self, parent_id: u64, name: &str) -> Result<File> {
        let envelope: FileEnvelope = self
            .post(
                "/files/create-folder",
                &json!({ "parent_id": parent_id, "name": name }),
            )
            .await?;
        Ok(envelope.file)
    }

    /// Rename a file or folder.
    pub async fn rename(&self, file_id: u64, name: &str) -> Result<File> {
        let envelope: FileEnvelope = self
            .post("/files/rename", &json!({ "file_id": file_id, "name": name }))
            .await?;
        Ok(envelope.file)
    }

    /// Delete files and folders by id.
    pub async fn delete(&self, file_ids: &[u64]) -> Result<()> {
        let _: serde_json::Value = self
            .post("/files/delete", &json!({ "file_ids": file_ids }))
            .await?;
        Ok(())
    }
}
