use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A file or folder in the remote tree.
#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub id: u64,
    pub name: String,
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub size: u64,
    pub content_type: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl File {
    pub fn is_folder(&self) -> bool {
        self.content_type.as_deref() == Some("application/x-directory")
    }
}

/// Contents of one folder.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderListing {
    pub files: Vec<File>,
    pub parent: Option<File>,
}

/// A fetch-to-cloud transfer job.
#[derive(Debug, Clone, Deserialize)]
pub struct Transfer {
    pub id: u64,
    pub name: Option<String>,
    pub status: TransferStatus,
    #[serde(default)]
    pub percent_done: u8,
    pub save_parent_id: Option<u64>,
    pub file_id: Option<u64>,
}

/// Server-side lifecycle of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    Queued,
    Downloading,
    Completed,
    Seeding,
    Error,
}

/// Account details and storage quota.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub username: String,
    pub mail: Option<String>,
    pub disk: DiskQuota,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiskQuota {
    pub avail: u64,
    pub used: u64,
    pub size: u64,
}
