//! Thin wrappers over the Stowage resource API.
//!
//! Mechanical request/response mapping over one authenticated call primitive;
//! every method obtains its bearer credential from
//! [`Auth::get_access_token`](crate::auth::Auth::get_access_token).

mod account;
pub mod client;
mod files;
mod transfers;
pub mod types;

pub use client::Client;
pub use types::{AccountInfo, DiskQuota, File, FolderListing, Transfer, TransferStatus};
