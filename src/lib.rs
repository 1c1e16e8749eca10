//! Stowage — Rust client for the Stowage remote storage service.
//!
//! The crate centers on [`auth::Auth`], a token lifecycle manager that turns
//! whatever credential material is stored (username/password, refresh token,
//! device pairing, or a still-valid access token) into a current access token
//! on demand, renewing through whichever mechanism is available and
//! persisting what it obtains. The resource wrappers in [`api`] sit on top
//! and only ever call [`auth::Auth::get_access_token`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use stowage::api::Client;
//! use stowage::auth::{Auth, FileStateStore};
//!
//! # async fn example() -> stowage::error::Result<()> {
//! let store = Arc::new(FileStateStore::new_default());
//! let auth = Arc::new(Auth::new(store));
//! auth.login_oauth(Some("alice"), Some("hunter2"), true).await?;
//!
//! let client = Client::new(auth);
//! let root = client.list_folder(0).await?;
//! println!("{} entries in the root folder", root.files.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod error;
