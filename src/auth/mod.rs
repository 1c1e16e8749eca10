//! Token lifecycle management and credential persistence.

pub mod api;
pub mod error;
pub mod manager;
pub mod renew;
pub mod state;
pub mod store;

pub use api::AuthApi;
pub use error::AuthError;
pub use manager::{Auth, DeviceCode, TokenPair};
pub use renew::{DevicePairingRenewal, PasswordGrantRenewal, RefreshGrantRenewal, RenewalStrategy};
pub use state::{AccessToken, AuthState, Credential, DevicePairing, RefreshToken};
pub use store::{FileStateStore, MemoryStateStore, StateStore};
