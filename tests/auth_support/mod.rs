#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use stowage::auth::{
    AccessToken, Auth, AuthError, AuthState, Credential, DevicePairing, RefreshToken, StateStore,
};
use wiremock::MockServer;

/// In-memory store that counts saves and exposes the last persisted record.
#[derive(Default)]
pub struct RecordingStateStore {
    state: Mutex<AuthState>,
    saves: AtomicUsize,
}

impl RecordingStateStore {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seeded(state: AuthState) -> Arc<Self> {
        let store = Self::default();
        *store.state.lock().expect("store lock poisoned") = state;
        Arc::new(store)
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.lock().expect("store lock poisoned").clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl StateStore for RecordingStateStore {
    fn load(&self) -> Result<AuthState, AuthError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &AuthState) -> Result<(), AuthError> {
        *self.state.lock().expect("store lock poisoned") = state.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A manager whose endpoints all point at the mock server.
pub fn auth_against(server: &MockServer, store: Arc<RecordingStateStore>) -> Auth {
    Auth::new(store)
        .with_token_url(format!("{}/oauth/token", server.uri()))
        .with_device_code_url(format!("{}/oauth/device/code", server.uri()))
        .with_device_token_url(format!("{}/oauth/device/token", server.uri()))
}

pub fn valid_access(token: &str) -> AccessToken {
    AccessToken {
        token: token.to_string(),
        expiry: Utc::now() + Duration::hours(1),
    }
}

pub fn expired_access(token: &str) -> AccessToken {
    AccessToken {
        token: token.to_string(),
        expiry: Utc::now() - Duration::hours(1),
    }
}

pub fn refresh(token: &str) -> RefreshToken {
    RefreshToken {
        token: token.to_string(),
    }
}

pub fn credential(username: &str, password: &str) -> Credential {
    Credential {
        username: username.to_string(),
        password: password.to_string(),
    }
}

pub fn pending_pairing(device_code: &str) -> DevicePairing {
    DevicePairing {
        device_code: device_code.to_string(),
        user_code: "ABCD-1234".to_string(),
        expiry: Some(Utc::now() + Duration::minutes(10)),
    }
}

pub fn lapsed_pairing(device_code: &str) -> DevicePairing {
    DevicePairing {
        device_code: device_code.to_string(),
        user_code: "ABCD-1234".to_string(),
        expiry: Some(Utc::now() - Duration::minutes(10)),
    }
}

pub fn approved_pairing(device_code: &str) -> DevicePairing {
    DevicePairing {
        device_code: device_code.to_string(),
        user_code: "ABCD-1234".to_string(),
        expiry: None,
    }
}
