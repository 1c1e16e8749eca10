use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::AuthError;
use super::state::AuthState;

/// Storage abstraction for the persisted credential record.
///
/// The contract is exactly two operations: both must be idempotent and safe
/// to call with partially-populated records. The manager treats the store as
/// its single durability boundary and never reads it again after the first
/// load.
pub trait StateStore: Send + Sync {
    /// Returns the stored record, or the empty record if nothing is stored.
    fn load(&self) -> Result<AuthState, AuthError>;
    /// Overwrites the stored record wholesale.
    fn save(&self, state: &AuthState) -> Result<(), AuthError>;
}

/// In-memory store; state lives only as long as the process.
///
/// Pairing a manager with this store keeps every credential ephemeral.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<AuthState>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<AuthState, AuthError> {
        match self.state.lock() {
            Ok(guard) => Ok(guard.clone()),
            Err(_) => Err(AuthError::Io("state lock poisoned".to_string())),
        }
    }

    fn save(&self, state: &AuthState) -> Result<(), AuthError> {
        match self.state.lock() {
            Ok(mut guard) => {
                *guard = state.clone();
                Ok(())
            }
            Err(_) => Err(AuthError::Io("state lock poisoned".to_string())),
        }
    }
}

/// File-backed store holding one JSON object.
///
/// The file is created on first save and replaced wholesale on every save via
/// a temp-file rename, so a crash mid-write never truncates the record.
///
/// # Example
/// ```no_run
/// use stowage::auth::{AuthState, FileStateStore, StateStore};
///
/// let store = FileStateStore::new_default();
/// store.save(&AuthState::default())?;
/// # Ok::<(), stowage::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location (`~/.stowage/auth.json`).
    pub fn new_default() -> Self {
        Self {
            path: default_state_path(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> Result<AuthState, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(AuthState::default())
            }
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, state: &AuthState) -> Result<(), AuthError> {
        let serialized = serde_json::to_vec_pretty(state)?;
        atomic_write(&self.path, &serialized)
    }
}

fn default_state_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".stowage"))
        .unwrap_or_else(|| PathBuf::from(".stowage"))
        .join("auth.json")
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| AuthError::Io(format!("state path {} has no file name", path.display())))?;

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_name = format!(
        ".{}.tmp-{}-{nonce}",
        file_name.to_string_lossy(),
        std::process::id()
    );
    let temp_path = path.with_file_name(temp_name);

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(AuthError::Io(err.to_string()));
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(AuthError::Io(err.to_string()));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
