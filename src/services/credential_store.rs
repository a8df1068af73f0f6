// Credential Store
// Single shared slot for the session credentials, in memory or on disk

use crate::models::Credentials;
use crate::services::encryption::Encryption;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;

/// Fields of session.json that are encrypted at rest
const SENSITIVE_FIELDS: &[&str] = &["authToken", "authPassword"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stored data is malformed: {0}")]
    Format(#[from] serde_json::Error),
    #[error("Encryption failed: {0}")]
    Encryption(String),
    #[error("Store lock poisoned")]
    Poisoned,
}

/// Persistent credential slot.
///
/// Writes are last-writer-wins; concurrent logins are not coordinated.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Credentials, StoreError>;
    fn save(&self, credentials: &Credentials) -> Result<(), StoreError>;
    /// Remove all three slots
    fn clear(&self) -> Result<(), StoreError>;
}

/// Process-local store; nothing survives a restart
#[derive(Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Credentials>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self { slot: RwLock::new(credentials) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Credentials, StoreError> {
        self.slot.read().map(|c| c.clone()).map_err(|_| StoreError::Poisoned)
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let mut slot = self.slot.write().map_err(|_| StoreError::Poisoned)?;
        *slot = credentials.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.save(&Credentials::default())
    }
}

/// Store backed by `<data_dir>/session.json` with token and password encrypted
pub struct FileCredentialStore {
    session_path: PathBuf,
    data_dir: PathBuf,
    cache: RwLock<Option<Credentials>>,
}

impl FileCredentialStore {
    pub fn new(data_dir: PathBuf) -> Self {
        let session_path = data_dir.join("session.json");
        Self {
            session_path,
            data_dir,
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.session_path
    }

    fn read_from_disk(&self) -> Result<Credentials, StoreError> {
        if !self.session_path.exists() {
            return Ok(Credentials::default());
        }

        let content = std::fs::read_to_string(&self.session_path)?;
        let mut value: Value = serde_json::from_str(&content)?;
        self.decrypt_sensitive_fields(&mut value)?;

        Ok(serde_json::from_value(value)?)
    }

    fn write_to_disk(&self, credentials: &Credentials) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.data_dir)?;

        let mut value = serde_json::to_value(credentials)?;
        self.encrypt_sensitive_fields(&mut value)?;

        let content = serde_json::to_string_pretty(&value)?;
        std::fs::write(&self.session_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.session_path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn decrypt_sensitive_fields(&self, value: &mut Value) -> Result<(), StoreError> {
        if let Value::Object(map) = value {
            for &field in SENSITIVE_FIELDS {
                if let Some(Value::String(val)) = map.get(field) {
                    if Encryption::is_encrypted(val) {
                        let plaintext = Encryption::decrypt_token(val, &self.data_dir)
                            .map_err(StoreError::Encryption)?;
                        map.insert(field.to_string(), Value::String(plaintext));
                    }
                }
            }
        }
        Ok(())
    }

    fn encrypt_sensitive_fields(&self, value: &mut Value) -> Result<(), StoreError> {
        if let Value::Object(map) = value {
            for &field in SENSITIVE_FIELDS {
                if let Some(Value::String(val)) = map.get(field) {
                    if !val.is_empty() && !Encryption::is_encrypted(val) {
                        let encrypted = Encryption::encrypt_token(val, &self.data_dir)
                            .map_err(StoreError::Encryption)?;
                        map.insert(field.to_string(), Value::String(encrypted));
                    }
                }
            }
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Credentials, StoreError> {
        if let Ok(cache) = self.cache.read() {
            if let Some(ref credentials) = *cache {
                return Ok(credentials.clone());
            }
        }

        let credentials = match self.read_from_disk() {
            Ok(credentials) => credentials,
            Err(e) => {
                // An unreadable session is treated as logged out
                log::warn!("Discarding unreadable session file: {e}");
                Credentials::default()
            }
        };

        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(credentials.clone());
        }

        Ok(credentials)
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        self.write_to_disk(credentials)?;

        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(credentials.clone());
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(Credentials::default());
        }

        if self.session_path.exists() {
            std::fs::remove_file(&self.session_path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_clear() {
        let store = MemoryCredentialStore::with_credentials(Credentials::basic("admin", "pw"));
        assert_eq!(store.load().unwrap().auth_username.as_deref(), Some("admin"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_encrypts_secrets() {
        let temp = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp.path().to_path_buf());

        let mut credentials = Credentials::basic("admin", "hunter2");
        credentials.auth_token = Some("jwt-token".to_string());
        store.save(&credentials).unwrap();

        let on_disk = std::fs::read_to_string(store.path()).unwrap();
        assert!(on_disk.contains("admin"));
        assert!(!on_disk.contains("hunter2"));
        assert!(!on_disk.contains("jwt-token"));
        assert!(on_disk.contains("ENC::"));

        // Fresh instance reads through the encryption layer
        let reopened = FileCredentialStore::new(temp.path().to_path_buf());
        assert_eq!(reopened.load().unwrap(), credentials);
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let temp = TempDir::new().unwrap();
        let store = FileCredentialStore::new(temp.path().to_path_buf());

        store.save(&Credentials::basic("admin", "pw")).unwrap();
        assert!(store.path().exists());

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_session_is_logged_out() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("session.json"), "{ not json").unwrap();

        let store = FileCredentialStore::new(temp.path().to_path_buf());
        assert!(store.load().unwrap().is_empty());
    }
}
