// Encryption Service
// Encrypts stored credentials with AES-256-GCM and a machine-specific key

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::Rng;
use std::path::Path;
use zeroize::{Zeroize, Zeroizing};

const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

const MACHINE_KEY_FILE: &str = ".session_key";

// Prefix for identifying encrypted values
const ENCRYPTED_PREFIX: &str = "ENC::";

/// Encryption service for credentials at rest
pub struct Encryption;

impl Encryption {
    /// Get or create the machine-specific encryption key
    /// Returns a zeroizing key that will be securely erased from memory
    fn get_or_create_machine_key(data_dir: &Path) -> Result<Zeroizing<[u8; KEY_LEN]>, String> {
        let key_file = data_dir.join(MACHINE_KEY_FILE);

        if key_file.exists() {
            let mut key_data = std::fs::read(&key_file)
                .map_err(|e| format!("Failed to read machine key: {e}"))?;

            if key_data.len() != KEY_LEN {
                key_data.zeroize();
                return Err("Invalid machine key file".to_string());
            }

            Self::restrict_permissions(&key_file)?;

            let mut key = Zeroizing::new([0u8; KEY_LEN]);
            key.copy_from_slice(&key_data);
            key_data.zeroize();

            Ok(key)
        } else {
            std::fs::create_dir_all(data_dir)
                .map_err(|e| format!("Failed to create data directory: {e}"))?;

            let mut rng = rand::thread_rng();
            let key = Zeroizing::new(rng.gen::<[u8; KEY_LEN]>());

            std::fs::write(&key_file, *key)
                .map_err(|e| format!("Failed to save machine key: {e}"))?;
            Self::restrict_permissions(&key_file)?;

            log::info!("Created new machine key at {}", key_file.display());
            Ok(key)
        }
    }

    #[cfg(unix)]
    fn restrict_permissions(key_file: &Path) -> Result<(), String> {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(key_file, perms)
            .map_err(|e| format!("Failed to set key file permissions: {e}"))
    }

    #[cfg(not(unix))]
    fn restrict_permissions(_key_file: &Path) -> Result<(), String> {
        Ok(())
    }

    /// Encrypt a token or password for storage
    /// Returns base64-encoded nonce + ciphertext with the ENC:: prefix
    pub fn encrypt_token(token: &str, data_dir: &Path) -> Result<String, String> {
        // Don't encrypt empty or already encrypted values
        if token.is_empty() || token.starts_with(ENCRYPTED_PREFIX) {
            return Ok(token.to_string());
        }

        let machine_key = Self::get_or_create_machine_key(data_dir)?;

        let mut rng = rand::thread_rng();
        let nonce_bytes: [u8; NONCE_LEN] = rng.gen();

        let cipher = Aes256Gcm::new_from_slice(&*machine_key)
            .map_err(|e| format!("Failed to create cipher: {e}"))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher.encrypt(nonce, token.as_bytes())
            .map_err(|e| format!("Token encryption failed: {e}"))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        Ok(format!("{}{}", ENCRYPTED_PREFIX, BASE64.encode(combined)))
    }

    /// Decrypt a stored token; values without the prefix are returned as-is
    pub fn decrypt_token(encrypted: &str, data_dir: &Path) -> Result<String, String> {
        let Some(encoded) = encrypted.strip_prefix(ENCRYPTED_PREFIX) else {
            return Ok(encrypted.to_string());
        };

        let machine_key = Self::get_or_create_machine_key(data_dir)?;

        let mut combined = BASE64.decode(encoded)
            .map_err(|e| format!("Failed to decode encrypted token: {e}"))?;

        if combined.len() < NONCE_LEN {
            combined.zeroize();
            return Err("Invalid encrypted token".to_string());
        }

        let nonce_bytes = &combined[..NONCE_LEN];
        let ciphertext = &combined[NONCE_LEN..];

        let cipher = Aes256Gcm::new_from_slice(&*machine_key)
            .map_err(|e| format!("Failed to create cipher: {e}"))?;
        let nonce = Nonce::from_slice(nonce_bytes);

        let mut plaintext = cipher.decrypt(nonce, ciphertext)
            .map_err(|e| format!("Token decryption failed: {e}"))?;

        let result = String::from_utf8(plaintext.clone())
            .map_err(|e| format!("Invalid UTF-8 in decrypted token: {e}"));

        // Zeroize sensitive buffers
        plaintext.zeroize();
        combined.zeroize();

        result
    }

    /// Check if a value is encrypted (has ENC:: prefix)
    pub fn is_encrypted(value: &str) -> bool {
        value.starts_with(ENCRYPTED_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_token_round_trip() {
        let temp = TempDir::new().unwrap();

        let encrypted = Encryption::encrypt_token("s3cret-token", temp.path()).unwrap();
        assert!(Encryption::is_encrypted(&encrypted));
        assert!(!encrypted.contains("s3cret-token"));

        let decrypted = Encryption::decrypt_token(&encrypted, temp.path()).unwrap();
        assert_eq!(decrypted, "s3cret-token");
    }

    #[test]
    fn test_empty_and_plain_values_pass_through() {
        let temp = TempDir::new().unwrap();

        assert_eq!(Encryption::encrypt_token("", temp.path()).unwrap(), "");
        assert_eq!(Encryption::decrypt_token("plain", temp.path()).unwrap(), "plain");
        assert!(!temp.path().join(MACHINE_KEY_FILE).exists());
    }

    #[test]
    fn test_other_machine_key_fails() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        let encrypted = Encryption::encrypt_token("password", first.path()).unwrap();
        assert!(Encryption::decrypt_token(&encrypted, second.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_machine_key_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let temp = TempDir::new().unwrap();

        Encryption::encrypt_token("x", temp.path()).unwrap();
        let mode = std::fs::metadata(temp.path().join(MACHINE_KEY_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
