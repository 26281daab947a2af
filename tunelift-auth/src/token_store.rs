use crate::credential::Credential;
use crate::error::AuthError;
use std::fs;
use std::path::PathBuf;

/// Durable storage for the current credential triple.
///
/// The triple lives in a single JSON document so the three values are always
/// saved and cleared together, never individually.
#[derive(Debug, Clone)]
pub struct TokenStore {
    token_path: PathBuf,
}

impl TokenStore {
    pub fn new() -> Result<Self, AuthError> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| AuthError::Storage("Could not find cache directory".to_string()))?
            .join("tunelift");

        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).map_err(|e| {
                AuthError::Storage(format!("Failed to create cache directory: {}", e))
            })?;
        }

        Ok(Self {
            token_path: cache_dir.join("token.json"),
        })
    }

    /// Store rooted at an explicit file path, used by tests.
    pub fn at(token_path: PathBuf) -> Self {
        Self { token_path }
    }

    /// Persist a credential wholesale. An empty access token or a missing
    /// expiry is rejected as `MalformedCredential` and the prior document is
    /// left untouched.
    pub fn save(&self, credential: &Credential) -> Result<(), AuthError> {
        if credential.access_token.is_empty() || credential.expires_at.is_none() {
            return Err(AuthError::MalformedCredential);
        }

        let json = serde_json::to_string_pretty(credential)?;

        // Write a sibling temp file and rename it into place so a concurrent
        // load never observes a half-written credential.
        let tmp_path = self.token_path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .map_err(|e| AuthError::Storage(format!("Failed to save token: {}", e)))?;

        // Set permissions to 0600 (read/write for owner only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&tmp_path)
                .map_err(|e| {
                    AuthError::Storage(format!("Failed to get file permissions: {}", e))
                })?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&tmp_path, perms).map_err(|e| {
                AuthError::Storage(format!("Failed to set file permissions: {}", e))
            })?;
        }

        fs::rename(&tmp_path, &self.token_path)
            .map_err(|e| AuthError::Storage(format!("Failed to save token: {}", e)))?;

        Ok(())
    }

    pub fn load(&self) -> Result<Option<Credential>, AuthError> {
        if !self.token_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.token_path)
            .map_err(|e| AuthError::Storage(format!("Failed to read token: {}", e)))?;

        let credential: Credential = serde_json::from_str(&json)?;
        Ok(Some(credential))
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        if self.token_path.exists() {
            fs::remove_file(&self.token_path)
                .map_err(|e| AuthError::Storage(format!("Failed to delete token: {}", e)))?;
        }
        Ok(())
    }
}
