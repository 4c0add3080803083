//! Persisted login session.
//!
//! The session file lives at `~/.otp-gateway/session.json`. When a session-signing
//! secret is configured, the file carries a SHA3-256 tag over `secret || payload`
//! and is rejected if the tag does not match.

use crate::auth::SessionContext;
use crate::gateway::types::UserProfile;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::{fs, path::Path, path::PathBuf};

const CONFIG_DIR: &str = ".otp-gateway";
const SESSION_FILE: &str = "session.json";
const LOG_FILE: &str = "console.log";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend the session was issued by.
    pub api_url: String,
    pub token: String,
    pub user: UserProfile,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// The fields covered by the signature, in a fixed order.
#[derive(Serialize)]
struct SignedFields<'a> {
    api_url: &'a str,
    token: &'a str,
    user: &'a UserProfile,
}

impl Config {
    pub fn new(api_url: String, session: SessionContext) -> Self {
        Config {
            api_url,
            token: session.token,
            user: session.user,
            signature: None,
        }
    }

    pub fn session(&self) -> SessionContext {
        SessionContext::new(self.token.clone(), self.user.clone())
    }

    fn compute_signature(&self, secret: &str) -> Result<String, std::io::Error> {
        let payload = serde_json::to_vec(&SignedFields {
            api_url: &self.api_url,
            token: &self.token,
            user: &self.user,
        })
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut hasher = Sha3_256::new();
        hasher.update(secret.as_bytes());
        hasher.update(&payload);
        Ok(STANDARD.encode(hasher.finalize()))
    }

    /// Stamps the config with a tag derived from `secret`.
    pub fn sign(mut self, secret: &str) -> Result<Self, std::io::Error> {
        self.signature = Some(self.compute_signature(secret)?);
        Ok(self)
    }

    /// Checks the stored tag against `secret`. Unsigned configs never verify.
    pub fn verify(&self, secret: &str) -> bool {
        match (&self.signature, self.compute_signature(secret)) {
            (Some(stored), Ok(expected)) => stored == &expected,
            _ => false,
        }
    }

    /// Loads configuration from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: Config = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    /// On unix the file is readable by its owner only, since it holds the bearer token.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Removes the session file. A missing file is not an error.
    pub fn clear_session(path: &Path) -> Result<(), std::io::Error> {
        match fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

fn config_dir() -> Result<PathBuf, std::io::Error> {
    let home = home::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        )
    })?;
    Ok(home.join(CONFIG_DIR))
}

/// Path of the persisted session file.
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    Ok(config_dir()?.join(SESSION_FILE))
}

/// Path of the diagnostics log written while the dashboard owns the terminal.
pub fn get_log_path() -> Result<PathBuf, std::io::Error> {
    Ok(config_dir()?.join(LOG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::RecordId;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn sample_config(token: &str) -> Config {
        Config::new(
            "http://localhost:3001".to_string(),
            SessionContext::new(
                token.to_string(),
                UserProfile {
                    id: RecordId::Number(1),
                    name: "Admin".to_string(),
                    email: "admin@example.com".to_string(),
                },
            ),
        )
    }

    #[test]
    // Loading a saved configuration file should return the same configuration.
    fn test_load_recovers_saved_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        let config = sample_config("token-1");
        config.save(&path).unwrap();

        let loaded_config = Config::load_from_file(&path).unwrap();
        assert_eq!(config, loaded_config);
    }

    #[test]
    // Saving a configuration should create directories if they don't exist.
    fn test_save_creates_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent_dir").join("session.json");

        let result = sample_config("token-1").save(&path);

        assert!(result.is_ok(), "Failed to save config");
        assert!(
            path.parent().unwrap().exists(),
            "Parent directory does not exist"
        );
    }

    #[test]
    // Saving a configuration should overwrite an existing file.
    fn test_save_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");

        sample_config("token-1").save(&path).unwrap();
        let config2 = sample_config("token-2");
        config2.save(&path).unwrap();

        let loaded_config = Config::load_from_file(&path).unwrap();
        assert_eq!(config2, loaded_config);
    }

    #[cfg(unix)]
    #[test]
    // The session file holds a bearer token and must not be readable by others.
    fn test_save_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        File::create(&path).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        sample_config("token-1").save(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    // Loading an invalid JSON file should return an error.
    fn test_load_rejects_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid_session.json");

        let mut file = File::create(&path).unwrap();
        writeln!(file, "invalid json").unwrap();

        let result = Config::load_from_file(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_signature_detects_tampering() {
        let signed = sample_config("token-1").sign("s3cret").unwrap();
        assert!(signed.verify("s3cret"));
        assert!(!signed.verify("other-secret"));

        let mut tampered = signed.clone();
        tampered.token = "forged".to_string();
        assert!(!tampered.verify("s3cret"));

        assert!(!sample_config("token-1").verify("s3cret"));
    }

    #[test]
    fn test_clear_session_tolerates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        assert!(Config::clear_session(&path).is_ok());

        sample_config("token-1").save(&path).unwrap();
        Config::clear_session(&path).unwrap();
        assert!(!path.exists());
    }
}
