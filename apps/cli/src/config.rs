//! CLI configuration and token persistence.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/cofre/config.toml`
//! - Windows: `%APPDATA%/cofre/config.toml`
//!
//! The session token lives in a `session.token` file next to the config,
//! so separate invocations share one login.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cofre_protocol::constants::DEFAULT_BASE_URL;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the storage API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Keep the token on disk after `login` so later commands reuse it.
    #[serde(default = "default_true")]
    pub remember_session: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            remember_session: true,
        }
    }
}

impl Config {
    /// Loads the configuration from disk, creating a default file on the
    /// first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(config_path())
    }

    fn load_from(path: PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Config::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Reads the persisted session token, if any.
pub fn load_token() -> Option<String> {
    let token = std::fs::read_to_string(token_path()).ok()?;
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Persists the session token with owner-only permissions.
pub fn save_token(token: &str) -> anyhow::Result<()> {
    let path = token_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, token)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Deletes the persisted session token.
pub fn clear_token() {
    let _ = std::fs::remove_file(token_path());
}

fn token_path() -> PathBuf {
    config_dir().join("session.token")
}

fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Returns the platform-specific configuration directory.
fn config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".config").join("cofre")
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("cofre")
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        PathBuf::from("/tmp/cofre")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_point_at_local_server() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert!(config.remember_session);
    }

    #[test]
    fn load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(path.clone()).unwrap();
        assert!(path.exists());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn load_reads_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = \"http://10.1.2.3:5000\"\n").unwrap();

        let config = Config::load_from(path).unwrap();
        assert_eq!(config.base_url, "http://10.1.2.3:5000");
        // Missing keys fall back to their defaults.
        assert!(config.remember_session);
    }

    #[test]
    fn roundtrip_preserves_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config {
            base_url: "http://storage.example.mx".into(),
            remember_session: false,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(path).unwrap();
        assert_eq!(loaded.base_url, "http://storage.example.mx");
        assert!(!loaded.remember_session);
    }
}
