use async_once_cell::OnceCell;
use directories::ProjectDirs;
use eyre::{eyre, Result};
use lazy_static::lazy_static;
use rand::distributions::{Alphanumeric, DistString};
use serde_derive::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use time::UtcOffset;

use super::{util, CLI_NAME};

lazy_static! {
    pub static ref SETTINGS: Arc<OnceCell<Settings>> = Arc::new(OnceCell::new());
}

static DEFAULT_DB_FILE: &str = "stagedoor.db";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings global store is unitialized")]
    Uninitialized,

    #[error("Invalid UTC offset {0:?}, expected something like +02:00")]
    InvalidOffset(String),

    #[error("Tokens can only be signed with the local provider and a configured auth.jwt_secret")]
    NoSigningSecret,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub db: String,

    #[serde(default)]
    pub directory: Directory,

    #[serde(default)]
    pub auth: Auth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    /// Fixed zone used to read naive form datetimes and to display show times.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

impl Default for Directory {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
        }
    }
}

impl Directory {
    pub fn zone(&self) -> Result<UtcOffset, SettingsError> {
        util::parse_offset(self.utc_offset.as_str())
            .ok_or_else(|| SettingsError::InvalidOffset(self.utc_offset.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    /// Tokens signed with the shared `jwt_secret` (HS256).
    Local,
    /// Tokens signed by an identity provider publishing its keys as a JWKS (RS256).
    Jwks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    #[serde(default = "default_provider")]
    pub provider: AuthProvider,
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default)]
    pub jwks_url: Option<url::Url>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
}

impl Auth {
    /// The shared secret, only when it was set explicitly for the local provider.
    pub fn signing_secret(&self) -> Result<&str, SettingsError> {
        match self.provider {
            AuthProvider::Local if !self.jwt_secret.is_empty() => Ok(self.jwt_secret.as_str()),
            _ => Err(SettingsError::NoSigningSecret),
        }
    }
}

fn default_provider() -> AuthProvider {
    AuthProvider::Local
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            jwt_secret: String::new(),
            jwks_url: None,
            audience: None,
            issuer: None,
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "github", CLI_NAME).ok_or(eyre!("Could not locate program directories"))
}

pub fn load(path: Option<PathBuf>) -> Result<Settings> {
    let set = generate_default(read(path)?)?;
    tracing::trace! {settings = ?set.directory, provider = ?set.auth.provider, "Loaded settings"};
    Ok(set)
}

/// Parses the config file as written, without filling in defaults.
pub fn read(path: Option<PathBuf>) -> Result<Settings> {
    let path = match path {
        Some(path) => path,
        None => project_dirs()?
            .config_dir()
            .join(PathBuf::from("config.toml")),
    };
    tracing::info! {?path, "Loading config file"};
    let content = fs::read_to_string(path).unwrap_or_else(|_| "".to_string());
    toml::from_str(content.as_str()).map_err(|e| eyre!(e))
}

pub fn generate_default(mut set: Settings) -> Result<Settings> {
    if set.db == String::default() {
        let data_dir = project_dirs()?.data_dir().to_path_buf();
        util::mkdirp(&data_dir)?;
        set.db = format!(
            "sqlite://{}?mode=rwc",
            util::path_to_str(&data_dir.join(DEFAULT_DB_FILE))?
        );
    }
    set.directory.zone()?;
    match set.auth.provider {
        AuthProvider::Local if set.auth.jwt_secret == String::default() => {
            set.auth.jwt_secret = Alphanumeric.sample_string(&mut rand::thread_rng(), 32);
            tracing::warn!("Using a random JWT secret. Define auth.jwt_secret in the config to keep tokens valid across restarts");
        }
        AuthProvider::Jwks if set.auth.jwks_url.is_none() => {
            return Err(eyre!("auth.jwks_url is required when auth.provider = \"jwks\""));
        }
        _ => {}
    }
    Ok(set)
}

pub fn get_settings() -> Result<&'static Settings, SettingsError> {
    SETTINGS.get().ok_or(SettingsError::Uninitialized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_parses_to_defaults() {
        let set: Settings = toml::from_str("").unwrap();
        assert_eq!(set.auth.provider, AuthProvider::Local);
        assert_eq!(set.directory.utc_offset, "+00:00");
        assert!(set.db.is_empty());
    }

    #[test]
    fn auth_section_is_read() {
        let set: Settings = toml::from_str(
            r#"
            db = "sqlite::memory:"

            [directory]
            utc_offset = "-05:00"

            [auth]
            provider = "jwks"
            jwks_url = "https://example.auth0.com/.well-known/jwks.json"
            audience = "drinks"
            "#,
        )
        .unwrap();
        assert_eq!(set.auth.provider, AuthProvider::Jwks);
        assert_eq!(set.auth.audience.as_deref(), Some("drinks"));
        assert_eq!(
            set.directory.zone().unwrap(),
            UtcOffset::from_hms(-5, 0, 0).unwrap()
        );
    }

    #[test]
    fn jwks_without_url_is_rejected() {
        let set = Settings {
            db: "sqlite::memory:".to_string(),
            auth: Auth {
                provider: AuthProvider::Jwks,
                ..Auth::default()
            },
            ..Settings::default()
        };
        assert!(generate_default(set).is_err());
    }

    #[test]
    fn local_secret_is_generated() {
        let set = Settings {
            db: "sqlite::memory:".to_string(),
            ..Settings::default()
        };
        let set = generate_default(set).unwrap();
        assert_eq!(set.auth.jwt_secret.len(), 32);
    }

    #[test]
    fn signing_secret_must_be_configured() {
        let auth = Auth::default();
        assert!(matches!(
            auth.signing_secret(),
            Err(SettingsError::NoSigningSecret)
        ));

        let auth = Auth {
            jwt_secret: "s3cret".to_string(),
            ..Auth::default()
        };
        assert_eq!(auth.signing_secret().unwrap(), "s3cret");

        let auth = Auth {
            provider: AuthProvider::Jwks,
            jwt_secret: "s3cret".to_string(),
            ..Auth::default()
        };
        assert!(auth.signing_secret().is_err());
    }
}
