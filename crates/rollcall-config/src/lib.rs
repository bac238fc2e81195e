//! Shared configuration for rollcall.
//!
//! TOML profiles, password resolution (env + keyring + plaintext),
//! and translation to `rollcall_core::ClientConfig`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use rollcall_api::TlsMode;
use rollcall_core::{ClientConfig, DEFAULT_BASE_URL, SessionLocation};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Keyring service under which profile passwords are stored.
pub const KEYRING_SERVICE: &str = "rollcall";

/// Environment variable consulted for the account password.
pub const PASSWORD_ENV: &str = "ROLLCALL_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring unavailable: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named server profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API root, e.g. "http://10.0.2.2:8000/api/".
    #[serde(default = "default_server")]
    pub server: String,

    /// Account email used by `login`.
    pub email: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Where the session is persisted. Defaults to the platform data dir.
    pub session_file: Option<PathBuf>,

    /// Search debounce window in milliseconds.
    pub debounce_ms: Option<u64>,

    /// Status given to unmarked students on bulk attendance.
    pub default_status: Option<String>,

    /// Message shown when a failure carries no text of its own.
    pub fallback_message: Option<String>,
}

fn default_server() -> String {
    DEFAULT_BASE_URL.into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "rollcall", "rollcall")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || {
            let mut p = dirs_fallback(".config");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default session file for a profile, under the platform data dir.
pub fn session_path(profile_name: &str) -> PathBuf {
    let dir = project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    );
    dir.join("sessions").join(format!("{profile_name}.json"))
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("rollcall");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// Nested keys are addressed with a double underscore, e.g.
/// `ROLLCALL_DEFAULTS__TIMEOUT=60`.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("ROLLCALL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Password resolution ─────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Resolve the account password from the credential chain.
///
/// Order: the profile's `password_env`, then `ROLLCALL_PASSWORD`, then the
/// system keyring, then plaintext in the config file.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env vars
    let env_names = profile.password_env.iter().map(String::as_str).chain([PASSWORD_ENV]);
    for name in env_names {
        if let Ok(val) = std::env::var(name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ClientConfig` from a profile and the global defaults.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let base_url: url::Url = profile.server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {}", profile.server),
    })?;

    let mut config = ClientConfig::new(base_url);

    config.transport.tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout).max(1));
    config.transport = config.transport.with_timeout(timeout);

    if let Some(ms) = profile.debounce_ms {
        config.search_debounce = Duration::from_millis(ms);
    }

    if let Some(ref status) = profile.default_status {
        config.policy.default_status = status.parse().map_err(|_| ConfigError::Validation {
            field: "default_status".into(),
            reason: format!("expected present, absent, late or excused; got '{status}'"),
        })?;
    }

    if let Some(ref message) = profile.fallback_message {
        config.policy.fallback_message.clone_from(message);
    }

    config.session = SessionLocation::File(
        profile
            .session_file
            .clone()
            .unwrap_or_else(|| session_path(profile_name)),
    );

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use rollcall_api::AttendanceStatus;

    use super::*;

    #[test]
    fn profile_parses_from_toml() {
        let cfg: Config = toml::from_str(
            r#"
            default_profile = "school"

            [profiles.school]
            server = "https://school.example/api"
            email = "grace@school.test"
            debounce_ms = 250
            default_status = "absent"
            "#,
        )
        .unwrap();

        let profile = &cfg.profiles["school"];
        assert_eq!(profile.email.as_deref(), Some("grace@school.test"));
        assert_eq!(cfg.defaults.timeout, 30);
    }

    #[test]
    fn translation_applies_profile_overrides() {
        let profile = Profile {
            server: "https://school.example/api/".into(),
            timeout: Some(10),
            debounce_ms: Some(250),
            default_status: Some("Late".into()),
            fallback_message: Some("Something went wrong".into()),
            session_file: Some("/tmp/rollcall-session.json".into()),
            ..Profile::default()
        };

        let config = profile_to_client_config(&profile, "school", &Defaults::default()).unwrap();
        assert_eq!(config.base_url.as_str(), "https://school.example/api/");
        assert_eq!(config.transport.timeout, Duration::from_secs(10));
        assert_eq!(config.search_debounce, Duration::from_millis(250));
        assert_eq!(config.policy.default_status, AttendanceStatus::Late);
        assert_eq!(config.policy.fallback_message, "Something went wrong");
        assert_eq!(
            config.session,
            SessionLocation::File("/tmp/rollcall-session.json".into())
        );
    }

    #[test]
    fn defaults_fill_unset_fields() {
        let profile = Profile {
            server: default_server(),
            ..Profile::default()
        };
        let defaults = Defaults {
            insecure: true,
            ..Defaults::default()
        };

        let config = profile_to_client_config(&profile, "default", &defaults).unwrap();
        assert!(matches!(config.transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(config.transport.timeout, Duration::from_secs(30));
        assert_eq!(config.policy.default_status, AttendanceStatus::Present);
        assert_eq!(
            config.session,
            SessionLocation::File(session_path("default"))
        );
    }

    #[test]
    fn bad_status_is_rejected() {
        let profile = Profile {
            server: default_server(),
            default_status: Some("tardy".into()),
            ..Profile::default()
        };
        let err = profile_to_client_config(&profile, "default", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "default_status"));
    }

    #[test]
    fn bad_server_is_rejected() {
        let profile = Profile {
            server: "not a url".into(),
            ..Profile::default()
        };
        assert!(profile_to_client_config(&profile, "default", &Defaults::default()).is_err());
    }
}
