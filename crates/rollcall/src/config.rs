//! CLI configuration: thin wrapper around `rollcall_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--server, --insecure, --timeout).

use std::time::Duration;

use rollcall_api::TlsMode;
use rollcall_core::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use rollcall_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, resolve_password,
    save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The active profile, or one synthesized from `--server` when the config
/// has none by that name.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    if let Some(profile) = config.profiles.get(&name) {
        return Ok((name, profile.clone()));
    }
    let server = global.server.clone().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    Ok((
        name,
        Profile {
            server,
            ..Profile::default()
        },
    ))
}

/// Translate a `Profile` + global flags into a `ClientConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ClientConfig, CliError> {
    let mut profile = profile.clone();

    // 1. Server URL (flag > env > profile)
    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }

    let mut config = rollcall_config::profile_to_client_config(&profile, profile_name, defaults)?;

    // 2. TLS verification
    if global.insecure {
        config.transport.tls = TlsMode::DangerAcceptInvalid;
    }

    // 3. Timeout
    if let Some(secs) = global.timeout {
        config.transport = config.transport.with_timeout(Duration::from_secs(secs.max(1)));
    }

    Ok(config)
}
