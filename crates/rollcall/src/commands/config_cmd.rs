//! Config subcommand handlers.

use dialoguer::{Input, Select};
use rollcall_api::AttendanceStatus;
use rollcall_core::DEFAULT_BASE_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// A copy of the config with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut copy = cfg.clone();
    for profile in copy.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    copy
}

/// Format config for display as TOML-like text.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(ref email) = p.email {
            let _ = writeln!(out, "email = \"{email}\"");
        }
        if let Some(ref pw) = p.password {
            let _ = writeln!(out, "password = \"{pw}\"");
        }
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref session) = p.session_file {
            let _ = writeln!(out, "session_file = \"{}\"", session.display());
        }
        if let Some(ms) = p.debounce_ms {
            let _ = writeln!(out, "debounce_ms = {ms}");
        }
        if let Some(ref status) = p.default_status {
            let _ = writeln!(out, "default_status = \"{status}\"");
        }
        if let Some(ref message) = p.fallback_message {
            let _ = writeln!(out, "fallback_message = \"{message}\"");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `key = value` to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "server" => {
            let _: url::Url = parse_field("server", &value, "a URL")?;
            profile.server = value;
        }
        "email" => profile.email = Some(value),
        "password_env" | "password-env" => profile.password_env = Some(value),
        "insecure" => profile.insecure = Some(parse_field("insecure", &value, "'true' or 'false'")?),
        "timeout" => profile.timeout = Some(parse_field("timeout", &value, "a number (seconds)")?),
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        "session_file" | "session-file" => profile.session_file = Some(value.into()),
        "debounce_ms" | "debounce-ms" => {
            profile.debounce_ms = Some(parse_field("debounce_ms", &value, "a number (milliseconds)")?);
        }
        "default_status" | "default-status" => {
            let _: AttendanceStatus = parse_field(
                "default_status",
                &value,
                "one of present, absent, late, excused",
            )?;
            profile.default_status = Some(value.to_lowercase());
        }
        "fallback_message" | "fallback-message" => profile.fallback_message = Some(value),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: server, email, password_env, \
                     insecure, timeout, ca_cert, session_file, debounce_ms, default_status, \
                     fallback_message"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("rollcall configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Server URL
            let server: String = Input::new()
                .with_prompt("API root URL")
                .default(DEFAULT_BASE_URL.into())
                .validate_with(|input: &String| {
                    input
                        .parse::<url::Url>()
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            // 3. Account
            let email: String = Input::new()
                .with_prompt("Account email")
                .interact_text()
                .map_err(prompt_err)?;

            // 4. Password storage
            let choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
                "Don't store; ask at login",
            ];
            let selection = Select::new()
                .with_prompt("Where to keep the password?")
                .items(choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let password = match selection {
                0 | 1 => {
                    let pw = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
                    if pw.is_empty() {
                        return Err(CliError::Validation {
                            field: "password".into(),
                            reason: "password cannot be empty".into(),
                        });
                    }
                    if selection == 0 {
                        config::store_password(&profile_name, &pw)?;
                        eprintln!("   ✓ Password stored in system keyring");
                        None
                    } else {
                        Some(pw)
                    }
                }
                _ => None,
            };

            // 5. Build profile and config
            let profile = Profile {
                server,
                email: Some(email),
                password,
                ..Profile::default()
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            // 6. Write config
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: rollcall login");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out =
                output::render_single(&global.output, &cfg, format_config, |_| "config".into());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile {
                    server: DEFAULT_BASE_URL.into(),
                    ..Profile::default()
                });
            set_key(profile, &key, value)?;

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: rollcall config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
                available.sort();
                return Err(CliError::Validation {
                    field: "profile".into(),
                    reason: format!(
                        "'{name}' is not configured (available: {})",
                        available.join(", ")
                    ),
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            let pw = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if pw.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            config::store_password(&profile_name, &pw)?;

            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::Defaults;

    fn single_profile(name: &str, profile: Profile) -> Config {
        let mut profiles = HashMap::new();
        profiles.insert(name.to_owned(), profile);
        Config {
            default_profile: Some(name.to_owned()),
            defaults: Defaults::default(),
            profiles,
        }
    }

    #[test]
    fn show_masks_plaintext_password() {
        let cfg = single_profile(
            "school",
            Profile {
                server: DEFAULT_BASE_URL.into(),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        let text = format_config(&redacted(&cfg));
        assert!(text.contains("password = \"****\""));
        assert!(!text.contains("hunter2"));
    }

    #[test]
    fn set_validates_status_and_numbers() {
        let mut profile = Profile::default();
        set_key(&mut profile, "default_status", "Late".into()).unwrap();
        assert_eq!(profile.default_status.as_deref(), Some("late"));

        assert!(set_key(&mut profile, "default_status", "tardy".into()).is_err());
        assert!(set_key(&mut profile, "timeout", "soon".into()).is_err());
        assert!(set_key(&mut profile, "colour", "red".into()).is_err());
    }

    #[test]
    fn set_rejects_bad_server() {
        let mut profile = Profile::default();
        assert!(set_key(&mut profile, "server", "not a url".into()).is_err());
        set_key(&mut profile, "server", "https://school.example/api/".into()).unwrap();
        assert_eq!(profile.server, "https://school.example/api/");
    }
}
