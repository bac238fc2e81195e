//! Shared helpers for command handlers.

use std::io::IsTerminal;

use rollcall_api::Outcome;
use secrecy::SecretString;

use crate::error::CliError;

/// Turn a settled outcome into the handler's `Result`.
pub fn settle<T>(outcome: Outcome<T>) -> Result<T, CliError> {
    outcome
        .into_result()
        .map_err(|message| CliError::Rejected { message })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, `--yes` is required.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').to_owned(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read a password from the terminal without echo.
pub fn prompt_secret(prompt: &str) -> Result<SecretString, CliError> {
    let value = rpassword::prompt_password(prompt)?;
    Ok(SecretString::from(value))
}

/// Treat blank optional strings from flags as unset.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `-` for absent optional cells.
pub fn or_dash(value: Option<&str>) -> String {
    value.map_or_else(|| "-".into(), str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn error_outcome_becomes_rejection() {
        let err = settle::<()>(Outcome::error("Class not found")).unwrap_err();
        assert_eq!(err.to_string(), "Class not found");
        assert_eq!(err.exit_code(), crate::error::exit_code::GENERAL);
    }

    #[test]
    fn blank_flags_are_dropped() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some("x".into())), Some("x".into()));
    }
}
