use thiserror::Error;

/// Top-level error type for the `rollcall-api` crate.
///
/// Covers every failure the data layer can run into: local validation,
/// transport, backend rejections, and session persistence. Gateways never
/// hand this type to callers directly -- they settle it into an
/// [`Outcome::Error`](crate::Outcome::Error) via [`Error::user_message`].
#[derive(Debug, Error)]
pub enum Error {
    // ── Local ───────────────────────────────────────────────────────
    /// Input rejected before any network call was made.
    #[error("{message}")]
    Validation { message: String },

    /// Reading or writing the persisted session failed.
    #[error("Session storage error: {message}")]
    Session { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request exceeded the configured timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response. `message` is the `detail` from the error body
    /// when it could be parsed, otherwise the HTTP status line.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 2xx response that carried no body to decode.
    #[error("Empty response body (HTTP {status})")]
    EmptyBody { status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn session(message: impl std::fmt::Display) -> Self {
        Self::Session {
            message: message.to_string(),
        }
    }

    /// The text a caller should show for this failure.
    ///
    /// Backend `detail` messages and validation messages are returned
    /// verbatim; everything else uses its display text. Falls back to
    /// `fallback` when that text would be empty.
    pub fn user_message(&self, fallback: &str) -> String {
        let text = match self {
            Self::Validation { message } | Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        };
        if text.trim().is_empty() {
            fallback.to_owned()
        } else {
            text
        }
    }

    /// HTTP status of a backend rejection, if this error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::EmptyBody { status } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the backend rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Returns `true` if this failure never reached the backend's logic
    /// (connection problems and timeouts).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout { .. } | Self::Tls(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_detail_is_surfaced_verbatim() {
        let err = Error::Api {
            status: 400,
            message: "Email already registered".into(),
        };
        assert_eq!(err.user_message("fallback"), "Email already registered");
    }

    #[test]
    fn empty_message_uses_fallback() {
        let err = Error::Api {
            status: 500,
            message: "  ".into(),
        };
        assert_eq!(
            err.user_message("Unknown error occurred"),
            "Unknown error occurred"
        );
    }

    #[test]
    fn timeout_message_mentions_duration() {
        let err = Error::Timeout { timeout_secs: 30 };
        assert_eq!(err.user_message("x"), "Request timed out after 30s");
        assert!(err.is_transport());
    }

    #[test]
    fn unauthorized_detection() {
        let err = Error::Api {
            status: 401,
            message: "Could not validate credentials".into(),
        };
        assert!(err.is_unauthorized());
        assert!(!err.is_transport());
    }
}
