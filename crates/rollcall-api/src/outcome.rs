// Tagged outcome of a data-layer operation.
//
// Every gateway method resolves to one of these. Exactly one variant is
// populated at a time; `Loading` exists for callers that want to render a
// pending state before awaiting, and is never returned by a gateway.

use serde::Serialize;

/// Result of a data-producing operation as seen by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The operation has been issued but has not resolved yet.
    Loading,
    /// The backend accepted the request and returned a decodable body.
    Success { data: T },
    /// The operation failed; `message` is ready to show to a user.
    Error { message: String },
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Borrow the payload of a `Success`.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Loading | Self::Error { .. } => None,
        }
    }

    /// The message of an `Error`.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            Self::Loading | Self::Success { .. } => None,
        }
    }

    /// Take the payload of a `Success`, discarding any other variant.
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Loading | Self::Error { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Loading => Outcome::Loading,
            Self::Success { data } => Outcome::Success { data: f(data) },
            Self::Error { message } => Outcome::Error { message },
        }
    }

    /// Convert a settled outcome into a plain `Result`.
    ///
    /// `Loading` is reported as an error since it is never a final state.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Error { message } => Err(message),
            Self::Loading => Err("operation still in progress".into()),
        }
    }
}
