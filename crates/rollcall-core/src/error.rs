// ── Core error types ──
//
// Only assembly can fail with an `Err`; once a `Portal` exists, every
// operation settles into an `Outcome`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Cannot open session file {}: {source}", path.display())]
    SessionUnavailable {
        path: PathBuf,
        #[source]
        source: rollcall_api::Error,
    },

    #[error("Cannot build client for {url}: {source}")]
    ClientSetup {
        url: String,
        #[source]
        source: rollcall_api::Error,
    },
}
