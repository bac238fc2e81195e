// ── Runtime client configuration ──
//
// Everything needed to assemble a `Portal`. Built by the caller (the CLI
// translates a config-file profile into one); core never reads files.

use std::path::PathBuf;
use std::time::Duration;

use rollcall_api::{GatewayPolicy, TransportConfig};
use url::Url;

/// Base URL the Android emulator uses to reach a backend on the host.
pub const DEFAULT_BASE_URL: &str = "http://10.0.2.2:8000/api/";

/// Quiet period a search term must survive before it is sent.
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Where the session is kept between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionLocation {
    /// Session lives only as long as the process.
    #[default]
    Memory,
    /// Session is persisted to a JSON file.
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, e.g. `http://10.0.2.2:8000/api/`.
    pub base_url: Url,
    pub transport: TransportConfig,
    pub policy: GatewayPolicy,
    pub search_debounce: Duration,
    pub session: SessionLocation,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            transport: TransportConfig::default(),
            policy: GatewayPolicy::default(),
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            session: SessionLocation::default(),
        }
    }
}

impl Default for ClientConfig {
    // DEFAULT_BASE_URL is a valid literal.
    #[allow(clippy::unwrap_used)]
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_BASE_URL).unwrap())
    }
}
