// rollcall-core: Flows with request-level discipline on top of rollcall-api.

pub mod bulk;
pub mod config;
pub mod error;
pub mod portal;
pub mod search;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bulk::{AttendanceSheet, NO_CLASS_SELECTED, NO_STUDENTS};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_SEARCH_DEBOUNCE, SessionLocation};
pub use error::CoreError;
pub use portal::Portal;
pub use search::{QueryCoordinator, SearchPhase, SearchResult, SearchSnapshot};
