// rollcall-api: Async client for the school-management REST API
//
// Layers, bottom up: `SessionStore` holds the credential and identity,
// `RequestPipeline` attaches it and normalizes responses, and the entity
// gateways expose one typed operation per endpoint, each settling into an
// `Outcome`.

pub mod client;
pub mod error;
pub mod gateway;
pub mod models;
pub mod outcome;
pub mod pipeline;
pub mod session;
pub mod transport;

pub use client::SchoolClient;
pub use error::Error;
pub use gateway::{
    AttendanceGateway, AuthGateway, ClassGateway, DEFAULT_FALLBACK_MESSAGE,
    DEFAULT_LOGOUT_MESSAGE, DashboardGateway, GatewayPolicy, NotificationGateway, StudentGateway,
};
pub use models::*;
pub use outcome::Outcome;
pub use pipeline::RequestPipeline;
pub use session::{FileBackend, Identity, MemoryBackend, SessionBackend, SessionRecord, SessionStore};
pub use transport::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
