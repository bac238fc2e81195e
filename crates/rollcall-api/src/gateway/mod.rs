// Entity gateways
//
// One typed façade per resource family. Each method performs exactly one
// round trip through the `RequestPipeline` (login performs two, in
// sequence) and settles the result into an `Outcome`; callers never see a
// raw status code or an `Err`.

mod attendance;
mod auth;
mod classes;
mod dashboard;
mod notifications;
mod students;

use std::sync::Arc;

use tracing::debug;

pub use attendance::AttendanceGateway;
pub use auth::AuthGateway;
pub use classes::ClassGateway;
pub use dashboard::DashboardGateway;
pub use notifications::NotificationGateway;
pub use students::StudentGateway;

use crate::error::Error;
use crate::models::AttendanceStatus;
use crate::outcome::Outcome;
use crate::pipeline::RequestPipeline;

/// Message used when a failure carries no usable text of its own.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "Unknown error occurred";

/// Message returned when the remote logout call fails but the local
/// session was still cleared.
pub const DEFAULT_LOGOUT_MESSAGE: &str = "Logged out locally";

/// Policy defaults applied by the gateways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPolicy {
    pub fallback_message: String,
    /// Status given to students left unmarked on a bulk submission.
    pub default_status: AttendanceStatus,
    pub logout_message: String,
}

impl Default for GatewayPolicy {
    fn default() -> Self {
        Self {
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_owned(),
            default_status: AttendanceStatus::Present,
            logout_message: DEFAULT_LOGOUT_MESSAGE.to_owned(),
        }
    }
}

/// State every gateway shares: the pipeline and the policy.
#[derive(Clone)]
pub(crate) struct GatewayContext {
    pub(crate) pipeline: Arc<RequestPipeline>,
    pub(crate) policy: Arc<GatewayPolicy>,
}

impl GatewayContext {
    pub(crate) fn new(pipeline: Arc<RequestPipeline>, policy: Arc<GatewayPolicy>) -> Self {
        Self { pipeline, policy }
    }

    /// Turn an internal `Result` into the caller-facing `Outcome`.
    pub(crate) fn settle<T>(&self, operation: &'static str, result: Result<T, Error>) -> Outcome<T> {
        match result {
            Ok(data) => Outcome::success(data),
            Err(err) => {
                debug!(operation, error = %err, "operation failed");
                Outcome::error(err.user_message(&self.policy.fallback_message))
            }
        }
    }

    pub(crate) fn invalid<T>(&self, operation: &'static str, message: &str) -> Outcome<T> {
        self.settle(operation, Err(Error::validation(message)))
    }
}
