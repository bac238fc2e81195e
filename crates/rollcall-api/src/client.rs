// The assembled client
//
// One session store, one pipeline and one set of gateways, built together
// and passed explicitly to whoever needs them. Nothing here is global.

use std::sync::Arc;

use crate::error::Error;
use crate::gateway::{
    AttendanceGateway, AuthGateway, ClassGateway, DashboardGateway, GatewayContext, GatewayPolicy,
    NotificationGateway, StudentGateway,
};
use crate::pipeline::RequestPipeline;
use crate::session::SessionStore;
use crate::transport::TransportConfig;

/// Entry point for talking to the school-management backend.
///
/// Cheap to clone; clones share the session and HTTP connection pool.
#[derive(Clone)]
pub struct SchoolClient {
    pipeline: Arc<RequestPipeline>,
    policy: Arc<GatewayPolicy>,
    auth: AuthGateway,
    classes: ClassGateway,
    students: StudentGateway,
    attendance: AttendanceGateway,
    dashboard: DashboardGateway,
    notifications: NotificationGateway,
}

impl SchoolClient {
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        session: Arc<SessionStore>,
        policy: GatewayPolicy,
    ) -> Result<Self, Error> {
        let pipeline = RequestPipeline::new(base_url, transport, session)?;
        Ok(Self::from_pipeline(Arc::new(pipeline), policy))
    }

    pub fn from_pipeline(pipeline: Arc<RequestPipeline>, policy: GatewayPolicy) -> Self {
        let policy = Arc::new(policy);
        let ctx = GatewayContext::new(Arc::clone(&pipeline), Arc::clone(&policy));
        Self {
            auth: AuthGateway::new(ctx.clone()),
            classes: ClassGateway::new(ctx.clone()),
            students: StudentGateway::new(ctx.clone()),
            attendance: AttendanceGateway::new(ctx.clone()),
            dashboard: DashboardGateway::new(ctx.clone()),
            notifications: NotificationGateway::new(ctx),
            pipeline,
            policy,
        }
    }

    pub fn auth(&self) -> &AuthGateway {
        &self.auth
    }

    pub fn classes(&self) -> &ClassGateway {
        &self.classes
    }

    pub fn students(&self) -> &StudentGateway {
        &self.students
    }

    pub fn attendance(&self) -> &AttendanceGateway {
        &self.attendance
    }

    pub fn dashboard(&self) -> &DashboardGateway {
        &self.dashboard
    }

    pub fn notifications(&self) -> &NotificationGateway {
        &self.notifications
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.pipeline.session()
    }

    pub fn policy(&self) -> &GatewayPolicy {
        &self.policy
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }
}
