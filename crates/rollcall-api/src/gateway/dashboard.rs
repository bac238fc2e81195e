use super::GatewayContext;
use crate::models::DashboardStats;
use crate::outcome::Outcome;

#[derive(Clone)]
pub struct DashboardGateway {
    ctx: GatewayContext,
}

impl DashboardGateway {
    pub(crate) fn new(ctx: GatewayContext) -> Self {
        Self { ctx }
    }

    pub async fn stats(&self) -> Outcome<DashboardStats> {
        let result = self.ctx.pipeline.get("dashboard/stats").await;
        self.ctx.settle("dashboard_stats", result)
    }
}
