use super::GatewayContext;
use crate::models::{MessageAck, Notification, NotificationId};
use crate::outcome::Outcome;

#[derive(Clone)]
pub struct NotificationGateway {
    ctx: GatewayContext,
}

impl NotificationGateway {
    pub(crate) fn new(ctx: GatewayContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> Outcome<Vec<Notification>> {
        let result = self.ctx.pipeline.get("notifications").await;
        self.ctx.settle("list_notifications", result)
    }

    pub async fn mark_read(&self, notification_id: NotificationId) -> Outcome<MessageAck> {
        let result = self
            .ctx
            .pipeline
            .put_empty(&format!("notifications/{notification_id}/read"))
            .await;
        self.ctx.settle("mark_notification_read", result)
    }
}
