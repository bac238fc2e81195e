use super::GatewayContext;
use crate::models::{ClassId, ClassRecord, ClassUpdate, MessageAck, NewClass};
use crate::outcome::Outcome;

#[derive(Clone)]
pub struct ClassGateway {
    ctx: GatewayContext,
}

impl ClassGateway {
    pub(crate) fn new(ctx: GatewayContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> Outcome<Vec<ClassRecord>> {
        let result = self.ctx.pipeline.get("classes").await;
        self.ctx.settle("list_classes", result)
    }

    pub async fn get(&self, class_id: ClassId) -> Outcome<ClassRecord> {
        let result = self.ctx.pipeline.get(&format!("classes/{class_id}")).await;
        self.ctx.settle("get_class", result)
    }

    pub async fn create(&self, class: &NewClass) -> Outcome<ClassRecord> {
        if class.name.trim().is_empty() {
            return self.ctx.invalid("create_class", "Class name is required");
        }
        let result = self.ctx.pipeline.post("classes", class).await;
        self.ctx.settle("create_class", result)
    }

    pub async fn update(&self, class_id: ClassId, update: &ClassUpdate) -> Outcome<ClassRecord> {
        let result = self
            .ctx
            .pipeline
            .put(&format!("classes/{class_id}"), update)
            .await;
        self.ctx.settle("update_class", result)
    }

    pub async fn delete(&self, class_id: ClassId) -> Outcome<MessageAck> {
        let result = self
            .ctx
            .pipeline
            .delete(&format!("classes/{class_id}"))
            .await;
        self.ctx.settle("delete_class", result)
    }
}
