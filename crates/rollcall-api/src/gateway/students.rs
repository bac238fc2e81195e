use super::GatewayContext;
use crate::models::{MessageAck, NewStudent, Student, StudentFilter, StudentId, StudentUpdate};
use crate::outcome::Outcome;

#[derive(Clone)]
pub struct StudentGateway {
    ctx: GatewayContext,
}

impl StudentGateway {
    pub(crate) fn new(ctx: GatewayContext) -> Self {
        Self { ctx }
    }

    /// List students, optionally narrowed by class and a search term.
    pub async fn list(&self, filter: &StudentFilter) -> Outcome<Vec<Student>> {
        let result = self
            .ctx
            .pipeline
            .get_with_params("students", &filter.to_params())
            .await;
        self.ctx.settle("list_students", result)
    }

    /// Free-text search across all classes. A blank term lists everyone.
    pub async fn search(&self, term: &str) -> Outcome<Vec<Student>> {
        self.list(&StudentFilter::matching(term)).await
    }

    pub async fn get(&self, student_id: StudentId) -> Outcome<Student> {
        let result = self
            .ctx
            .pipeline
            .get(&format!("students/{student_id}"))
            .await;
        self.ctx.settle("get_student", result)
    }

    pub async fn create(&self, student: &NewStudent) -> Outcome<Student> {
        if student.student_id.trim().is_empty()
            || student.first_name.trim().is_empty()
            || student.last_name.trim().is_empty()
        {
            return self
                .ctx
                .invalid("create_student", "Student ID, first name and last name are required");
        }
        let result = self.ctx.pipeline.post("students", student).await;
        self.ctx.settle("create_student", result)
    }

    pub async fn update(&self, student_id: StudentId, update: &StudentUpdate) -> Outcome<Student> {
        let result = self
            .ctx
            .pipeline
            .put(&format!("students/{student_id}"), update)
            .await;
        self.ctx.settle("update_student", result)
    }

    pub async fn delete(&self, student_id: StudentId) -> Outcome<MessageAck> {
        let result = self
            .ctx
            .pipeline
            .delete(&format!("students/{student_id}"))
            .await;
        self.ctx.settle("delete_student", result)
    }
}
