// Attendance gateway
//
// A class's attendance for a day is written with one bulk call; the
// per-record endpoint exists for single corrections.

use chrono::NaiveDate;
use tracing::info;

use super::GatewayContext;
use crate::models::{
    AttendanceBatch, AttendanceEntry, ClassId, MessageAck, NewAttendance, StudentId,
};
use crate::outcome::Outcome;

#[derive(Clone)]
pub struct AttendanceGateway {
    ctx: GatewayContext,
}

impl AttendanceGateway {
    pub(crate) fn new(ctx: GatewayContext) -> Self {
        Self { ctx }
    }

    /// Attendance for a class, optionally limited to one day.
    pub async fn for_class(
        &self,
        class_id: ClassId,
        date: Option<NaiveDate>,
    ) -> Outcome<Vec<AttendanceEntry>> {
        let mut params = vec![("class_id", class_id.to_string())];
        if let Some(date) = date {
            params.push(("date", date.to_string()));
        }
        let result = self
            .ctx
            .pipeline
            .get_with_params("attendance", &params)
            .await;
        self.ctx.settle("class_attendance", result)
    }

    pub async fn for_student(&self, student_id: StudentId) -> Outcome<Vec<AttendanceEntry>> {
        let result = self
            .ctx
            .pipeline
            .get(&format!("attendance/student/{student_id}"))
            .await;
        self.ctx.settle("student_attendance", result)
    }

    pub async fn record(&self, entry: &NewAttendance) -> Outcome<AttendanceEntry> {
        let result = self.ctx.pipeline.post("attendance", entry).await;
        self.ctx.settle("record_attendance", result)
    }

    /// Write a whole batch in one request.
    ///
    /// An empty batch is rejected locally and never reaches the network.
    pub async fn submit_batch(&self, batch: &AttendanceBatch) -> Outcome<MessageAck> {
        if batch.is_empty() {
            return self
                .ctx
                .invalid("submit_attendance", "No students to mark attendance for");
        }
        info!(
            class_id = batch.class_id,
            date = %batch.date,
            records = batch.len(),
            "submitting attendance"
        );
        let result = self.ctx.pipeline.post("attendance/bulk", batch).await;
        self.ctx.settle("submit_attendance", result)
    }
}
