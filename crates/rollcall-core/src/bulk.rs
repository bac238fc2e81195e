// ── Bulk attendance submission ──
//
// An `AttendanceSheet` is the working set for one class on one day. Marks
// and notes are edited locally; `submit` checks the preconditions and then
// sends the whole sheet as a single bulk write. There is no per-entry
// retry and no splitting: the backend records all of it or none of it.

use chrono::{Local, NaiveDate};
use indexmap::IndexMap;
use rollcall_api::{
    AttendanceBatch, AttendanceGateway, AttendanceStatus, AttendanceToday, ClassId, Mark,
    MessageAck, Outcome, Student, StudentId,
};
use tracing::debug;

pub const NO_CLASS_SELECTED: &str = "Please select a class first";
pub const NO_STUDENTS: &str = "No students to mark attendance for";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceSheet {
    class_id: Option<ClassId>,
    date: NaiveDate,
    default_status: AttendanceStatus,
    marks: IndexMap<StudentId, Mark>,
}

impl AttendanceSheet {
    /// An empty sheet dated today.
    pub fn new(class_id: Option<ClassId>, default_status: AttendanceStatus) -> Self {
        Self {
            class_id,
            date: Local::now().date_naive(),
            default_status,
            marks: IndexMap::new(),
        }
    }

    /// A sheet with one unmarked line per student, in roster order.
    pub fn for_roster(
        class_id: Option<ClassId>,
        roster: &[Student],
        default_status: AttendanceStatus,
    ) -> Self {
        let mut sheet = Self::new(class_id, default_status);
        for student in roster {
            sheet.add_student(student.id);
        }
        sheet
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn class_id(&self) -> Option<ClassId> {
        self.class_id
    }

    pub fn select_class(&mut self, class_id: ClassId) {
        self.class_id = Some(class_id);
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Add a student to the sheet. A student already on it keeps their mark.
    pub fn add_student(&mut self, student_id: StudentId) {
        self.marks.entry(student_id).or_default();
    }

    /// Set a student's status. Returns `false` if the student is not on the sheet.
    pub fn mark(&mut self, student_id: StudentId, status: AttendanceStatus) -> bool {
        match self.marks.get_mut(&student_id) {
            Some(mark) => {
                mark.status = Some(status);
                true
            }
            None => false,
        }
    }

    /// Attach a note to a student's line. Blank notes are dropped on submit.
    pub fn note(&mut self, student_id: StudentId, notes: impl Into<String>) -> bool {
        match self.marks.get_mut(&student_id) {
            Some(mark) => {
                mark.notes = Some(notes.into());
                true
            }
            None => false,
        }
    }

    pub fn mark_all(&mut self, status: AttendanceStatus) {
        for mark in self.marks.values_mut() {
            mark.status = Some(status);
        }
    }

    /// Effective status for a student, with the default filled in.
    pub fn status_of(&self, student_id: StudentId) -> Option<AttendanceStatus> {
        self.marks
            .get(&student_id)
            .map(|mark| mark.status.unwrap_or(self.default_status))
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Counts per status as the sheet stands.
    pub fn tally(&self) -> AttendanceToday {
        let mut tally = AttendanceToday::default();
        for mark in self.marks.values() {
            match mark.status.unwrap_or(self.default_status) {
                AttendanceStatus::Present => tally.present += 1,
                AttendanceStatus::Absent => tally.absent += 1,
                AttendanceStatus::Late => tally.late += 1,
                AttendanceStatus::Excused => tally.excused += 1,
            }
        }
        tally
    }

    /// Build the batch, or the validation message that blocks it.
    pub fn to_batch(&self) -> Result<AttendanceBatch, &'static str> {
        let class_id = self.class_id.ok_or(NO_CLASS_SELECTED)?;
        if self.marks.is_empty() {
            return Err(NO_STUDENTS);
        }
        Ok(AttendanceBatch::assemble(
            class_id,
            self.date,
            &self.marks,
            self.default_status,
        ))
    }

    /// Validate and send the sheet as one bulk write.
    ///
    /// A failed precondition returns `Error` without touching the network.
    pub async fn submit(&self, gateway: &AttendanceGateway) -> Outcome<MessageAck> {
        match self.to_batch() {
            Ok(batch) => gateway.submit_batch(&batch).await,
            Err(message) => {
                debug!(message, "attendance sheet rejected locally");
                Outcome::error(message)
            }
        }
    }
}
