// Wire types for the school-management API.
//
// Field names match the backend's snake_case JSON one-to-one. Records are
// plain values: updates go through a gateway and come back as a new record.
// Optional fields on update payloads are omitted from the wire when unset.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Backend-assigned identifiers.
pub type UserId = i64;
pub type ClassId = i64;
pub type StudentId = i64;
pub type AttendanceId = i64;
pub type NotificationId = i64;

// ── Generic envelopes ───────────────────────────────────────────────

/// `{"message": "..."}` acknowledgement returned by writes without a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAck {
    pub message: String,
}

impl MessageAck {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ── Auth / users ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    crate::session::DEFAULT_SCHEME.to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_true() -> bool {
    true
}

impl From<&User> for crate::session::Identity {
    fn from(user: &User) -> Self {
        Self::new(user.id, &user.email, &user.full_name, &user.role)
    }
}

/// Roles the backend recognises for new accounts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Admin,
    #[default]
    Teacher,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

impl Registration {
    /// A registration for the default role.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            full_name: full_name.into(),
            role: Role::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PasswordChange<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

// ── Classes ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub id: ClassId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub grade_level: Option<String>,
    #[serde(default)]
    pub academic_year: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub student_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewClass {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<UserId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<UserId>,
}

// ── Students ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    /// School-issued roll number, distinct from the backend `id`.
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub class_id: Option<ClassId>,
    #[serde(default)]
    pub parent_name: Option<String>,
    #[serde(default)]
    pub parent_phone: Option<String>,
    #[serde(default)]
    pub parent_email: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewStudent {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Query filters for listing students. Blank search terms are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub class_id: Option<ClassId>,
    pub search: Option<String>,
}

impl StudentFilter {
    pub fn in_class(class_id: ClassId) -> Self {
        Self {
            class_id: Some(class_id),
            search: None,
        }
    }

    pub fn matching(term: impl Into<String>) -> Self {
        Self {
            class_id: None,
            search: Some(term.into()),
        }
    }

    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(class_id) = self.class_id {
            params.push(("class_id", class_id.to_string()));
        }
        if let Some(term) = self.search.as_deref().map(str::trim) {
            if !term.is_empty() {
                params.push(("search", term.to_owned()));
            }
        }
        params
    }
}

// ── Attendance ──────────────────────────────────────────────────────

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    Late,
    Excused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub id: AttendanceId,
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub marked_by: Option<UserId>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_number: Option<String>,
}

/// A single attendance mark, submitted on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAttendance {
    pub student_id: StudentId,
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One student's line inside an [`AttendanceBatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceLine {
    pub student_id: StudentId,
    pub status: AttendanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A whole class's attendance for one day, written in a single call.
///
/// Built from a map keyed by student, so it carries at most one line per
/// student, in the map's order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceBatch {
    pub class_id: ClassId,
    pub date: NaiveDate,
    #[serde(rename = "attendance_records")]
    pub entries: Vec<AttendanceLine>,
}

/// Status and optional note for one student on an attendance sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mark {
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
}

impl Mark {
    pub fn status(status: AttendanceStatus) -> Self {
        Self {
            status: Some(status),
            notes: None,
        }
    }
}

impl AttendanceBatch {
    /// Assemble a batch, filling unmarked students with `default_status`.
    pub fn assemble(
        class_id: ClassId,
        date: NaiveDate,
        marks: &IndexMap<StudentId, Mark>,
        default_status: AttendanceStatus,
    ) -> Self {
        let entries = marks
            .iter()
            .map(|(student_id, mark)| AttendanceLine {
                student_id: *student_id,
                status: mark.status.unwrap_or(default_status),
                notes: mark
                    .notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_owned),
            })
            .collect();
        Self {
            class_id,
            date,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Dashboard ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceToday {
    #[serde(default)]
    pub present: u32,
    #[serde(default)]
    pub absent: u32,
    #[serde(default)]
    pub late: u32,
    #[serde(default)]
    pub excused: u32,
}

impl AttendanceToday {
    /// Sum of all four counts, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.present
            .saturating_add(self.absent)
            .saturating_add(self.late)
            .saturating_add(self.excused)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_students: u32,
    pub total_classes: u32,
    pub total_teachers: u32,
    #[serde(default)]
    pub attendance_today: AttendanceToday,
    /// Shape varies by backend version; kept as raw JSON.
    #[serde(default)]
    pub recent_attendance: Vec<serde_json::Value>,
}

// ── Notifications ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "Late".parse::<AttendanceStatus>().unwrap(),
            AttendanceStatus::Late
        );
        assert_eq!(AttendanceStatus::Excused.to_string(), "excused");
    }

    #[test]
    fn batch_fills_default_status_and_trims_notes() {
        let mut marks = IndexMap::new();
        marks.insert(1, Mark::default());
        marks.insert(
            2,
            Mark {
                status: Some(AttendanceStatus::Absent),
                notes: Some("  sick ".into()),
            },
        );
        marks.insert(
            3,
            Mark {
                status: None,
                notes: Some("   ".into()),
            },
        );

        let batch = AttendanceBatch::assemble(5, day(), &marks, AttendanceStatus::Present);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.entries[0].status, AttendanceStatus::Present);
        assert_eq!(batch.entries[1].notes.as_deref(), Some("sick"));
        assert_eq!(batch.entries[2].notes, None);
    }

    #[test]
    fn batch_wire_shape() {
        let mut marks = IndexMap::new();
        marks.insert(11, Mark::status(AttendanceStatus::Late));
        let batch = AttendanceBatch::assemble(7, day(), &marks, AttendanceStatus::Present);

        insta::assert_json_snapshot!(batch, @r#"
        {
          "class_id": 7,
          "date": "2024-09-02",
          "attendance_records": [
            {
              "student_id": 11,
              "status": "late"
            }
          ]
        }
        "#);
    }

    #[test]
    fn update_payload_omits_unset_fields() {
        let update = StudentUpdate {
            phone: Some("555-0101".into()),
            ..StudentUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "phone": "555-0101" }));
    }

    #[test]
    fn blank_search_is_not_sent() {
        let filter = StudentFilter {
            class_id: Some(2),
            search: Some("   ".into()),
        };
        assert_eq!(filter.to_params(), vec![("class_id", "2".to_owned())]);
    }

    #[test]
    fn student_decodes_with_sparse_fields() {
        let student: Student = serde_json::from_value(serde_json::json!({
            "id": 12,
            "student_id": "S-0012",
            "first_name": "Ada",
            "last_name": "Lovelace"
        }))
        .unwrap();
        assert_eq!(student.full_name(), "Ada Lovelace");
        assert!(student.is_active);
        assert_eq!(student.class_id, None);
    }

    #[test]
    fn attendance_total_saturates() {
        let today = AttendanceToday {
            present: u32::MAX,
            absent: 3,
            late: 1,
            excused: 0,
        };
        assert_eq!(today.total(), u32::MAX);

        let normal = AttendanceToday {
            present: 20,
            absent: 2,
            late: 1,
            excused: 1,
        };
        assert_eq!(normal.total(), 24);
    }
}
