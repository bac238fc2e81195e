#![allow(clippy::unwrap_used)]
// Integration tests for `Portal` flows using wiremock.

use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rollcall_api::{AttendanceStatus, Identity, Student};
use rollcall_core::{ClientConfig, NO_CLASS_SELECTED, NO_STUDENTS, Portal, SessionLocation};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::new(Url::parse(&server.uri()).unwrap());
    config.search_debounce = Duration::from_millis(50);
    config
}

async fn setup() -> (MockServer, Portal) {
    let server = MockServer::start().await;
    let portal = Portal::open(config_for(&server)).unwrap();
    (server, portal)
}

fn roster(count: i64) -> Vec<Student> {
    (1..=count)
        .map(|id| {
            serde_json::from_value(json!({
                "id": id,
                "student_id": format!("S-{id:04}"),
                "first_name": "Student",
                "last_name": id.to_string(),
                "class_id": 4
            }))
            .unwrap()
        })
        .collect()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
}

// ── Bulk submission ─────────────────────────────────────────────────

#[tokio::test]
async fn test_whole_class_goes_out_in_one_call() {
    let (server, portal) = setup().await;

    Mock::given(method("POST"))
        .and(path("/attendance/bulk"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Attendance marked" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut sheet = portal.attendance_sheet(Some(4), &roster(30)).with_date(day());
    sheet.mark(3, AttendanceStatus::Absent);
    sheet.note(3, "dentist");

    let outcome = sheet.submit(portal.client().attendance()).await;
    assert!(outcome.is_success(), "submission failed: {outcome:?}");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["class_id"], 4);
    assert_eq!(body["date"], "2024-09-02");
    let records = body["attendance_records"].as_array().unwrap();
    assert_eq!(records.len(), 30);
    assert_eq!(records[0]["status"], "present");
    assert_eq!(records[2]["status"], "absent");
    assert_eq!(records[2]["notes"], "dentist");
}

#[tokio::test]
async fn test_sheet_without_class_never_reaches_network() {
    let (server, portal) = setup().await;

    Mock::given(method("POST"))
        .and(path("/attendance/bulk"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let sheet = portal.attendance_sheet(None, &roster(3));
    let outcome = sheet.submit(portal.client().attendance()).await;
    assert_eq!(outcome.message(), Some(NO_CLASS_SELECTED));

    let empty = portal.attendance_sheet(Some(4), &[]);
    let outcome = empty.submit(portal.client().attendance()).await;
    assert_eq!(outcome.message(), Some(NO_STUDENTS));
}

#[tokio::test]
async fn test_rejected_batch_surfaces_detail() {
    let (server, portal) = setup().await;

    Mock::given(method("POST"))
        .and(path("/attendance/bulk"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "detail": "Attendance already marked for this date" })),
        )
        .mount(&server)
        .await;

    let sheet = portal.attendance_sheet(Some(4), &roster(2));
    let outcome = sheet.submit(portal.client().attendance()).await;
    assert_eq!(
        outcome.message(),
        Some("Attendance already marked for this date")
    );
}

// ── Search ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_student_search_sends_only_the_settled_term() {
    let (server, portal) = setup().await;

    Mock::given(method("GET"))
        .and(path("/students"))
        .and(query_param("search", "ada"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 12,
            "student_id": "S-0012",
            "first_name": "Ada",
            "last_name": "Lovelace"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let search = portal.student_search();
    search.submit("a");
    search.submit("ad");
    search.submit("ada");
    search.settled().await;

    let latest = search.latest().unwrap();
    assert_eq!(latest.term, "ada");
    let students = latest.outcome.data().unwrap();
    assert_eq!(students[0].full_name(), "Ada Lovelace");
}

// ── Session persistence ─────────────────────────────────────────────

#[tokio::test]
async fn test_file_session_survives_reopen() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");

    let mut config = config_for(&server);
    config.session = SessionLocation::File(session_path.clone());

    {
        let portal = Portal::open(config.clone()).unwrap();
        let session = portal.client().session();
        session
            .save_credential(&"tok-9".to_owned().into(), "bearer")
            .unwrap();
        session
            .save_identity(Identity::new(7, "grace@school.test", "Grace Hopper", "teacher"))
            .unwrap();
    }

    let reopened = Portal::open(config).unwrap();
    assert!(reopened.client().auth().is_logged_in());
    assert_eq!(
        reopened.client().auth().cached_identity().email.as_deref(),
        Some("grace@school.test")
    );
    assert!(session_path.exists());
}

#[tokio::test]
async fn test_corrupt_session_file_opens_signed_out() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");
    std::fs::write(&session_path, "{not json").unwrap();

    let mut config = config_for(&server);
    config.session = SessionLocation::File(session_path.clone());

    let portal = Portal::open(config).unwrap();
    assert!(!portal.client().auth().is_logged_in());
    assert!(!portal.client().session().has_credential());
    assert!(dir.path().join("session.json.corrupt").exists());
    portal.client().session().clear_all().unwrap();
}
