//! Shared fixtures for lms-ajax integration tests
//!
//! Seeds an in-memory host database:
//!
//! | section | id | visible | modules (completion mode) |
//! |---|---|---|---|
//! | 0 "Introduction" | 10 | yes | 100 Welcome (manual), 101 Readme (none) |
//! | 1 "Week 1" | 11 | yes | 102 Quiz (auto), 104 Course feedback (none, questionnaire) |
//! | 3 "Instructor notes" | 13 | no | 103 Answers (manual) |
//!
//! Course 1 hides hidden sections completely. The student (user 2) has
//! completed modules 100 and 103.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use lms_ajax::dispatch::DispatchSettings;
use lms_ajax::{build_router, AppState};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::util::ServiceExt;

pub const COOKIE: &str = "LMSSESSION";

/// (session id, sesskey) pairs seeded by `setup_test_db`
pub const STUDENT: (&str, &str) = ("sess-student", "sk-student");
pub const ADMIN: (&str, &str) = ("sess-admin", "sk-admin");
pub const STRANGER: (&str, &str) = ("sess-stranger", "sk-stranger");
pub const SUSPENDED: (&str, &str) = ("sess-suspended", "sk-suspended");
pub const ANONYMOUS: (&str, &str) = ("sess-anon", "sk-anon");
pub const EXPIRED: (&str, &str) = ("sess-expired", "sk-expired");

const SEED: &[&str] = &[
    "INSERT INTO user (id, username, siteadmin, suspended) VALUES (1, 'admin', 1, 0), (2, 'student', 0, 0), (3, 'stranger', 0, 0), (4, 'suspended', 0, 1)",
    "INSERT INTO sessions (sid, userid, sesskey) VALUES ('sess-student', 2, 'sk-student'), ('sess-admin', 1, 'sk-admin'), ('sess-stranger', 3, 'sk-stranger'), ('sess-suspended', 4, 'sk-suspended'), ('sess-anon', 0, 'sk-anon')",
    "INSERT INTO sessions (sid, userid, sesskey, timemodified) VALUES ('sess-expired', 2, 'sk-expired', 0)",
    "INSERT INTO course (id, fullname, hiddensections, enablecompletion, guestaccess) VALUES (1, 'Rust 101', 1, 1, 0), (2, 'Open Day', 0, 1, 1)",
    "INSERT INTO user_enrolments (courseid, userid, completiontracked) VALUES (1, 2, 1), (1, 4, 1)",
    "INSERT INTO course_sections (id, course, section, name, visible, available, sequence) VALUES (10, 1, 0, 'Introduction', 1, 1, '100,101'), (11, 1, 1, 'Week 1', 1, 1, '102,104'), (13, 1, 3, 'Instructor notes', 0, 1, '103'), (20, 2, 0, NULL, 1, 1, '')",
    "INSERT INTO course_modules (id, course, section, modname, instance, name, completion) VALUES (100, 1, 10, 'page', 1, 'Welcome', 1), (101, 1, 10, 'page', 2, 'Readme', 0), (102, 1, 11, 'quiz', 1, 'Quiz', 2), (103, 1, 13, 'page', 3, 'Answers', 1), (104, 1, 11, 'questionnaire', 7, 'Course feedback', 0)",
    "INSERT INTO course_modules_completion (coursemoduleid, userid, completionstate) VALUES (100, 2, 1), (103, 2, 1), (102, 2, 0)",
    "INSERT INTO questionnaire_survey (id, name) VALUES (50, 'End of course')",
    "INSERT INTO questionnaire (id, course, sid, name) VALUES (7, 1, 50, 'Course feedback')",
    "INSERT INTO questionnaire_question (id, surveyid, name) VALUES (61, 50, 'notes'), (62, 50, 'rating')",
    "INSERT INTO questionnaire_response (id, questionnaireid, userid, complete, submitted) VALUES (70, 7, 2, 'y', 100), (71, 7, 3, 'y', 100)",
];

/// Test helper: in-memory host database with the fixture course
pub async fn setup_test_db() -> SqlitePool {
    let pool = lms_common::db::open_in_memory()
        .await
        .expect("Should create in-memory database");

    for sql in SEED {
        sqlx::query(sql)
            .execute(&pool)
            .await
            .unwrap_or_else(|e| panic!("Seed failed: {}\n{}", e, sql));
    }

    pool
}

/// Test helper: app over the given database
pub fn setup_app(db: SqlitePool) -> Router {
    let state = AppState::new(
        db,
        DispatchSettings {
            session_cookie: COOKIE.to_string(),
            session_timeout_secs: 7200,
        },
    );
    build_router(state)
}

/// Test helper: GET /api/ajax as the given session
///
/// `sesskey` is appended automatically.
pub fn ajax_get(session: (&str, &str), query: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/api/ajax?sesskey={}&{}", session.1, query))
        .header("cookie", format!("{}={}", COOKIE, session.0))
        .body(Body::empty())
        .unwrap()
}

/// Test helper: POST /api/ajax with a urlencoded form body
pub fn ajax_post(session: (&str, &str), form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/ajax")
        .header("cookie", format!("{}={}", COOKIE, session.0))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(format!("sesskey={}&{}", session.1, form)))
        .unwrap()
}

/// Test helper: send a request, returning status and parsed JSON body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).expect("Should parse JSON");
    (status, body)
}

/// Stored feedback rows as (response_id, question_id, text)
pub async fn stored_feedback(db: &SqlitePool) -> Vec<(i64, i64, String)> {
    sqlx::query_as(
        "SELECT response_id, question_id, response FROM questionnaire_response_text ORDER BY response_id, question_id",
    )
    .fetch_all(db)
    .await
    .unwrap()
}
