//! Tests for database bootstrap
//!
//! Covers:
//! - Automatic creation of a missing database with the host schema
//! - Reopening an existing database
//! - `connect` refusing a missing database
//! - Session lookup against the created schema

use lms_common::api::session::load_session;
use lms_common::db::{connect, get_schema_version, init_database, CURRENT_SCHEMA_VERSION};
use tempfile::TempDir;

const HOST_TABLES: &[&str] = &[
    "user",
    "sessions",
    "course",
    "user_enrolments",
    "capability_grants",
    "course_sections",
    "course_modules",
    "course_modules_completion",
    "questionnaire",
    "questionnaire_survey",
    "questionnaire_question",
    "questionnaire_response",
    "questionnaire_response_text",
    "schema_version",
];

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("nested").join("lms.db");

    let pool = init_database(&db_path, 5000).await.expect("init should succeed");

    assert!(db_path.exists(), "Database file was not created");

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in HOST_TABLES {
        assert!(tables.iter().any(|t| t == expected), "Missing table: {}", expected);
    }

    assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("lms.db");

    let pool1 = init_database(&db_path, 5000).await.unwrap();
    pool1.close().await;

    let pool2 = connect(&db_path, 5000).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_connect_rejects_missing_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("missing.db");

    let result = connect(&db_path, 5000).await;

    assert!(result.is_err());
    assert!(!db_path.exists(), "connect must not create the database");
}

#[tokio::test]
async fn test_session_lookup() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("lms.db"), 5000).await.unwrap();

    sqlx::query("INSERT INTO sessions (sid, userid, sesskey, timemodified) VALUES ('s1', 3, 'abc', 100)")
        .execute(&pool)
        .await
        .unwrap();

    let found = load_session(&pool, "s1").await.unwrap().expect("session exists");
    assert_eq!(found.userid, 3);
    assert_eq!(found.sesskey, "abc");
    assert_eq!(found.timemodified, 100);

    assert!(load_session(&pool, "s2").await.unwrap().is_none());
}
