//! Database connection and host schema bootstrap
//!
//! In production the host application owns the schema and lms-ajax only
//! connects to it. `init_database` creates the host tables when they are
//! missing so that development setups and tests get the same layout.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Connect to an existing host database and apply pending migrations
pub async fn connect(db_path: &Path, busy_timeout_ms: u64) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::NotFound(format!(
            "Database not found: {}",
            db_path.display()
        )));
    }

    let pool = open_pool(db_path, false, busy_timeout_ms).await?;
    info!("Opened existing database: {}", db_path.display());

    crate::db::migrations::run_migrations(&pool).await?;
    Ok(pool)
}

/// Open or create a database, creating host tables if needed
pub async fn init_database(db_path: &Path, busy_timeout_ms: u64) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = open_pool(db_path, true, busy_timeout_ms).await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;
    crate::db::migrations::run_migrations(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the full host schema
///
/// One connection only: every SQLite `:memory:` connection is a separate
/// database.
pub async fn open_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    crate::db::migrations::run_migrations(&pool).await?;

    Ok(pool)
}

async fn open_pool(db_path: &Path, create: bool, busy_timeout_ms: u64) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(create)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(busy_timeout_ms));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create every host table used by lms-ajax (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_user_table(pool).await?;
    create_sessions_table(pool).await?;
    create_course_tables(pool).await?;
    create_completion_table(pool).await?;
    create_questionnaire_tables(pool).await?;
    Ok(())
}

async fn create_user_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            deleted INTEGER NOT NULL DEFAULT 0,
            suspended INTEGER NOT NULL DEFAULT 0,
            siteadmin INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    // userid 0 = anonymous session
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            sid TEXT PRIMARY KEY,
            userid INTEGER NOT NULL DEFAULT 0,
            sesskey TEXT NOT NULL,
            timecreated INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            timemodified INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_course_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS course (
            id INTEGER PRIMARY KEY,
            fullname TEXT NOT NULL,
            hiddensections INTEGER NOT NULL DEFAULT 0,
            enablecompletion INTEGER NOT NULL DEFAULT 1,
            guestaccess INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_enrolments (
            id INTEGER PRIMARY KEY,
            courseid INTEGER NOT NULL REFERENCES course(id),
            userid INTEGER NOT NULL REFERENCES user(id),
            status INTEGER NOT NULL DEFAULT 0,
            completiontracked INTEGER NOT NULL DEFAULT 1,
            UNIQUE(courseid, userid)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS capability_grants (
            id INTEGER PRIMARY KEY,
            userid INTEGER NOT NULL REFERENCES user(id),
            courseid INTEGER NOT NULL REFERENCES course(id),
            capability TEXT NOT NULL,
            UNIQUE(userid, courseid, capability)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // sequence: comma-separated course_modules ids in display order
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS course_sections (
            id INTEGER PRIMARY KEY,
            course INTEGER NOT NULL REFERENCES course(id),
            section INTEGER NOT NULL,
            name TEXT,
            visible INTEGER NOT NULL DEFAULT 1,
            available INTEGER NOT NULL DEFAULT 1,
            sequence TEXT NOT NULL DEFAULT '',
            UNIQUE(course, section)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // completion: 0 = none, 1 = manual, 2 = automatic
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS course_modules (
            id INTEGER PRIMARY KEY,
            course INTEGER NOT NULL REFERENCES course(id),
            section INTEGER NOT NULL REFERENCES course_sections(id),
            modname TEXT NOT NULL,
            instance INTEGER NOT NULL,
            name TEXT NOT NULL,
            visible INTEGER NOT NULL DEFAULT 1,
            visibleoncoursepage INTEGER NOT NULL DEFAULT 1,
            completion INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_completion_table(pool: &SqlitePool) -> Result<()> {
    // completionstate: 0 = incomplete, 1 = complete, 2 = pass, 3 = fail
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS course_modules_completion (
            id INTEGER PRIMARY KEY,
            coursemoduleid INTEGER NOT NULL REFERENCES course_modules(id),
            userid INTEGER NOT NULL REFERENCES user(id),
            completionstate INTEGER NOT NULL DEFAULT 0,
            timemodified INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
            UNIQUE(coursemoduleid, userid)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_questionnaire_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questionnaire_survey (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questionnaire (
            id INTEGER PRIMARY KEY,
            course INTEGER NOT NULL REFERENCES course(id),
            sid INTEGER NOT NULL REFERENCES questionnaire_survey(id),
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questionnaire_question (
            id INTEGER PRIMARY KEY,
            surveyid INTEGER NOT NULL REFERENCES questionnaire_survey(id),
            name TEXT NOT NULL,
            deleted TEXT NOT NULL DEFAULT 'n'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questionnaire_response (
            id INTEGER PRIMARY KEY,
            questionnaireid INTEGER NOT NULL REFERENCES questionnaire(id),
            userid INTEGER NOT NULL REFERENCES user(id),
            complete TEXT NOT NULL DEFAULT 'n',
            submitted INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Unique (response_id, question_id) index is added by migration v1
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS questionnaire_response_text (
            id INTEGER PRIMARY KEY,
            response_id INTEGER NOT NULL REFERENCES questionnaire_response(id),
            question_id INTEGER NOT NULL REFERENCES questionnaire_question(id),
            response TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
