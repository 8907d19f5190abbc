//! Schema migrations owned by lms-ajax
//!
//! The host owns its tables; lms-ajax only adds what the atomic feedback
//! upsert needs. Versions are tracked in a `schema_version` table.
//!
//! # Migration Guidelines
//!
//! 1. Never modify existing migrations
//! 2. Each migration must be idempotent
//! 3. A migration whose prerequisite tables are absent reports "not applied"
//!    and is retried on the next startup

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Name of the unique index backing the feedback upsert
pub const RESPONSE_TEXT_UNIQUE_INDEX: &str = "questionnaire_response_text_resp_quest_uix";

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Latest applied schema version (0 when none)
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    create_schema_version_table(pool).await?;

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
    )
    .bind(table)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        if migrate_v1(pool).await? {
            set_schema_version(pool, 1).await?;
            info!("✓ Migration v1 completed");
        } else {
            warn!("Migration v1 not applied; will retry on next startup");
        }
    }

    Ok(())
}

/// Migration v1: unique (response_id, question_id) on questionnaire_response_text
///
/// **Background:** The host schema allows duplicate rows per
/// (response, question). Duplicates are collapsed to the newest row (highest
/// id) before the unique index is created, so existing databases upgrade
/// without manual cleanup.
async fn migrate_v1(pool: &SqlitePool) -> Result<bool> {
    info!("Running migration v1: unique index on questionnaire_response_text");

    if !table_exists(pool, "questionnaire_response_text").await? {
        warn!("  questionnaire_response_text table not found - questionnaire plugin missing?");
        return Ok(false);
    }

    let mut tx = pool.begin().await?;

    let removed = sqlx::query(
        r#"
        DELETE FROM questionnaire_response_text
        WHERE id NOT IN (
            SELECT MAX(id) FROM questionnaire_response_text
            GROUP BY response_id, question_id
        )
        "#,
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if removed > 0 {
        warn!("  Removed {} duplicate response text rows", removed);
    }

    sqlx::query(&format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON questionnaire_response_text (response_id, question_id)",
        RESPONSE_TEXT_UNIQUE_INDEX
    ))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("  ✓ Created {}", RESPONSE_TEXT_UNIQUE_INDEX);
    Ok(true)
}
