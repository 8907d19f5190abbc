//! sqlx implementation of the host interfaces
//!
//! One `SqliteHost` backs every trait in [`crate::host`]; each concern lives
//! in its own submodule.

use async_trait::async_trait;
use lms_common::api::session::{load_session, SessionError, SessionRecord};
use sqlx::SqlitePool;

use crate::host::SessionValidator;

mod access;
mod completion;
mod courses;
mod survey;

/// Host database handle
#[derive(Clone)]
pub struct SqliteHost {
    pool: SqlitePool,
}

impl SqliteHost {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl SessionValidator for SqliteHost {
    async fn find_session(&self, sid: &str) -> Result<Option<SessionRecord>, SessionError> {
        load_session(&self.pool, sid).await
    }
}
