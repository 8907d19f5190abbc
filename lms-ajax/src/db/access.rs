//! Users, enrolments and capability grants

use async_trait::async_trait;
use lms_common::Result;

use super::SqliteHost;
use crate::host::CapabilityChecker;
use crate::model::{Capability, Course, UserAccount};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    deleted: i64,
    suspended: i64,
    siteadmin: i64,
}

#[async_trait]
impl CapabilityChecker for SqliteHost {
    async fn user(&self, user_id: i64) -> Result<Option<UserAccount>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, deleted, suspended, siteadmin FROM user WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|row| UserAccount {
            id: row.id,
            username: row.username,
            deleted: row.deleted != 0,
            suspended: row.suspended != 0,
            site_admin: row.siteadmin != 0,
        }))
    }

    async fn can_access_course(&self, user: &UserAccount, course: &Course) -> Result<bool> {
        if user.site_admin || course.guest_access {
            return Ok(true);
        }

        let enrolled: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_enrolments WHERE courseid = ? AND userid = ? AND status = 0)",
        )
        .bind(course.id)
        .bind(user.id)
        .fetch_one(self.pool())
        .await?;

        Ok(enrolled)
    }

    async fn has_capability(
        &self,
        user: &UserAccount,
        course_id: i64,
        capability: Capability,
    ) -> Result<bool> {
        if user.site_admin {
            return Ok(true);
        }

        let granted: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM capability_grants WHERE userid = ? AND courseid = ? AND capability = ?)",
        )
        .bind(user.id)
        .bind(course_id)
        .bind(capability.as_str())
        .fetch_one(self.pool())
        .await?;

        Ok(granted)
    }
}
