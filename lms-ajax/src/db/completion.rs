//! Completion tracking lookups

use async_trait::async_trait;
use lms_common::Result;

use super::SqliteHost;
use crate::host::CompletionOracle;
use crate::model::{CompletionSnapshot, CompletionState, Course};

#[async_trait]
impl CompletionOracle for SqliteHost {
    async fn snapshot(&self, course: &Course, user_id: i64) -> Result<CompletionSnapshot> {
        if !course.completion_enabled {
            return Ok(CompletionSnapshot::default());
        }

        // Tracked users are actively enrolled with completion tracking on
        let user_tracked: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM user_enrolments
                WHERE courseid = ? AND userid = ? AND status = 0 AND completiontracked = 1
            )
            "#,
        )
        .bind(course.id)
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;

        let states = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT cmc.coursemoduleid, cmc.completionstate
            FROM course_modules_completion cmc
            JOIN course_modules cm ON cm.id = cmc.coursemoduleid
            WHERE cm.course = ? AND cmc.userid = ?
            "#,
        )
        .bind(course.id)
        .bind(user_id)
        .fetch_all(self.pool())
        .await?
        .into_iter()
        .map(|(cmid, state)| (cmid, CompletionState::from_db(state)))
        .collect();

        Ok(CompletionSnapshot {
            course_enabled: true,
            user_tracked,
            states,
        })
    }
}
