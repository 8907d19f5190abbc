//! Questionnaire plugin tables

use async_trait::async_trait;
use lms_common::Result;

use super::SqliteHost;
use crate::host::SurveyStore;
use crate::model::{QuestionnaireRef, ResponseRef};

#[async_trait]
impl SurveyStore for SqliteHost {
    async fn questionnaire(&self, questionnaire_id: i64) -> Result<Option<QuestionnaireRef>> {
        let row = sqlx::query_as::<_, (i64, i64)>("SELECT id, sid FROM questionnaire WHERE id = ?")
            .bind(questionnaire_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.map(|(id, sid)| QuestionnaireRef { id, sid }))
    }

    async fn user_responses(&self, questionnaire_id: i64, user_id: i64) -> Result<Vec<ResponseRef>> {
        let rows = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT id, questionnaireid
            FROM questionnaire_response
            WHERE questionnaireid = ? AND userid = ? AND complete = 'y'
            ORDER BY submitted ASC, id ASC
            "#,
        )
        .bind(questionnaire_id)
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, questionnaire_id)| ResponseRef { id, questionnaire_id })
            .collect())
    }

    async fn find_question(&self, survey_id: i64, name: &str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM questionnaire_question
            WHERE surveyid = ? AND name = ? AND deleted = 'n'
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(survey_id)
        .bind(name)
        .fetch_optional(self.pool())
        .await?;

        Ok(id)
    }

    async fn upsert_response_text(
        &self,
        response_id: i64,
        question_id: i64,
        value: &str,
    ) -> Result<()> {
        // Relies on the unique (response_id, question_id) index from migration v1
        sqlx::query(
            r#"
            INSERT INTO questionnaire_response_text (response_id, question_id, response)
            VALUES (?, ?, ?)
            ON CONFLICT(response_id, question_id) DO UPDATE SET response = excluded.response
            "#,
        )
        .bind(response_id)
        .bind(question_id)
        .bind(value)
        .execute(self.pool())
        .await?;

        Ok(())
    }
}
