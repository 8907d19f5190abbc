//! Interfaces to the host application
//!
//! The dispatcher never touches host tables directly. Each concern is a
//! trait; [`crate::db::SqliteHost`] implements all of them.

use async_trait::async_trait;
use lms_common::api::session::{SessionError, SessionRecord};
use lms_common::Result;

use crate::model::{
    Capability, CompletionSnapshot, Course, CourseModuleRef, QuestionnaireRef, ResponseRef,
    SectionInfo, UserAccount,
};

/// Host session store
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn find_session(&self, sid: &str) -> std::result::Result<Option<SessionRecord>, SessionError>;
}

/// Course, section and module metadata
#[async_trait]
pub trait CourseRegistry: Send + Sync {
    async fn course(&self, course_id: i64) -> Result<Option<Course>>;

    /// Present sections in ascending section-number order
    async fn sections(&self, course_id: i64) -> Result<Vec<SectionInfo>>;

    async fn course_module(&self, cmid: i64) -> Result<Option<CourseModuleRef>>;
}

/// Users, course access and capabilities
#[async_trait]
pub trait CapabilityChecker: Send + Sync {
    async fn user(&self, user_id: i64) -> Result<Option<UserAccount>>;

    /// At least guest access: site admin, active enrolment, or guest-enabled course
    async fn can_access_course(&self, user: &UserAccount, course: &Course) -> Result<bool>;

    async fn has_capability(
        &self,
        user: &UserAccount,
        course_id: i64,
        capability: Capability,
    ) -> Result<bool>;
}

/// Completion tracking
#[async_trait]
pub trait CompletionOracle: Send + Sync {
    async fn snapshot(&self, course: &Course, user_id: i64) -> Result<CompletionSnapshot>;
}

/// Questionnaire plugin tables
#[async_trait]
pub trait SurveyStore: Send + Sync {
    async fn questionnaire(&self, questionnaire_id: i64) -> Result<Option<QuestionnaireRef>>;

    /// Completed responses of one user, oldest first
    async fn user_responses(&self, questionnaire_id: i64, user_id: i64) -> Result<Vec<ResponseRef>>;

    /// Non-deleted question with the given name in a survey
    async fn find_question(&self, survey_id: i64, name: &str) -> Result<Option<i64>>;

    /// Insert or overwrite the text answer for (response, question)
    async fn upsert_response_text(&self, response_id: i64, question_id: i64, value: &str)
        -> Result<()>;
}
