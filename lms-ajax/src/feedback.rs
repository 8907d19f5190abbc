//! Feedback text written into questionnaire responses
//!
//! A course module points at a questionnaire; the questionnaire points at the
//! survey holding its questions. Every completed response of the caller gets
//! its answer to the named question overwritten.

use lms_common::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::host::{CourseRegistry, SurveyStore};
use crate::model::RequestContext;

/// Module type whose instances are questionnaires
pub const QUESTIONNAIRE_MODNAME: &str = "questionnaire";

/// `savefeedback` input after parameter cleaning
#[derive(Debug, Clone)]
pub struct FeedbackRequest {
    pub cmid: i64,
    pub question_name: String,
    pub value: String,
}

/// Result of a save attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// Number of (response, question) rows written
    Saved(usize),
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyValue,
    ModuleNotFound,
    NotAQuestionnaire,
    WrongCourse,
    QuestionnaireNotFound,
    NoMatchingQuestion,
}

/// In-band status body: `{"status": "ok"}` or `{"status": "error"}`
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FeedbackStatus {
    pub status: &'static str,
}

impl From<&FeedbackOutcome> for FeedbackStatus {
    fn from(outcome: &FeedbackOutcome) -> Self {
        let status = match outcome {
            FeedbackOutcome::Saved(_) => "ok",
            FeedbackOutcome::Rejected(_) => "error",
        };
        FeedbackStatus { status }
    }
}

/// `""` and `"0"` both count as no feedback
pub fn is_empty_value(value: &str) -> bool {
    value.is_empty() || value == "0"
}

/// Save feedback text for the caller's responses to a questionnaire module
pub async fn save_feedback(
    registry: &dyn CourseRegistry,
    surveys: &dyn SurveyStore,
    ctx: &RequestContext,
    request: &FeedbackRequest,
) -> Result<FeedbackOutcome> {
    if is_empty_value(&request.value) {
        return Ok(FeedbackOutcome::Rejected(RejectReason::EmptyValue));
    }

    let Some(module) = registry.course_module(request.cmid).await? else {
        warn!("savefeedback: course module {} not found", request.cmid);
        return Ok(FeedbackOutcome::Rejected(RejectReason::ModuleNotFound));
    };

    if module.modname != QUESTIONNAIRE_MODNAME {
        warn!(
            "savefeedback: course module {} is a {}, not a questionnaire",
            module.id, module.modname
        );
        return Ok(FeedbackOutcome::Rejected(RejectReason::NotAQuestionnaire));
    }

    if module.course != ctx.course.id {
        warn!(
            "savefeedback: course module {} belongs to course {}, request was for course {}",
            module.id, module.course, ctx.course.id
        );
        return Ok(FeedbackOutcome::Rejected(RejectReason::WrongCourse));
    }

    if surveys.questionnaire(module.instance).await?.is_none() {
        warn!("savefeedback: questionnaire {} not found", module.instance);
        return Ok(FeedbackOutcome::Rejected(RejectReason::QuestionnaireNotFound));
    }

    let responses = surveys.user_responses(module.instance, ctx.user.id).await?;
    debug!(
        "savefeedback: {} response(s) for user {} in questionnaire {}",
        responses.len(),
        ctx.user.id,
        module.instance
    );

    let mut saved = 0;
    for response in responses {
        // Each response resolves its own parent questionnaire and survey
        let Some(questionnaire) = surveys.questionnaire(response.questionnaire_id).await? else {
            continue;
        };

        let Some(question_id) = surveys
            .find_question(questionnaire.sid, &request.question_name)
            .await?
        else {
            continue;
        };

        surveys
            .upsert_response_text(response.id, question_id, &request.value)
            .await?;
        saved += 1;
    }

    if saved == 0 {
        debug!(
            "savefeedback: no question named '{}' in user {}'s responses",
            request.question_name, ctx.user.id
        );
        return Ok(FeedbackOutcome::Rejected(RejectReason::NoMatchingQuestion));
    }

    info!(
        "savefeedback: wrote '{}' for {} (user {}) in course '{}' on {} response(s)",
        request.question_name, ctx.user.username, ctx.user.id, ctx.course.fullname, saved
    );
    Ok(FeedbackOutcome::Saved(saved))
}
