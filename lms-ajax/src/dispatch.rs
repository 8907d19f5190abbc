//! Endpoint dispatcher
//!
//! Precondition order:
//! 1. Session cookie + sesskey (403)
//! 2. `action` and `id` parameters (400)
//! 3. Course exists (404)
//! 4. Logged in with at least guest access to the course (401)
//!
//! Unknown actions then produce an empty `{}` body.

use lms_common::api::params::{optional_int, required_alphanum, required_int, required_raw};
use lms_common::api::session::{validate_session, SessionError};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::completion::{activity_completion, participation, VisibilityPolicy};
use crate::error::{ApiError, ApiResult};
use crate::feedback::{save_feedback, FeedbackRequest, FeedbackStatus};
use crate::model::{Capability, CompletionSnapshot, RequestContext, Results, SectionInfo};
use crate::AppState;

/// Supported actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ActivityCompletion,
    Participation,
    SaveFeedback,
}

impl Action {
    /// Match a cleaned `action` parameter
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "activitycompletion" => Some(Action::ActivityCompletion),
            "participation" => Some(Action::Participation),
            "savefeedback" => Some(Action::SaveFeedback),
            _ => None,
        }
    }
}

/// Raw request parameters (query string or form body)
#[derive(Debug, Clone, Default)]
pub struct AjaxParams(pub HashMap<String, String>);

impl AjaxParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Course-module id for `savefeedback`
    ///
    /// `context` is still accepted for older callers but logged.
    pub fn course_module_id(&self) -> ApiResult<i64> {
        if let Some(value) = self.get("cmid") {
            return Ok(optional_int("cmid", Some(value), 0)?);
        }
        if let Some(value) = self.get("context") {
            warn!("Deprecated parameter 'context' used as course module id; send 'cmid'");
            return Ok(optional_int("context", Some(value), 0)?);
        }
        Ok(0)
    }
}

/// Settings the dispatcher needs from bootstrap config
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub session_cookie: String,
    pub session_timeout_secs: i64,
}

/// Validate preconditions and run the requested action
///
/// `now` is Unix seconds, used for the session idle check.
pub async fn dispatch(
    state: &AppState,
    session_id: Option<&str>,
    params: &AjaxParams,
    now: i64,
) -> ApiResult<Value> {
    // 1. Anti-forgery
    let sid = session_id.ok_or(SessionError::MissingSession)?;
    let record = state.sessions.find_session(sid).await?;
    let session = validate_session(
        record,
        params.get("sesskey"),
        now,
        state.settings.session_timeout_secs,
    )?;

    // 2. Parameters
    let action = required_alphanum("action", params.get("action"))?;
    let course_id = required_int("id", params.get("id"))?;

    // 3. Course
    let course = state
        .courses
        .course(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {} not found", course_id)))?;

    // 4. Login and course access
    if !session.is_logged_in() {
        return Err(ApiError::Unauthorized("Not logged in".to_string()));
    }
    let user = state
        .access
        .user(session.userid)
        .await?
        .filter(|user| user.is_active())
        .ok_or_else(|| ApiError::Unauthorized("Not logged in".to_string()))?;
    if !state.access.can_access_course(&user, &course).await? {
        return Err(ApiError::Unauthorized(format!(
            "No access to course {}",
            course.id
        )));
    }

    let ctx = RequestContext { user, course };

    let Some(action) = Action::from_param(&action) else {
        debug!("Unknown action '{}' - returning empty response", action);
        return Ok(json!({}));
    };

    debug!(
        "Dispatching {:?} for user {} ({}) in course {} ({})",
        action, ctx.user.id, ctx.user.username, ctx.course.id, ctx.course.fullname
    );

    match action {
        // `results` is always present, `[]` when no section is shown
        Action::ActivityCompletion => {
            let (sections, policy, snapshot) = load_course_view(state, &ctx).await?;
            let results = activity_completion(&sections, &policy, &snapshot);
            to_json(&Results { results })
        }
        Action::Participation => {
            let (sections, policy, snapshot) = load_course_view(state, &ctx).await?;
            let results = participation(&sections, &policy, &snapshot);
            to_json(&Results { results })
        }
        Action::SaveFeedback => {
            let value = required_raw("value", params.get("value"))?;
            let question_name = required_alphanum("name", params.get("name"))?;
            let request = FeedbackRequest {
                cmid: params.course_module_id()?,
                question_name,
                value: value.to_string(),
            };

            let outcome = save_feedback(
                state.courses.as_ref(),
                state.surveys.as_ref(),
                &ctx,
                &request,
            )
            .await?;
            to_json(&FeedbackStatus::from(&outcome))
        }
    }
}

async fn load_course_view(
    state: &AppState,
    ctx: &RequestContext,
) -> ApiResult<(Vec<SectionInfo>, VisibilityPolicy, CompletionSnapshot)> {
    let sections = state.courses.sections(ctx.course.id).await?;
    let policy = VisibilityPolicy {
        can_view_hidden_sections: state
            .access
            .has_capability(&ctx.user, ctx.course.id, Capability::ViewHiddenSections)
            .await?,
        can_view_hidden_activities: state
            .access
            .has_capability(&ctx.user, ctx.course.id, Capability::ViewHiddenActivities)
            .await?,
        hidden_sections: ctx.course.hidden_sections,
    };
    let snapshot = state.completion.snapshot(&ctx.course, ctx.user.id).await?;

    Ok((sections, policy, snapshot))
}

fn to_json<T: serde::Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}
