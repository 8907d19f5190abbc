//! Host entities as seen by the dispatcher
//!
//! All of these are read-only snapshots of host rows, except the feedback
//! text written through [`crate::host::SurveyStore`].

use serde::Serialize;
use std::collections::HashMap;

/// Course row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: i64,
    pub fullname: String,
    pub hidden_sections: HiddenSections,
    pub completion_enabled: bool,
    pub guest_access: bool,
}

/// What the course does with hidden or unavailable sections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenSections {
    /// Shown collapsed as "not available" (host value 0)
    Collapsed,
    /// Completely invisible (host value 1)
    Invisible,
}

impl HiddenSections {
    pub fn from_db(value: i64) -> Self {
        if value == 1 {
            HiddenSections::Invisible
        } else {
            HiddenSections::Collapsed
        }
    }
}

/// Course section with its modules resolved in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    pub id: i64,
    pub section: i64,
    pub name: Option<String>,
    pub visible: bool,
    pub available: bool,
    pub modules: Vec<ModuleInfo>,
}

/// Course module (activity)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub id: i64,
    pub name: String,
    pub modname: String,
    pub instance: i64,
    pub visible: bool,
    pub visible_on_course_page: bool,
    pub completion: CompletionTracking,
}

/// Course-module row needed to locate a module's plugin instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseModuleRef {
    pub id: i64,
    pub course: i64,
    pub modname: String,
    pub instance: i64,
}

/// Per-module completion tracking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionTracking {
    None,
    Manual,
    Automatic,
}

impl CompletionTracking {
    pub fn from_db(value: i64) -> Self {
        match value {
            1 => CompletionTracking::Manual,
            2 => CompletionTracking::Automatic,
            _ => CompletionTracking::None,
        }
    }
}

/// Stored completion state for one (module, user)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Incomplete,
    Complete,
    CompletePass,
    CompleteFail,
}

impl CompletionState {
    pub fn from_db(value: i64) -> Self {
        match value {
            1 => CompletionState::Complete,
            2 => CompletionState::CompletePass,
            3 => CompletionState::CompleteFail,
            _ => CompletionState::Incomplete,
        }
    }
}

/// Derived completion view of one module for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionDetail {
    /// Completion is enabled for the course and the module
    pub has_completion: bool,
    /// The user is someone whose completion is tracked in this course
    pub is_tracked_user: bool,
    pub overall: CompletionState,
}

impl CompletionDetail {
    /// Only the plain COMPLETE state counts; pass/fail grades do not
    pub fn is_complete(&self) -> bool {
        self.overall == CompletionState::Complete
    }
}

/// Completion data for every module of a course, for one user
#[derive(Debug, Clone, Default)]
pub struct CompletionSnapshot {
    pub course_enabled: bool,
    pub user_tracked: bool,
    pub states: HashMap<i64, CompletionState>,
}

impl CompletionSnapshot {
    pub fn detail(&self, module: &ModuleInfo) -> CompletionDetail {
        let has_completion =
            self.course_enabled && module.completion != CompletionTracking::None;
        let overall = if has_completion {
            self.states
                .get(&module.id)
                .copied()
                .unwrap_or(CompletionState::Incomplete)
        } else {
            CompletionState::Incomplete
        };

        CompletionDetail {
            has_completion,
            is_tracked_user: has_completion && self.user_tracked,
            overall,
        }
    }
}

/// Host user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    pub deleted: bool,
    pub suspended: bool,
    pub site_admin: bool,
}

impl UserAccount {
    pub fn is_active(&self) -> bool {
        !self.deleted && !self.suspended
    }
}

/// Capabilities consulted by the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewHiddenSections,
    ViewHiddenActivities,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewHiddenSections => "moodle/course:viewhiddensections",
            Capability::ViewHiddenActivities => "moodle/course:viewhiddenactivities",
        }
    }
}

/// Questionnaire instance; `sid` is the survey its questions belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionnaireRef {
    pub id: i64,
    pub sid: i64,
}

/// One user's submission to a questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseRef {
    pub id: i64,
    pub questionnaire_id: i64,
}

/// Authenticated caller, threaded through every action
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: UserAccount,
    pub course: Course,
}

// ========================================
// Response bodies
// ========================================

/// List-shaped action output
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Results<T> {
    pub results: Vec<T>,
}

/// `activitycompletion` entry
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SectionCompletion {
    pub name: Option<String>,
    pub id: i64,
    pub modules: Vec<ModuleCompletion>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModuleCompletion {
    pub name: String,
    pub id: i64,
    pub started: bool,
    pub completed: bool,
}

/// `participation` entry
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SectionParticipation {
    pub name: Option<String>,
    pub participated: bool,
}
