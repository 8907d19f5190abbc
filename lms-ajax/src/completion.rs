//! Section/module completion aggregation
//!
//! Both `activitycompletion` and `participation` walk the same filtered view
//! of the course: sections passing [`section_is_shown`], and within them the
//! modules passing [`module_is_shown`] that have completion tracking.

use crate::model::{
    CompletionDetail, CompletionSnapshot, HiddenSections, ModuleCompletion, ModuleInfo,
    SectionCompletion, SectionInfo, SectionParticipation,
};

/// Caller-dependent visibility inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityPolicy {
    pub can_view_hidden_sections: bool,
    pub can_view_hidden_activities: bool,
    pub hidden_sections: HiddenSections,
}

/// Visible-and-available sections are always shown. Others are shown to
/// callers who can view hidden sections, or when the course only collapses
/// them instead of hiding them.
pub fn section_is_shown(section: &SectionInfo, policy: &VisibilityPolicy) -> bool {
    if section.visible && section.available {
        return true;
    }
    policy.can_view_hidden_sections || policy.hidden_sections != HiddenSections::Invisible
}

pub fn module_is_shown(module: &ModuleInfo, policy: &VisibilityPolicy) -> bool {
    module.visible_on_course_page && (module.visible || policy.can_view_hidden_activities)
}

/// Shown modules of a section that have completion tracking, with details
pub fn tracked_modules<'a>(
    section: &'a SectionInfo,
    policy: &'a VisibilityPolicy,
    snapshot: &'a CompletionSnapshot,
) -> impl Iterator<Item = (&'a ModuleInfo, CompletionDetail)> + 'a {
    section
        .modules
        .iter()
        .filter(move |module| module_is_shown(module, policy))
        .map(move |module| (module, snapshot.detail(module)))
        .filter(|(_, detail)| detail.has_completion)
}

/// `activitycompletion`: per shown section, its tracked modules
pub fn activity_completion(
    sections: &[SectionInfo],
    policy: &VisibilityPolicy,
    snapshot: &CompletionSnapshot,
) -> Vec<SectionCompletion> {
    sections
        .iter()
        .filter(|section| section_is_shown(section, policy))
        .map(|section| SectionCompletion {
            name: section.name.clone(),
            id: section.id,
            modules: tracked_modules(section, policy, snapshot)
                .map(|(module, detail)| ModuleCompletion {
                    name: module.name.clone(),
                    id: module.id,
                    started: detail.is_tracked_user,
                    completed: detail.is_complete(),
                })
                .collect(),
        })
        .collect()
}

/// `participation`: per shown section, whether any tracked module is complete
pub fn participation(
    sections: &[SectionInfo],
    policy: &VisibilityPolicy,
    snapshot: &CompletionSnapshot,
) -> Vec<SectionParticipation> {
    sections
        .iter()
        .filter(|section| section_is_shown(section, policy))
        .map(|section| SectionParticipation {
            name: section.name.clone(),
            participated: tracked_modules(section, policy, snapshot)
                .any(|(_, detail)| detail.is_complete()),
        })
        .collect()
}
