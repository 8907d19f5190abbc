//! Course, section and module lookups

use async_trait::async_trait;
use lms_common::Result;
use std::collections::HashMap;
use tracing::debug;

use super::SqliteHost;
use crate::host::CourseRegistry;
use crate::model::{
    CompletionTracking, Course, CourseModuleRef, HiddenSections, ModuleInfo, SectionInfo,
};

#[derive(sqlx::FromRow)]
struct CourseRow {
    id: i64,
    fullname: String,
    hiddensections: i64,
    enablecompletion: i64,
    guestaccess: i64,
}

#[derive(sqlx::FromRow)]
struct SectionRow {
    id: i64,
    section: i64,
    name: Option<String>,
    visible: i64,
    available: i64,
    sequence: String,
}

#[derive(sqlx::FromRow)]
struct ModuleRow {
    id: i64,
    name: String,
    modname: String,
    instance: i64,
    visible: i64,
    visibleoncoursepage: i64,
    completion: i64,
}

impl From<ModuleRow> for ModuleInfo {
    fn from(row: ModuleRow) -> Self {
        ModuleInfo {
            id: row.id,
            name: row.name,
            modname: row.modname,
            instance: row.instance,
            visible: row.visible != 0,
            visible_on_course_page: row.visibleoncoursepage != 0,
            completion: CompletionTracking::from_db(row.completion),
        }
    }
}

/// Parse a section `sequence` column into course-module ids
///
/// Blank and non-numeric entries are ignored.
pub fn parse_sequence(sequence: &str) -> Vec<i64> {
    sequence
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

#[async_trait]
impl CourseRegistry for SqliteHost {
    async fn course(&self, course_id: i64) -> Result<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(
            "SELECT id, fullname, hiddensections, enablecompletion, guestaccess FROM course WHERE id = ?",
        )
        .bind(course_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|row| Course {
            id: row.id,
            fullname: row.fullname,
            hidden_sections: HiddenSections::from_db(row.hiddensections),
            completion_enabled: row.enablecompletion != 0,
            guest_access: row.guestaccess != 0,
        }))
    }

    async fn sections(&self, course_id: i64) -> Result<Vec<SectionInfo>> {
        let section_rows = sqlx::query_as::<_, SectionRow>(
            r#"
            SELECT id, section, name, visible, available, sequence
            FROM course_sections
            WHERE course = ?
            ORDER BY section ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(self.pool())
        .await?;

        let mut modules: HashMap<i64, ModuleInfo> = sqlx::query_as::<_, ModuleRow>(
            r#"
            SELECT id, name, modname, instance, visible, visibleoncoursepage, completion
            FROM course_modules
            WHERE course = ?
            "#,
        )
        .bind(course_id)
        .fetch_all(self.pool())
        .await?
        .into_iter()
        .map(|row| (row.id, ModuleInfo::from(row)))
        .collect();

        let sections = section_rows
            .into_iter()
            .map(|row| {
                let section_modules = parse_sequence(&row.sequence)
                    .into_iter()
                    .filter_map(|cmid| {
                        let module = modules.remove(&cmid);
                        if module.is_none() {
                            debug!("Section {} references unknown module {}", row.id, cmid);
                        }
                        module
                    })
                    .collect();

                SectionInfo {
                    id: row.id,
                    section: row.section,
                    name: row.name,
                    visible: row.visible != 0,
                    available: row.available != 0,
                    modules: section_modules,
                }
            })
            .collect();

        Ok(sections)
    }

    async fn course_module(&self, cmid: i64) -> Result<Option<CourseModuleRef>> {
        let row = sqlx::query_as::<_, (i64, i64, String, i64)>(
            "SELECT id, course, modname, instance FROM course_modules WHERE id = ?",
        )
        .bind(cmid)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|(id, course, modname, instance)| CourseModuleRef {
            id,
            course,
            modname,
            instance,
        }))
    }
}
