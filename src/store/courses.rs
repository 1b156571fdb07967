use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::dates::WINDOW_DAYS;
use crate::models::{Assignment, CourseFolder, CourseSummary, NewCourseFolder, course::DEFAULT_COLOR, course_key};
use crate::store::AssignmentStore;

pub const UPCOMING_WINDOW_DAYS: u64 = WINDOW_DAYS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CourseError {
    #[error("course name must not be empty")]
    EmptyName,

    #[error("course already exists: {0}")]
    DuplicateCourse(String),

    #[error("course not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenameOutcome {
    pub renamed_assignments: usize,
    pub folder_renamed: bool,
    pub folder_merged: bool,
}

/// Owns the explicit course folders and derives the per-course overview
/// from the assignment store.
#[derive(Debug, Clone, Default)]
pub struct CourseAggregator {
    folders: Vec<CourseFolder>,
}

impl CourseAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_folders(folders: Vec<CourseFolder>) -> Self {
        Self { folders }
    }

    pub fn folders(&self) -> &[CourseFolder] {
        &self.folders
    }

    pub fn folder_for_key(&self, key: &str) -> Option<&CourseFolder> {
        self.folders.iter().find(|f| course_key(&f.name) == key)
    }

    pub fn add_folder(&mut self, req: NewCourseFolder) -> Result<CourseFolder, CourseError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(CourseError::EmptyName);
        }
        if self.folder_for_key(&course_key(name)).is_some() {
            return Err(CourseError::DuplicateCourse(name.to_string()));
        }

        let folder = CourseFolder {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            color: req
                .color
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            semester: req.semester.filter(|s| !s.trim().is_empty()),
            year: req.year,
        };
        self.folders.push(folder.clone());
        Ok(folder)
    }

    /// Remove an explicit folder. Assignments that named it keep their
    /// course text and stay grouped by it.
    pub fn remove_folder(&mut self, id: &str) -> Result<CourseFolder, CourseError> {
        let ix = self
            .folders
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| CourseError::NotFound(id.to_string()))?;
        Ok(self.folders.remove(ix))
    }

    pub fn summaries(&self, assignments: &[Assignment], now: NaiveDate) -> Vec<CourseSummary> {
        aggregate(assignments, &self.folders, now)
    }

    /// Move every assignment filed under `old_name` to `new_name` in one
    /// pass, and carry the explicit folder along with it.
    pub fn rename_course(
        &mut self,
        old_name: &str,
        new_name: &str,
        store: &mut AssignmentStore,
    ) -> Result<RenameOutcome, CourseError> {
        let new_display = new_name.trim();
        if new_display.is_empty() {
            return Err(CourseError::EmptyName);
        }
        let old_key = course_key(old_name);
        let new_key = course_key(new_display);

        let renamed_assignments = store.recourse(&old_key, new_display);

        let mut folder_renamed = false;
        let mut folder_merged = false;
        if let Some(ix) = self.folders.iter().position(|f| course_key(&f.name) == old_key) {
            let target_exists = old_key != new_key
                && self.folders.iter().any(|f| course_key(&f.name) == new_key);
            if target_exists {
                self.folders.remove(ix);
                folder_merged = true;
            } else {
                self.folders[ix].name = new_display.to_string();
                folder_renamed = true;
            }
        }

        if renamed_assignments == 0 && !folder_renamed && !folder_merged {
            return Err(CourseError::NotFound(old_name.trim().to_string()));
        }

        debug!(
            "renamed course {:?} -> {:?}: {} assignments, folder renamed={}, merged={}",
            old_key, new_display, renamed_assignments, folder_renamed, folder_merged
        );
        Ok(RenameOutcome {
            renamed_assignments,
            folder_renamed,
            folder_merged,
        })
    }
}

/// Group assignments by course key and count them.
///
/// A folder's name wins as display name; otherwise the first non-empty raw
/// course string seen for the key is used. Folders with no assignments are
/// listed with zero counts. Output is ordered by key.
pub fn aggregate(
    assignments: &[Assignment],
    folders: &[CourseFolder],
    now: NaiveDate,
) -> Vec<CourseSummary> {
    let horizon = now
        .checked_add_days(chrono::Days::new(UPCOMING_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);

    let mut groups: BTreeMap<String, CourseSummary> = BTreeMap::new();

    for folder in folders {
        let key = course_key(&folder.name);
        groups.entry(key.clone()).or_insert_with(|| CourseSummary {
            display_name: folder.name.clone(),
            normalized_key: key,
            folder_id: Some(folder.id.clone()),
            overdue_count: 0,
            upcoming_count: 0,
            total_count: 0,
        });
    }

    for a in assignments {
        let key = course_key(&a.course);
        let group = groups.entry(key.clone()).or_insert_with(|| CourseSummary {
            display_name: String::new(),
            normalized_key: key,
            folder_id: None,
            overdue_count: 0,
            upcoming_count: 0,
            total_count: 0,
        });
        if group.display_name.is_empty() {
            group.display_name = a.course.trim().to_string();
        }
        group.total_count += 1;
        if !a.completed {
            match a.due_date {
                Some(d) if d < now => group.overdue_count += 1,
                Some(d) if d <= horizon => group.upcoming_count += 1,
                _ => {}
            }
        }
    }

    groups.into_values().collect()
}
