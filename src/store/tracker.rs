use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Assignment, CommitOutcome, CourseFolder, CourseSummary};
use crate::store::{AssignmentStore, CourseAggregator, CourseError, DraftStagingStore, RenameOutcome};

/// Flat, serializable state: everything that outlives a staging session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub assignments: Vec<Assignment>,
    pub course_folders: Vec<CourseFolder>,
}

/// Single owner of the assignment, course, and staging stores.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    pub assignments: AssignmentStore,
    pub courses: CourseAggregator,
    pub staging: DraftStagingStore,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: PersistedState) -> Self {
        Self {
            assignments: AssignmentStore::from_assignments(state.assignments),
            courses: CourseAggregator::from_folders(state.course_folders),
            staging: DraftStagingStore::new(),
        }
    }

    pub fn state(&self) -> PersistedState {
        PersistedState {
            assignments: self.assignments.all().to_vec(),
            course_folders: self.courses.folders().to_vec(),
        }
    }

    pub fn commit_staging(&mut self, now: NaiveDate) -> CommitOutcome {
        self.staging.commit(&mut self.assignments, now)
    }

    pub fn rename_course(&mut self, old_name: &str, new_name: &str) -> Result<RenameOutcome, CourseError> {
        self.courses.rename_course(old_name, new_name, &mut self.assignments)
    }

    pub fn course_summaries(&self, now: NaiveDate) -> Vec<CourseSummary> {
        self.courses.summaries(self.assignments.all(), now)
    }
}
