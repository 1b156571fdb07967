use serde::{Deserialize, Serialize};

pub const DEFAULT_COLOR: &str = "blue";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseFolder {
    pub id: String,
    pub name: String,
    pub color: String,
    pub semester: Option<String>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseFolder {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// One row of the per-course overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseSummary {
    pub display_name: String,
    pub normalized_key: String,
    pub folder_id: Option<String>,
    pub overdue_count: usize,
    pub upcoming_count: usize,
    pub total_count: usize,
}

/// Trimmed, case-folded course name used for grouping.
pub fn course_key(name: &str) -> String {
    name.trim().to_lowercase()
}
