use serde::{Deserialize, Serialize};

use crate::models::AssignmentType;

pub const MANUAL_SOURCE: &str = "manual";

/// A candidate assignment awaiting review. `staging_id` is only unique
/// within the current staging session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub staging_id: usize,
    pub title: String,
    pub course: String,
    #[serde(rename = "type")]
    pub kind: AssignmentType,
    pub due_date_text: String,
    pub description: Option<String>,
    pub selected: bool,
    pub page: Option<u32>,
    pub source: Option<String>,
}

/// A draft before the staging store has given it an id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DraftInput {
    pub title: String,
    #[serde(default)]
    pub course: String,
    #[serde(rename = "type", default)]
    pub kind: Option<AssignmentType>,
    #[serde(default)]
    pub due_date_text: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftPatch {
    pub title: Option<String>,
    pub course: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AssignmentType>,
    pub due_date_text: Option<String>,
    pub description: Option<String>,
    pub selected: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub committed_count: usize,
    pub skipped_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StagingSummary {
    pub total: usize,
    pub selected: usize,
    pub dated: usize,
    pub undated: usize,
}
