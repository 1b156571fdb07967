use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AssignmentType {
    #[default]
    Assignment,
    Discussion,
    Reading,
    Quiz,
    Test,
    Project,
    Presentation,
    Art,
    Other,
}

impl AssignmentType {
    pub const ALL: [AssignmentType; 9] = [
        AssignmentType::Assignment,
        AssignmentType::Discussion,
        AssignmentType::Reading,
        AssignmentType::Quiz,
        AssignmentType::Test,
        AssignmentType::Project,
        AssignmentType::Presentation,
        AssignmentType::Art,
        AssignmentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentType::Assignment => "Assignment",
            AssignmentType::Discussion => "Discussion",
            AssignmentType::Reading => "Reading",
            AssignmentType::Quiz => "Quiz",
            AssignmentType::Test => "Test",
            AssignmentType::Project => "Project",
            AssignmentType::Presentation => "Presentation",
            AssignmentType::Art => "Art",
            AssignmentType::Other => "Other",
        }
    }

    /// Case-insensitive label lookup. Unknown labels are `Other`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(label))
            .unwrap_or(AssignmentType::Other)
    }

    /// Guess a type from the words of an extracted title.
    pub fn infer_from_title(title: &str) -> Self {
        let lowered = title.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has = |needle: &str| words.iter().any(|w| *w == needle);
        let has_prefix = |prefix: &str| words.iter().any(|w| w.starts_with(prefix));

        if has_prefix("quiz") {
            AssignmentType::Quiz
        } else if has_prefix("exam") || has_prefix("midterm") || has("final") || has("test") {
            AssignmentType::Test
        } else if has_prefix("presentation") {
            AssignmentType::Presentation
        } else if has_prefix("project") || has("sprint") {
            AssignmentType::Project
        } else if has_prefix("discussion") {
            AssignmentType::Discussion
        } else if has_prefix("reading") {
            AssignmentType::Reading
        } else if has("art") || has("portfolio") {
            AssignmentType::Art
        } else if has_prefix("homework")
            || has_prefix("hw")
            || has_prefix("assignment")
            || lowered.contains("problem set")
            || has("lab")
            || has("paper")
            || has("essay")
            || has_prefix("reflection")
        {
            AssignmentType::Assignment
        } else {
            AssignmentType::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub course: String,
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "type", default)]
    pub kind: AssignmentType,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

/// Fields a caller supplies when creating an assignment by hand.
#[derive(Debug, Clone, Default)]
pub struct NewAssignment {
    pub title: String,
    pub course: String,
    pub due_date: Option<NaiveDate>,
    pub kind: AssignmentType,
    pub description: Option<String>,
}

/// Partial update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct AssignmentPatch {
    pub title: Option<String>,
    pub course: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub kind: Option<AssignmentType>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}
