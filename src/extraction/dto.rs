use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::dates::normalize_date;
use crate::error::AppError;
use crate::models::{AssignmentType, DraftInput, UNTITLED};

pub const MAX_TITLE_CHARS: usize = 300;

#[derive(Debug, Clone)]
pub enum ExtractionSource {
    Document {
        file_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub source: ExtractionSource,
    pub repair: bool,
    pub course_hint: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TextExtractionBody<'a> {
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ExtractionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub pdf_title: Option<String>,
    #[serde(default)]
    pub default_year: Option<i32>,
    #[serde(default)]
    pub llm_error: Option<String>,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

/// One candidate as the service sends it. Every field is optional and the
/// service is not consistent about types.
#[derive(Debug, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_date_raw: Option<String>,
    #[serde(default)]
    pub due_date_iso: Option<String>,
    #[serde(default)]
    pub page: Option<serde_json::Value>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// Validated output of one extraction, ready for staging.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedBatch {
    pub drafts: Vec<DraftInput>,
    pub year_hint: Option<i32>,
    pub document_title: Option<String>,
}

impl ExtractionResponse {
    pub fn is_ok(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("ok"))
    }

    fn failure_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.detail.clone())
            .unwrap_or_else(|| "extraction service reported an error".to_string())
    }
}

/// The single boundary between loosely typed service output and drafts.
///
/// A non-`ok` status or an empty item list is an error so that the caller
/// leaves staging untouched.
pub fn drafts_from_response(
    response: ExtractionResponse,
    course_hint: Option<&str>,
) -> Result<ExtractedBatch, AppError> {
    if !response.is_ok() {
        return Err(AppError::Extraction(response.failure_message()));
    }
    if response.items.is_empty() {
        return Err(AppError::Extraction(
            "no assignments were found in the document".to_string(),
        ));
    }
    if let Some(err) = &response.llm_error {
        tracing::warn!("extraction repair step failed, using unrepaired items: {}", err);
    }

    let course_hint = course_hint.map(str::trim).filter(|c| !c.is_empty());
    let mut seen: HashSet<(String, String, Option<u32>)> = HashSet::new();
    let mut drafts = Vec::with_capacity(response.items.len());

    for item in response.items {
        let draft = draft_from_item(item, course_hint);
        let key = (
            draft.title.to_lowercase(),
            draft.due_date_text.clone(),
            draft.page,
        );
        if seen.insert(key) {
            drafts.push(draft);
        }
    }

    Ok(ExtractedBatch {
        drafts,
        year_hint: response.default_year,
        document_title: response.pdf_title.filter(|t| !t.trim().is_empty()),
    })
}

fn draft_from_item(item: RawItem, course_hint: Option<&str>) -> DraftInput {
    let title = item
        .title
        .as_deref()
        .map(clean_title)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    // an unreadable ISO value must not hide a usable raw date
    let due_date_text = non_blank(item.due_date_iso)
        .filter(|iso| normalize_date(iso).is_some())
        .or_else(|| non_blank(item.due_date_raw))
        .unwrap_or_default();

    let course = non_blank(item.course)
        .or_else(|| course_hint.map(str::to_string))
        .unwrap_or_default();

    let kind = non_blank(item.kind)
        .map(|k| AssignmentType::from_label(&k))
        .unwrap_or_else(|| AssignmentType::infer_from_title(&title));

    DraftInput {
        title,
        course,
        kind: Some(kind),
        due_date_text,
        description: None,
        page: item.page.as_ref().and_then(page_number),
        source: non_blank(item.source),
    }
}

fn clean_title(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn page_number(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
