use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::dates::{normalize_date_with_year, priority_for};
use crate::models::{
    Assignment, AssignmentType, CommitOutcome, Draft, DraftInput, DraftPatch, StagingSummary,
    draft::MANUAL_SOURCE,
};
use crate::store::AssignmentStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StagingError {
    #[error("draft not found: {0}")]
    DraftNotFound(usize),

    #[error("extraction result was superseded by a newer request or a reset")]
    Superseded,
}

/// Identifies the one outstanding extraction request of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionTicket(u64);

/// Holds extraction results while the user reviews them. The whole set is
/// replaced, committed, or discarded as a unit.
#[derive(Debug, Clone, Default)]
pub struct DraftStagingStore {
    drafts: Vec<Draft>,
    next_id: usize,
    year_hint: Option<i32>,
    generation: u64,
}

impl DraftStagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drafts(&self) -> &[Draft] {
        &self.drafts
    }

    pub fn get(&self, staging_id: usize) -> Option<&Draft> {
        self.drafts.iter().find(|d| d.staging_id == staging_id)
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn year_hint(&self) -> Option<i32> {
        self.year_hint
    }

    /// Overwrite any uncommitted session with a fresh draft set. Every new
    /// draft starts selected.
    pub fn replace_all(&mut self, drafts: Vec<DraftInput>) {
        self.replace_all_with_year(drafts, None);
    }

    pub fn replace_all_with_year(&mut self, drafts: Vec<DraftInput>, year_hint: Option<i32>) {
        self.drafts.clear();
        self.next_id = 0;
        self.year_hint = year_hint;
        for input in drafts {
            self.push(input);
        }
        debug!("staging replaced with {} drafts", self.drafts.len());
    }

    /// Start an extraction. Any ticket handed out earlier stops being valid.
    pub fn begin_extraction(&mut self) -> ExtractionTicket {
        self.generation += 1;
        ExtractionTicket(self.generation)
    }

    /// Install the result of the extraction identified by `ticket`, unless a
    /// newer request, a commit, or a discard happened in the meantime.
    pub fn accept_extraction(
        &mut self,
        ticket: ExtractionTicket,
        drafts: Vec<DraftInput>,
        year_hint: Option<i32>,
    ) -> Result<(), StagingError> {
        if ticket.0 != self.generation {
            warn!("dropping superseded extraction result ({} items)", drafts.len());
            return Err(StagingError::Superseded);
        }
        self.replace_all_with_year(drafts, year_hint);
        Ok(())
    }

    /// Append a draft the user typed in during review.
    pub fn add_manual(&mut self, mut input: DraftInput) -> &Draft {
        input.source = Some(MANUAL_SOURCE.to_string());
        self.push(input)
    }

    pub fn edit_field(&mut self, staging_id: usize, patch: DraftPatch) -> Result<&Draft, StagingError> {
        let draft = self.get_mut(staging_id)?;
        if let Some(title) = patch.title {
            draft.title = title;
        }
        if let Some(course) = patch.course {
            draft.course = course;
        }
        if let Some(kind) = patch.kind {
            draft.kind = kind;
        }
        if let Some(text) = patch.due_date_text {
            draft.due_date_text = text;
        }
        if let Some(description) = patch.description {
            draft.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(selected) = patch.selected {
            draft.selected = selected;
        }
        Ok(&*draft)
    }

    pub fn remove(&mut self, staging_id: usize) -> Result<Draft, StagingError> {
        let ix = self
            .drafts
            .iter()
            .position(|d| d.staging_id == staging_id)
            .ok_or(StagingError::DraftNotFound(staging_id))?;
        Ok(self.drafts.remove(ix))
    }

    pub fn toggle_selected(&mut self, staging_id: usize) -> Result<bool, StagingError> {
        let draft = self.get_mut(staging_id)?;
        draft.selected = !draft.selected;
        Ok(draft.selected)
    }

    pub fn set_all_selected(&mut self, selected: bool) {
        for d in &mut self.drafts {
            d.selected = selected;
        }
    }

    pub fn summary(&self) -> StagingSummary {
        let dated = self
            .drafts
            .iter()
            .filter(|d| normalize_date_with_year(&d.due_date_text, self.year_hint).is_some())
            .count();
        StagingSummary {
            total: self.drafts.len(),
            selected: self.drafts.iter().filter(|d| d.selected).count(),
            dated,
            undated: self.drafts.len() - dated,
        }
    }

    /// Turn every selected draft into a permanent assignment.
    ///
    /// A draft whose trimmed title is empty is skipped and counted; the rest
    /// of the batch still goes through. The session is cleared afterwards
    /// no matter how many were skipped.
    pub fn commit(&mut self, store: &mut AssignmentStore, now: NaiveDate) -> CommitOutcome {
        let mut outcome = CommitOutcome {
            committed_count: 0,
            skipped_count: 0,
        };

        for draft in self.drafts.iter().filter(|d| d.selected) {
            let title = draft.title.trim();
            if title.is_empty() {
                warn!("skipping draft {} with empty title", draft.staging_id);
                outcome.skipped_count += 1;
                continue;
            }

            let due_date = normalize_date_with_year(&draft.due_date_text, self.year_hint);
            store.insert(Assignment {
                id: AssignmentStore::new_id(),
                title: title.to_string(),
                course: draft.course.trim().to_string(),
                due_date,
                kind: draft.kind,
                description: draft
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
                priority: priority_for(due_date, now),
                completed: false,
            });
            outcome.committed_count += 1;
        }

        self.discard_all();
        outcome
    }

    /// Drop the session. A pending extraction will no longer be accepted.
    pub fn discard_all(&mut self) {
        self.drafts.clear();
        self.next_id = 0;
        self.year_hint = None;
        self.generation += 1;
    }

    fn push(&mut self, input: DraftInput) -> &Draft {
        let kind = input
            .kind
            .unwrap_or_else(|| AssignmentType::infer_from_title(&input.title));
        let draft = Draft {
            staging_id: self.next_id,
            title: input.title,
            course: input.course,
            kind,
            due_date_text: input.due_date_text,
            description: input.description,
            selected: true,
            page: input.page,
            source: input.source,
        };
        self.next_id += 1;
        self.drafts.push(draft);
        &self.drafts[self.drafts.len() - 1]
    }

    fn get_mut(&mut self, staging_id: usize) -> Result<&mut Draft, StagingError> {
        self.drafts
            .iter_mut()
            .find(|d| d.staging_id == staging_id)
            .ok_or(StagingError::DraftNotFound(staging_id))
    }
}
