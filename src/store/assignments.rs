use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::dates::priority_for;
use crate::models::{Assignment, AssignmentPatch, NewAssignment, UNTITLED, course_key};

/// The permanent, id-keyed assignment collection. Insertion order is kept so
/// unsorted listings stay stable.
#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    items: Vec<Assignment>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_assignments(items: Vec<Assignment>) -> Self {
        let mut store = Self::new();
        store.insert_many(items);
        store
    }

    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Add a record, or replace the one that already has its id in place.
    /// Returns the replaced record.
    pub fn insert(&mut self, assignment: Assignment) -> Option<Assignment> {
        match self.items.iter_mut().find(|a| a.id == assignment.id) {
            Some(existing) => Some(std::mem::replace(existing, assignment)),
            None => {
                self.items.push(assignment);
                None
            }
        }
    }

    pub fn insert_many<I>(&mut self, assignments: I)
    where
        I: IntoIterator<Item = Assignment>,
    {
        for assignment in assignments {
            self.insert(assignment);
        }
    }

    /// Build a permanent record from user input: fresh id, blank title
    /// replaced by "Untitled", priority computed against `now`.
    pub fn create(&mut self, req: NewAssignment, now: NaiveDate) -> &Assignment {
        let title = req.title.trim();
        let assignment = Assignment {
            id: Self::new_id(),
            title: if title.is_empty() { UNTITLED.to_string() } else { title.to_string() },
            course: req.course.trim().to_string(),
            due_date: req.due_date,
            kind: req.kind,
            description: req.description.filter(|d| !d.trim().is_empty()),
            priority: priority_for(req.due_date, now),
            completed: false,
        };
        self.items.push(assignment);
        &self.items[self.items.len() - 1]
    }

    /// Apply a partial edit. Priority is recomputed only when the due date
    /// actually changed and `now` is known.
    pub fn update_by_id(
        &mut self,
        id: &str,
        patch: AssignmentPatch,
        now: Option<NaiveDate>,
    ) -> Option<&Assignment> {
        let current = self.items.iter_mut().find(|a| a.id == id)?;

        let mut next = current.clone();
        if let Some(title) = patch.title {
            let title = title.trim();
            next.title = if title.is_empty() { UNTITLED.to_string() } else { title.to_string() };
        }
        if let Some(course) = patch.course {
            next.course = course.trim().to_string();
        }
        if let Some(kind) = patch.kind {
            next.kind = kind;
        }
        if let Some(description) = patch.description {
            next.description = description.filter(|d| !d.trim().is_empty());
        }
        if let Some(completed) = patch.completed {
            next.completed = completed;
        }
        if let Some(due_date) = patch.due_date {
            let changed = due_date != next.due_date;
            next.due_date = due_date;
            if let (true, Some(now)) = (changed, now) {
                next.priority = priority_for(next.due_date, now);
            }
        }

        *current = next;
        Some(&*current)
    }

    pub fn delete_by_id(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|a| a.id != id);
        self.items.len() != before
    }

    pub fn get(&self, id: &str) -> Option<&Assignment> {
        self.items.iter().find(|a| a.id == id)
    }

    pub fn all(&self) -> &[Assignment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn due_on(&self, date: NaiveDate) -> Vec<&Assignment> {
        self.items.iter().filter(|a| a.due_date == Some(date)).collect()
    }

    /// Open assignments due strictly before `now`.
    pub fn overdue(&self, now: NaiveDate) -> Vec<&Assignment> {
        let mut out: Vec<&Assignment> = self
            .items
            .iter()
            .filter(|a| !a.completed && a.due_date.is_some_and(|d| d < now))
            .collect();
        sort_by_due(&mut out);
        out
    }

    /// Open assignments due in `now..=now + days`.
    pub fn upcoming(&self, now: NaiveDate, days: u64) -> Vec<&Assignment> {
        let horizon = now.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
        let mut out: Vec<&Assignment> = self
            .items
            .iter()
            .filter(|a| !a.completed && a.due_date.is_some_and(|d| now <= d && d <= horizon))
            .collect();
        sort_by_due(&mut out);
        out
    }

    pub fn by_course_key(&self, key: &str) -> Vec<&Assignment> {
        let key = course_key(key);
        self.items.iter().filter(|a| course_key(&a.course) == key).collect()
    }

    /// Recompute every derived priority against `now`.
    pub fn refresh_priorities(&mut self, now: NaiveDate) {
        for a in &mut self.items {
            a.priority = priority_for(a.due_date, now);
        }
    }

    /// Rewrite the course of every assignment under `old_key`. Returns how
    /// many were touched.
    pub(crate) fn recourse(&mut self, old_key: &str, new_name: &str) -> usize {
        let mut touched = 0;
        for a in self.items.iter_mut().filter(|a| course_key(&a.course) == old_key) {
            a.course = new_name.to_string();
            touched += 1;
        }
        touched
    }

    pub fn into_vec(self) -> Vec<Assignment> {
        self.items
    }
}

fn sort_by_due(items: &mut [&Assignment]) {
    items.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
    });
}
