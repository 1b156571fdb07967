use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Priority;

/// Days after `now` that still count as "due soon". The last day is inclusive.
pub const WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    NoDate,
    Overdue,
    DueToday,
    WithinWindow,
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub bucket: Bucket,
    pub priority: Priority,
}

/// Place a due date relative to `now`.
///
/// Overdue items are low priority: they are surfaced through the overdue
/// count rather than as "due".
pub fn classify(date: Option<NaiveDate>, now: NaiveDate) -> Classification {
    let (bucket, priority) = match date {
        None => (Bucket::NoDate, Priority::Low),
        Some(d) if d < now => (Bucket::Overdue, Priority::Low),
        Some(d) if d == now => (Bucket::DueToday, Priority::High),
        Some(d) if d <= window_end(now) => (Bucket::WithinWindow, Priority::Medium),
        Some(_) => (Bucket::Future, Priority::Low),
    };
    Classification { bucket, priority }
}

pub fn priority_for(date: Option<NaiveDate>, now: NaiveDate) -> Priority {
    classify(date, now).priority
}

fn window_end(now: NaiveDate) -> NaiveDate {
    now.checked_add_days(Days::new(WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX)
}
