use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::models::Assignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarCell {
    /// `None` for padding before the 1st and after the last day.
    pub date: Option<NaiveDate>,
    pub is_today: bool,
}

impl CalendarCell {
    fn padding() -> Self {
        Self { date: None, is_today: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<CalendarCell>,
}

impl MonthGrid {
    /// Flag the cell for `today`, if it falls in this month. Shape is unchanged.
    pub fn mark_today(mut self, today: NaiveDate) -> Self {
        for cell in &mut self.cells {
            cell.is_today = cell.date == Some(today);
        }
        self
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell]> {
        self.cells.chunks(7)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.cells.iter().filter_map(|c| c.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WeekBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekBounds {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(7)
    }
}

/// Sunday-first month grid, padded to whole weeks.
///
/// Returns `None` for a month outside 1..=12 or a year chrono cannot
/// represent.
pub fn build_month_grid(year: i32, month: u32) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = days_in_month(first)?;
    let leading = first.weekday().num_days_from_sunday() as usize;

    let mut cells = Vec::with_capacity(42);
    cells.extend(std::iter::repeat_n(CalendarCell::padding(), leading));
    cells.extend(first.iter_days().take(days).map(|date| CalendarCell {
        date: Some(date),
        is_today: false,
    }));
    let trailing = (7 - cells.len() % 7) % 7;
    cells.extend(std::iter::repeat_n(CalendarCell::padding(), trailing));

    Some(MonthGrid { year, month, cells })
}

/// The Sunday..=Saturday span containing `anchor`.
pub fn compute_week_bounds(anchor: NaiveDate) -> WeekBounds {
    let offset = u64::from(anchor.weekday().num_days_from_sunday());
    let start = anchor.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN);
    let end = start.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
    WeekBounds { start, end }
}

/// Assignments due on `date`, ordered by case-folded title then id.
pub fn day_bucket(date: NaiveDate, assignments: &[Assignment]) -> Vec<&Assignment> {
    let mut due: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| a.due_date == Some(date))
        .collect();
    due.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
    due
}

fn days_in_month(first: NaiveDate) -> Option<usize> {
    let (next_year, next_month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    usize::try_from(next_first.signed_duration_since(first).num_days()).ok()
}
