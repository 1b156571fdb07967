//! Date handling shared by every view: parsing due-date text, placing a date
//! relative to today, and laying dates out on a calendar.

pub mod calendar;
pub mod classify;
pub mod normalize;

pub use calendar::{CalendarCell, MonthGrid, WeekBounds, build_month_grid, compute_week_bounds, day_bucket};
pub use classify::{Bucket, Classification, WINDOW_DAYS, classify, priority_for};
pub use normalize::{normalize_date, normalize_date_with_year};
