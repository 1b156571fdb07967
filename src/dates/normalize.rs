use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

static CANONICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("canonical date pattern"));

static TRIPLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,4})([/-])(\d{1,2})([/-])(\d{1,4})$").expect("numeric triple pattern")
});

static MONTH_DAY_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[/-](\d{1,2})$").expect("month/day pattern"));

const WEEKDAY: &str = r"(?:(?:mon|tue|tues|wed|wednes|thu|thur|thurs|fri|sat|satur|sun)(?:day)?\s+)?";

static MONTH_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^{WEEKDAY}([a-z]+)\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:\s+(\d{{4}}))?$"
    ))
    .expect("month-first pattern")
});

static DAY_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^{WEEKDAY}(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?([a-z]+)(?:\s+(\d{{4}}))?$"
    ))
    .expect("day-first pattern")
});

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Parse heterogeneous due-date text into a real calendar date.
///
/// Recognised shapes, tried in order:
/// - canonical `YYYY-MM-DD`, validated but never reinterpreted
/// - numeric triples: `YYYY/MM/DD` when the first group has four digits,
///   otherwise `MM/DD/YY(YY)`; two-digit years are 20xx
/// - calendar text such as `November 19, 2025`, `19 Nov 2025`,
///   `Wed, Sept. 3rd 2025`, or an ISO date-time
///
/// Anything that does not resolve to a real date is `None`.
pub fn normalize_date(input: &str) -> Option<NaiveDate> {
    normalize_date_with_year(input, None)
}

/// Same as [`normalize_date`], but year-less text (`Sep 15`, `9/15`) is
/// resolved against `year_hint` when one is given.
pub fn normalize_date_with_year(input: &str, year_hint: Option<i32>) -> Option<NaiveDate> {
    let text = input.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = CANONICAL_RE.captures(text) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = TRIPLE_RE.captures(text) {
        if caps[2] == caps[4] {
            if let Some(result) = numeric_triple(&caps[1], &caps[3], &caps[5]) {
                return result;
            }
        }
    }

    calendar_text(text, year_hint)
}

/// `Some(result)` when one of the numeric rules applied, `None` to fall
/// through to calendar text.
fn numeric_triple(first: &str, second: &str, third: &str) -> Option<Option<NaiveDate>> {
    if first.len() == 4 {
        return Some(ymd(first, second, third));
    }

    let month: u32 = first.parse().ok()?;
    let day: u32 = second.parse().ok()?;
    if month > 12 || day > 31 {
        return None;
    }

    let year = match third.len() {
        2 => third.parse::<i32>().ok().map(|y| y + 2000),
        4 => third.parse::<i32>().ok(),
        _ => None,
    };
    Some(year.and_then(|y| NaiveDate::from_ymd_opt(y, month, day)))
}

fn calendar_text(text: &str, year_hint: Option<i32>) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }

    if let Some(year) = year_hint {
        if let Some(caps) = MONTH_DAY_PAIR_RE.captures(text) {
            let month: u32 = caps[1].parse().ok()?;
            let day: u32 = caps[2].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    let cleaned = clean_text(text);

    let (month_name, day, year) = if let Some(caps) = MONTH_FIRST_RE.captures(&cleaned) {
        (
            caps[1].to_string(),
            caps[2].to_string(),
            caps.get(3).map(|m| m.as_str().to_string()),
        )
    } else if let Some(caps) = DAY_FIRST_RE.captures(&cleaned) {
        (
            caps[2].to_string(),
            caps[1].to_string(),
            caps.get(3).map(|m| m.as_str().to_string()),
        )
    } else {
        return None;
    };

    let month = month_from_name(&month_name)?;
    let day: u32 = day.parse().ok()?;
    let year = match year {
        Some(y) => y.parse().ok()?,
        None => year_hint?,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Lowercase, drop `,` and `.`, collapse whitespace.
fn clean_text(text: &str) -> String {
    text.to_lowercase()
        .replace([',', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn month_from_name(name: &str) -> Option<u32> {
    if name.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|full| full.starts_with(name))
        .map(|ix| ix as u32 + 1)
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}
