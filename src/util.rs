// Utility helpers for parsing and number formatting.
//
// This module centralizes all the "dirty" spreadsheet handling so the rest of
// the code can assume clean, typed values. Like a coercing CSV reader, every
// parser here returns `None` for anything it cannot read instead of failing.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

use crate::types::Flag;

/// Layouts whose field order is never in doubt. Tried before the slashed
/// layouts below.
const UNAMBIGUOUS_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y",
];

const MONTH_FIRST_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M", "%m/%d/%Y"];

const DAY_FIRST_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M", "%d/%m/%Y"];

/// How a column writes slashed dates such as `03/02/2024`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayMonthOrder {
    #[default]
    MonthFirst,
    DayFirst,
}

/// Normalize a spreadsheet header: trim, lowercase, spaces to underscores.
///
/// `" Date Reported "` becomes `"date_reported"`.
pub fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace(' ', "_")
}

/// Trim a text cell, mapping blank cells to `None`.
pub fn clean_text(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    Some(s.to_string())
}

fn parse_layout(s: &str, fmt: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, fmt).ok().or_else(|| {
        NaiveDate::parse_from_str(s, fmt)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

fn parses_any(s: &str, formats: &[&str]) -> bool {
    formats.iter().any(|fmt| parse_layout(s, fmt).is_some())
}

/// Decide the slashed-date order of a column from its first value that only
/// reads one way (`15/01/2024` is day-first, `01/15/2024` month-first).
/// Columns with nothing decisive are month-first.
pub fn infer_day_month_order<'a, I>(values: I) -> DayMonthOrder
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    for v in values.into_iter().flatten().map(str::trim) {
        if v.is_empty() {
            continue;
        }
        match (parses_any(v, MONTH_FIRST_FORMATS), parses_any(v, DAY_FIRST_FORMATS)) {
            (true, false) => return DayMonthOrder::MonthFirst,
            (false, true) => return DayMonthOrder::DayFirst,
            _ => {}
        }
    }
    DayMonthOrder::default()
}

/// Parse a date or date-time cell. Date-only values land at midnight.
/// Ambiguous slashed dates follow `order`; a value that only reads the
/// other way is still accepted.
pub fn parse_datetime_safe(s: Option<&str>, order: DayMonthOrder) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let (preferred, fallback) = match order {
        DayMonthOrder::MonthFirst => (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS),
        DayMonthOrder::DayFirst => (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS),
    };
    UNAMBIGUOUS_FORMATS
        .iter()
        .chain(preferred)
        .chain(fallback)
        .find_map(|fmt| parse_layout(s, fmt))
}

/// Read a yes/no cell. Only a case-insensitive `yes` is affirmative; a blank
/// or missing cell is `Unknown` rather than a silent "no".
pub fn parse_flag(s: Option<&str>) -> Flag {
    match s.map(str::trim) {
        None | Some("") => Flag::Unknown,
        Some(v) if v.eq_ignore_ascii_case("yes") => Flag::Yes,
        Some(_) => Flag::No,
    }
}

/// Format an optional day count to one decimal, `n/a` when undefined.
pub fn format_days(v: Option<f64>) -> String {
    match v {
        Some(d) if d.is_finite() => format!("{d:.1} days"),
        _ => "n/a".to_string(),
    }
}

/// Format an optional percentage to one decimal, `n/a` when undefined.
pub fn format_pct(v: Option<f64>) -> String {
    match v {
        Some(p) if p.is_finite() => format!("{p:.1}%"),
        _ => "n/a".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages
    // (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
