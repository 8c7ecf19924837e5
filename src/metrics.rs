// Derived per-record fields and headline statistics.
//
// All lag and deadline arithmetic is anchored on `date_reported`. Anything
// that needs a missing endpoint date is `None`, never zero, and the averages
// below skip `None` values entirely.
use crate::types::{CrimeRecord, SummaryStats};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// Statutory window for filing a chargesheet, counted from the report date.
pub const CHARGESHEET_DEADLINE_DAYS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Monsoon,
    Autumn,
}

impl Season {
    /// Fixed month lookup. `None` only for a month outside 1..=12.
    pub fn from_month(month: u32) -> Option<Season> {
        match month {
            12 | 1 | 2 => Some(Season::Winter),
            3 | 4 => Some(Season::Spring),
            5 | 6 => Some(Season::Summer),
            7..=9 => Some(Season::Monsoon),
            10 | 11 => Some(Season::Autumn),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Monsoon => "Monsoon",
            Season::Autumn => "Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar month. Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
}

impl MonthBucket {
    pub fn of(dt: NaiveDateTime) -> Self {
        MonthBucket {
            year: dt.year(),
            month: dt.month(),
        }
    }
}

impl fmt::Display for MonthBucket {
    /// Renders as `Feb-2023`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(d) => write!(f, "{}", d.format("%b-%Y")),
            None => write!(f, "{:02}-{}", self.month, self.year),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DerivedFields {
    pub chargesheet_due_date: Option<NaiveDateTime>,
    pub days_left: Option<i64>,
    pub fir_to_arrest: Option<i64>,
    pub arrest_to_chargesheet: Option<i64>,
    pub unarrested_days: Option<i64>,
    pub month_bucket: Option<MonthBucket>,
    pub season: Option<Season>,
}

/// Whole days from `start` to `end`, truncated toward zero.
fn days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_days()
}

pub fn fir_to_arrest(record: &CrimeRecord) -> Option<i64> {
    let (reported, arrested) = record.date_reported.zip(record.arrest_date)?;
    Some(days_between(reported, arrested))
}

pub fn arrest_to_chargesheet(record: &CrimeRecord) -> Option<i64> {
    let (arrested, charged) = record.arrest_date.zip(record.chargesheet_date)?;
    Some(days_between(arrested, charged))
}

/// Compute every derived field of `record` as of `reference_time`.
pub fn derive(record: &CrimeRecord, reference_time: NaiveDateTime) -> DerivedFields {
    let reported = record.date_reported;
    let chargesheet_due_date = reported.map(|d| d + Duration::days(CHARGESHEET_DEADLINE_DAYS));

    DerivedFields {
        chargesheet_due_date,
        days_left: chargesheet_due_date.map(|due| days_between(reference_time, due)),
        fir_to_arrest: fir_to_arrest(record),
        arrest_to_chargesheet: arrest_to_chargesheet(record),
        unarrested_days: reported.map(|r| days_between(r, reference_time)),
        month_bucket: reported.map(MonthBucket::of),
        season: reported.and_then(|r| Season::from_month(r.month())),
    }
}

/// Mean of the defined values; `None` values count toward neither the sum
/// nor the divisor. `None` when nothing is defined.
pub fn mean_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<i64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0i64, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return None;
    }
    Some(sum as f64 / count as f64)
}

fn pct(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some(part as f64 / whole as f64 * 100.0)
}

/// Headline metrics over a filtered record set. An empty set yields zero
/// counts and undefined averages and rates.
pub fn summarize(records: &[&CrimeRecord]) -> SummaryStats {
    let total_cases = records.len();
    let fir_numbers = records.iter().filter(|r| r.fir_number.is_some()).count();
    let arrests_made = records.iter().filter(|r| r.accused_arrested.is_yes()).count();
    let chargesheets_filed = records
        .iter()
        .filter(|r| r.chargesheet_filed.is_yes())
        .count();

    SummaryStats {
        total_cases,
        fir_numbers,
        arrests_made,
        chargesheets_filed,
        arrest_rate_pct: pct(arrests_made, total_cases),
        chargesheet_rate_pct: pct(chargesheets_filed, total_cases),
        avg_fir_to_arrest_days: mean_defined(records.iter().map(|r| fir_to_arrest(r))),
        avg_arrest_to_chargesheet_days: mean_defined(
            records.iter().map(|r| arrest_to_chargesheet(r)),
        ),
    }
}
