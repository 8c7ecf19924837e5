// Record selection.
//
// `filter` is the standard dashboard selection. FIR search and the two
// follow-up queries (chargesheet due soon, accused unarrested) are separate
// terminal queries over the whole snapshot and never compose with it.
use crate::metrics::derive;
use crate::types::{CrimeRecord, Dataset};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;

/// Cases with at most this many days left before the chargesheet deadline
/// count as "due soon".
pub const DUE_SOON_WINDOW_DAYS: i64 = 10;

/// Unarrested cases older than this many days are flagged.
pub const UNARRESTED_THRESHOLD_DAYS: i64 = 45;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    /// Inclusive bounds on the calendar date of `date_reported`.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub stations: HashSet<String>,
    pub crime_types: HashSet<String>,
    pub fir_query: Option<String>,
}

impl FilterCriteria {
    /// Everything selected: all stations, all crime types, and the full
    /// span of report dates in the dataset.
    pub fn defaults_for(dataset: &Dataset) -> Self {
        FilterCriteria {
            date_range: dataset.date_bounds(),
            stations: dataset.stations().into_iter().collect(),
            crime_types: dataset.crime_types().into_iter().collect(),
            fir_query: None,
        }
    }

    /// The FIR search term, if one is active. Only an empty query is no
    /// search; whitespace is searched for as typed.
    pub fn search_term(&self) -> Option<&str> {
        self.fir_query.as_deref().filter(|q| !q.is_empty())
    }

    /// Dashboard predicate: date range AND station AND crime type. A record
    /// missing any filtered field never matches.
    pub fn matches(&self, record: &CrimeRecord) -> bool {
        if let Some((start, end)) = self.date_range {
            match record.date_reported {
                Some(dt) if (start..=end).contains(&dt.date()) => {}
                _ => return false,
            }
        }
        let in_set = |set: &HashSet<String>, v: &Option<String>| {
            v.as_ref().is_some_and(|v| set.contains(v))
        };
        in_set(&self.stations, &record.police_station) && in_set(&self.crime_types, &record.crime_type)
    }
}

/// Apply `criteria`. With an active FIR search term the other predicates are
/// ignored and this is exactly [`fir_search`].
pub fn filter<'a, I>(records: I, criteria: &FilterCriteria) -> Vec<&'a CrimeRecord>
where
    I: IntoIterator<Item = &'a CrimeRecord>,
{
    if let Some(term) = criteria.search_term() {
        return fir_search(records, term);
    }
    let out: Vec<&CrimeRecord> = records.into_iter().filter(|r| criteria.matches(r)).collect();
    log::debug!("Dashboard filter kept {} records", out.len());
    out
}

/// Case-insensitive substring match on `fir_number`. Records without an FIR
/// number never match.
pub fn fir_search<'a, I>(records: I, query: &str) -> Vec<&'a CrimeRecord>
where
    I: IntoIterator<Item = &'a CrimeRecord>,
{
    let needle = query.to_lowercase();
    let out: Vec<&CrimeRecord> = records
        .into_iter()
        .filter(|r| {
            r.fir_number
                .as_deref()
                .is_some_and(|fir| fir.to_lowercase().contains(&needle))
        })
        .collect();
    log::debug!("FIR search '{query}' matched {} records", out.len());
    out
}

/// Chargesheet not filed and the deadline falls within the next
/// [`DUE_SOON_WINDOW_DAYS`] days (overdue cases excluded).
pub fn chargesheet_due_soon<'a, I>(records: I, reference_time: NaiveDateTime) -> Vec<&'a CrimeRecord>
where
    I: IntoIterator<Item = &'a CrimeRecord>,
{
    records
        .into_iter()
        .filter(|r| !r.chargesheet_filed.is_yes())
        .filter(|r| {
            derive(r, reference_time)
                .days_left
                .is_some_and(|d| (0..=DUE_SOON_WINDOW_DAYS).contains(&d))
        })
        .collect()
}

/// Accused not arrested and the case was reported more than
/// [`UNARRESTED_THRESHOLD_DAYS`] days ago. No report date, no match.
pub fn unarrested_beyond_threshold<'a, I>(
    records: I,
    reference_time: NaiveDateTime,
) -> Vec<&'a CrimeRecord>
where
    I: IntoIterator<Item = &'a CrimeRecord>,
{
    records
        .into_iter()
        .filter(|r| !r.accused_arrested.is_yes())
        .filter(|r| {
            derive(r, reference_time)
                .unarrested_days
                .is_some_and(|d| d > UNARRESTED_THRESHOLD_DAYS)
        })
        .collect()
}
