use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tabled::Tabled;

/// One spreadsheet row, keyed by the normalized (snake_case) header names.
///
/// Every cell is optional text; typing happens in the loader so one bad cell
/// never rejects the whole row.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub case_id: Option<String>,
    pub fir_number: Option<String>,
    pub police_station: Option<String>,
    pub crime_type: Option<String>,
    pub date_reported: Option<String>,
    pub arrest_date: Option<String>,
    pub chargesheet_date: Option<String>,
    pub accused_arrested: Option<String>,
    pub chargesheet_filed: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
}

/// Three-state reading of a yes/no column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Flag {
    Yes,
    No,
    Unknown,
}

impl Flag {
    pub fn is_yes(self) -> bool {
        self == Flag::Yes
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Flag::Yes => "Yes",
            Flag::No => "No",
            Flag::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// A cleaned incident record. Never mutated after load.
#[derive(Debug, Clone, PartialEq)]
pub struct CrimeRecord {
    pub case_id: String,
    pub fir_number: Option<String>,
    pub police_station: Option<String>,
    pub crime_type: Option<String>,
    pub date_reported: Option<NaiveDateTime>,
    pub arrest_date: Option<NaiveDateTime>,
    pub chargesheet_date: Option<NaiveDateTime>,
    pub accused_arrested: Flag,
    pub chargesheet_filed: Flag,
    pub status: Option<String>,
    pub location: Option<String>,
}

impl CrimeRecord {
    /// A record with only an id; everything else undefined. Handy as a base
    /// for struct-update syntax.
    #[cfg(test)]
    pub fn empty(case_id: impl Into<String>) -> Self {
        CrimeRecord {
            case_id: case_id.into(),
            fir_number: None,
            police_station: None,
            crime_type: None,
            date_reported: None,
            arrest_date: None,
            chargesheet_date: None,
            accused_arrested: Flag::Unknown,
            chargesheet_filed: Flag::Unknown,
            status: None,
            location: None,
        }
    }
}

/// The canonical, read-only snapshot loaded once per session.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<CrimeRecord>,
}

impl Dataset {
    pub fn new(records: Vec<CrimeRecord>) -> Self {
        Dataset { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-null stations in load order.
    pub fn stations(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.police_station.as_deref()))
    }

    /// Distinct non-null crime types in load order.
    pub fn crime_types(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.crime_type.as_deref()))
    }

    /// Earliest and latest `date_reported` calendar dates, if any record has one.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self
            .records
            .iter()
            .filter_map(|r| r.date_reported.map(|d| d.date()));
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for v in values.flatten() {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CategoryCountRow {
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TrendRow {
    #[serde(rename = "MonthYear")]
    #[tabled(rename = "MonthYear")]
    pub month_year: String,
    #[serde(rename = "CrimeType")]
    #[tabled(rename = "CrimeType")]
    pub crime_type: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MapPointRow {
    #[serde(rename = "Latitude")]
    #[tabled(rename = "Latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude")]
    #[tabled(rename = "Longitude")]
    pub longitude: f64,
    #[serde(rename = "FIR")]
    #[tabled(rename = "FIR")]
    pub fir_number: String,
    #[serde(rename = "CrimeType")]
    #[tabled(rename = "CrimeType")]
    pub crime_type: String,
    #[serde(rename = "DateReported")]
    #[tabled(rename = "DateReported")]
    pub date_reported: String,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CaseRow {
    #[serde(rename = "CaseId")]
    #[tabled(rename = "CaseId")]
    pub case_id: String,
    #[serde(rename = "FIR")]
    #[tabled(rename = "FIR")]
    pub fir_number: String,
    #[serde(rename = "Station")]
    #[tabled(rename = "Station")]
    pub police_station: String,
    #[serde(rename = "CrimeType")]
    #[tabled(rename = "CrimeType")]
    pub crime_type: String,
    #[serde(rename = "DateReported")]
    #[tabled(rename = "DateReported")]
    pub date_reported: String,
    #[serde(rename = "ArrestDate")]
    #[tabled(rename = "ArrestDate")]
    pub arrest_date: String,
    #[serde(rename = "ChargesheetDate")]
    #[tabled(rename = "ChargesheetDate")]
    pub chargesheet_date: String,
    #[serde(rename = "Arrested")]
    #[tabled(rename = "Arrested")]
    pub accused_arrested: String,
    #[serde(rename = "ChargesheetFiled")]
    #[tabled(rename = "ChargesheetFiled")]
    pub chargesheet_filed: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Location")]
    #[tabled(rename = "Location")]
    pub location: String,
    #[serde(rename = "FirToArrestDays")]
    #[tabled(rename = "FirToArrestDays")]
    pub fir_to_arrest_days: String,
    #[serde(rename = "ArrestToChargesheetDays")]
    #[tabled(rename = "ArrestToChargesheetDays")]
    pub arrest_to_chargesheet_days: String,
    #[serde(rename = "MonthYear")]
    #[tabled(rename = "MonthYear")]
    pub month_year: String,
    #[serde(rename = "Season")]
    #[tabled(rename = "Season")]
    pub season: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DueCaseRow {
    #[serde(rename = "CaseId")]
    #[tabled(rename = "CaseId")]
    pub case_id: String,
    #[serde(rename = "FIR")]
    #[tabled(rename = "FIR")]
    pub fir_number: String,
    #[serde(rename = "Station")]
    #[tabled(rename = "Station")]
    pub police_station: String,
    #[serde(rename = "CrimeType")]
    #[tabled(rename = "CrimeType")]
    pub crime_type: String,
    #[serde(rename = "DateReported")]
    #[tabled(rename = "DateReported")]
    pub date_reported: String,
    #[serde(rename = "DueDate")]
    #[tabled(rename = "DueDate")]
    pub due_date: String,
    #[serde(rename = "DaysLeft")]
    #[tabled(rename = "DaysLeft")]
    pub days_left: i64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct UnarrestedRow {
    #[serde(rename = "CaseId")]
    #[tabled(rename = "CaseId")]
    pub case_id: String,
    #[serde(rename = "FIR")]
    #[tabled(rename = "FIR")]
    pub fir_number: String,
    #[serde(rename = "Station")]
    #[tabled(rename = "Station")]
    pub police_station: String,
    #[serde(rename = "CrimeType")]
    #[tabled(rename = "CrimeType")]
    pub crime_type: String,
    #[serde(rename = "DateReported")]
    #[tabled(rename = "DateReported")]
    pub date_reported: String,
    #[serde(rename = "DaysSinceReport")]
    #[tabled(rename = "DaysSinceReport")]
    pub days_since_report: i64,
}

/// Headline numbers for the dashboard view, exported as `summary.json`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_cases: usize,
    pub fir_numbers: usize,
    pub arrests_made: usize,
    pub chargesheets_filed: usize,
    pub arrest_rate_pct: Option<f64>,
    pub chargesheet_rate_pct: Option<f64>,
    pub avg_fir_to_arrest_days: Option<f64>,
    pub avg_arrest_to_chargesheet_days: Option<f64>,
}
