use crate::aggregate::TrendSeries;
use crate::geo::{marker_color, MapPoint};
use crate::metrics::derive;
use crate::types::{
    CaseRow, CategoryCountRow, CrimeRecord, DueCaseRow, MapPointRow, TrendRow, UnarrestedRow,
};
use chrono::NaiveDateTime;

const MISSING: &str = "N/A";

fn text(v: &Option<String>) -> String {
    v.clone().unwrap_or_else(|| MISSING.to_string())
}

fn date(v: Option<NaiveDateTime>) -> String {
    v.map(|d| d.date().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

pub fn category_rows(counts: &[(String, usize)]) -> Vec<CategoryCountRow> {
    counts
        .iter()
        .map(|(category, count)| CategoryCountRow {
            category: category.clone(),
            count: *count,
        })
        .collect()
}

/// Flatten the trend series into long-format rows, chronological first and
/// by crime type within a month.
pub fn trend_rows(series: &[TrendSeries]) -> Vec<TrendRow> {
    let mut flat: Vec<_> = series
        .iter()
        .flat_map(|s| s.points.iter().map(move |(m, c)| (*m, s.crime_type.as_str(), *c)))
        .collect();
    flat.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    flat.into_iter()
        .map(|(month, crime, count)| TrendRow {
            month_year: month.to_string(),
            crime_type: crime.to_string(),
            count,
        })
        .collect()
}

pub fn map_rows(points: &[MapPoint]) -> Vec<MapPointRow> {
    points
        .iter()
        .map(|p| MapPointRow {
            latitude: p.coordinate.latitude,
            longitude: p.coordinate.longitude,
            fir_number: text(&p.fir_number),
            crime_type: text(&p.crime_type),
            date_reported: date(p.date_reported),
            color: marker_color(p.crime_type.as_deref()).to_string(),
        })
        .collect()
}

/// Full case listing with the derived lag and bucket fields alongside.
pub fn case_rows(records: &[&CrimeRecord], reference_time: NaiveDateTime) -> Vec<CaseRow> {
    let shown = |v: Option<String>| v.unwrap_or_else(|| MISSING.to_string());
    records
        .iter()
        .map(|r| (r, derive(r, reference_time)))
        .map(|(r, d)| CaseRow {
            case_id: r.case_id.clone(),
            fir_number: text(&r.fir_number),
            police_station: text(&r.police_station),
            crime_type: text(&r.crime_type),
            date_reported: date(r.date_reported),
            arrest_date: date(r.arrest_date),
            chargesheet_date: date(r.chargesheet_date),
            accused_arrested: r.accused_arrested.to_string(),
            chargesheet_filed: r.chargesheet_filed.to_string(),
            status: text(&r.status),
            location: text(&r.location),
            fir_to_arrest_days: shown(d.fir_to_arrest.map(|v| v.to_string())),
            arrest_to_chargesheet_days: shown(d.arrest_to_chargesheet.map(|v| v.to_string())),
            month_year: shown(d.month_bucket.map(|m| m.to_string())),
            season: shown(d.season.map(|s| s.to_string())),
        })
        .collect()
}

/// Due-soon listing, most urgent first.
pub fn due_rows(records: &[&CrimeRecord], reference_time: NaiveDateTime) -> Vec<DueCaseRow> {
    let mut rows: Vec<DueCaseRow> = records
        .iter()
        .filter_map(|r| {
            let d = derive(r, reference_time);
            Some(DueCaseRow {
                case_id: r.case_id.clone(),
                fir_number: text(&r.fir_number),
                police_station: text(&r.police_station),
                crime_type: text(&r.crime_type),
                date_reported: date(r.date_reported),
                due_date: date(d.chargesheet_due_date),
                days_left: d.days_left?,
            })
        })
        .collect();
    rows.sort_by(|a, b| a.days_left.cmp(&b.days_left).then_with(|| a.case_id.cmp(&b.case_id)));
    rows
}

/// Unarrested listing, oldest first.
pub fn unarrested_rows(
    records: &[&CrimeRecord],
    reference_time: NaiveDateTime,
) -> Vec<UnarrestedRow> {
    let mut rows: Vec<UnarrestedRow> = records
        .iter()
        .filter_map(|r| {
            Some(UnarrestedRow {
                case_id: r.case_id.clone(),
                fir_number: text(&r.fir_number),
                police_station: text(&r.police_station),
                crime_type: text(&r.crime_type),
                date_reported: date(r.date_reported),
                days_since_report: derive(r, reference_time).unarrested_days?,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        b.days_since_report
            .cmp(&a.days_since_report)
            .then_with(|| a.case_id.cmp(&b.case_id))
    });
    rows
}
