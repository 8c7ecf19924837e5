use crate::error::DashboardError;
use crate::types::{CrimeRecord, Dataset, RawRow};
use crate::util::{
    clean_text, infer_day_month_order, normalize_header, parse_datetime_safe, parse_flag,
    DayMonthOrder,
};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;
use std::io::Read;

/// Columns the pipeline cannot run without. All others default to empty.
const REQUIRED_COLUMNS: &[&str] = &["case_id", "date_reported"];

/// Slashed-date order of each date column, decided once per load.
#[derive(Debug, Clone, Copy, Default)]
struct DateColumns {
    date_reported: DayMonthOrder,
    arrest_date: DayMonthOrder,
    chargesheet_date: DayMonthOrder,
}

impl DateColumns {
    fn infer(rows: &[RawRow]) -> Self {
        DateColumns {
            date_reported: infer_day_month_order(rows.iter().map(|r| r.date_reported.as_deref())),
            arrest_date: infer_day_month_order(rows.iter().map(|r| r.arrest_date.as_deref())),
            chargesheet_date: infer_day_month_order(
                rows.iter().map(|r| r.chargesheet_date.as_deref()),
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub duplicate_ids: usize,
    pub missing_date_reported: usize,
}

/// Load the dataset from a local path or an `http(s)://` URL.
pub fn load(source: &str) -> Result<(Dataset, LoadReport), DashboardError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        log::info!("Downloading dataset from {source}");
        let body = reqwest::blocking::get(source)
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|e| DashboardError::Http {
                url: source.to_string(),
                source: e,
            })?;
        log::debug!("Downloaded {} bytes", body.len());
        load_from_reader(body.as_ref())
    } else {
        log::info!("Reading dataset from {source}");
        let file = std::fs::File::open(source)?;
        load_from_reader(file)
    }
}

/// Parse CSV text into the canonical dataset. Headers are normalized before
/// any row is read, so `"Date Reported"` and `date_reported` are the same
/// column.
pub fn load_from_reader<R: Read>(reader: R) -> Result<(Dataset, LoadReport), DashboardError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: StringRecord = rdr.headers()?.iter().map(normalize_header).collect();
    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *required) {
            return Err(DashboardError::MissingColumn(required));
        }
    }
    rdr.set_headers(headers);

    let mut report = LoadReport::default();
    let mut rows: Vec<RawRow> = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        match result {
            Ok(r) => rows.push(r),
            Err(e) => {
                log::debug!("Row {}: unreadable ({e})", report.total_rows);
                report.parse_errors += 1;
            }
        }
    }

    let columns = DateColumns::infer(&rows);
    log::debug!("Date column order: {columns:?}");

    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut records: Vec<CrimeRecord> = Vec::new();
    for row in rows {
        let Some(record) = clean_row(row, &columns) else {
            log::debug!("Row without case_id skipped");
            report.parse_errors += 1;
            continue;
        };

        if !seen_ids.insert(record.case_id.clone()) {
            log::warn!("Duplicate case_id '{}' dropped", record.case_id);
            report.duplicate_ids += 1;
            continue;
        }

        if record.date_reported.is_none() {
            report.missing_date_reported += 1;
        }
        records.push(record);
    }

    report.loaded_rows = records.len();
    log::info!(
        "Loaded {} of {} rows ({} unreadable, {} duplicate ids, {} without date_reported)",
        report.loaded_rows,
        report.total_rows,
        report.parse_errors,
        report.duplicate_ids,
        report.missing_date_reported
    );
    Ok((Dataset::new(records), report))
}

fn clean_row(row: RawRow, columns: &DateColumns) -> Option<CrimeRecord> {
    let case_id = clean_text(row.case_id.as_deref())?;
    Some(CrimeRecord {
        case_id,
        fir_number: clean_text(row.fir_number.as_deref()),
        police_station: clean_text(row.police_station.as_deref()),
        crime_type: clean_text(row.crime_type.as_deref()),
        date_reported: parse_datetime_safe(row.date_reported.as_deref(), columns.date_reported),
        arrest_date: parse_datetime_safe(row.arrest_date.as_deref(), columns.arrest_date),
        chargesheet_date: parse_datetime_safe(
            row.chargesheet_date.as_deref(),
            columns.chargesheet_date,
        ),
        accused_arrested: parse_flag(row.accused_arrested.as_deref()),
        chargesheet_filed: parse_flag(row.chargesheet_filed.as_deref()),
        status: clean_text(row.status.as_deref()),
        location: clean_text(row.location.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Flag;
    use chrono::NaiveDate;

    const SHEET: &str = "\
Case ID, FIR Number ,Police Station,Crime Type,Date Reported,Arrest Date,Chargesheet Date,Accused Arrested,Chargesheet Filed,Status,Location
C1,FIR-001/2024,Kotwali,Theft,2024-01-01,2024-01-10,,Yes,No,Under Investigation,\"19.07,82.01\"
C2,,Bodhghat,Murder,garbage,,,no,,Closed,
C1,FIR-999/2024,Kotwali,Theft,2024-02-01,,,No,No,Open,
,FIR-003/2024,Kotwali,Drugs,2024-03-01,,,No,No,Open,
";

    #[test]
    fn normalizes_headers_and_cleans_rows() {
        let (ds, report) = load_from_reader(SHEET.as_bytes()).unwrap();
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.duplicate_ids, 1);
        assert_eq!(report.parse_errors, 1);
        assert_eq!(report.missing_date_reported, 1);

        let c1 = &ds.records[0];
        assert_eq!(c1.case_id, "C1");
        assert_eq!(c1.fir_number.as_deref(), Some("FIR-001/2024"));
        assert_eq!(
            c1.date_reported.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert!(c1.chargesheet_date.is_none());
        assert_eq!(c1.accused_arrested, Flag::Yes);
        assert_eq!(c1.chargesheet_filed, Flag::No);
        assert_eq!(c1.location.as_deref(), Some("19.07,82.01"));

        let c2 = &ds.records[1];
        assert!(c2.fir_number.is_none());
        assert!(c2.date_reported.is_none());
        assert_eq!(c2.chargesheet_filed, Flag::Unknown);
    }

    #[test]
    fn first_occurrence_of_duplicate_id_wins() {
        let (ds, _) = load_from_reader(SHEET.as_bytes()).unwrap();
        let c1: Vec<_> = ds.records.iter().filter(|r| r.case_id == "C1").collect();
        assert_eq!(c1.len(), 1);
        assert_eq!(c1[0].status.as_deref(), Some("Under Investigation"));
    }

    #[test]
    fn optional_columns_may_be_absent() {
        let csv = "case_id,date_reported\nA,2024-05-05\n";
        let (ds, report) = load_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(report.loaded_rows, 1);
        assert!(ds.records[0].location.is_none());
        assert_eq!(ds.records[0].accused_arrested, Flag::Unknown);
    }

    fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn day_first_column_reads_ambiguous_dates_day_first() {
        let csv = "case_id,date_reported,arrest_date\n\
                   A,15/01/2024,03/02/2024\n\
                   B,03/02/2024,\n\
                   C,1/15/2024,\n";
        let (ds, _) = load_from_reader(csv.as_bytes()).unwrap();
        let reported: Vec<_> = ds
            .records
            .iter()
            .map(|r| r.date_reported.map(|d| d.date()))
            .collect();
        assert_eq!(reported, vec![day(2024, 1, 15), day(2024, 2, 3), day(2024, 1, 15)]);
        // Nothing decisive in arrest_date, so it stays month-first.
        assert_eq!(ds.records[0].arrest_date.map(|d| d.date()), day(2024, 3, 2));
    }

    #[test]
    fn month_first_column_reads_ambiguous_dates_month_first() {
        let csv = "case_id,date_reported\nA,01/15/2024\nB,03/02/2024\n";
        let (ds, _) = load_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.records[0].date_reported.map(|d| d.date()), day(2024, 1, 15));
        assert_eq!(ds.records[1].date_reported.map(|d| d.date()), day(2024, 3, 2));
    }

    #[test]
    fn slashed_datetimes_keep_their_time() {
        let csv = "case_id,date_reported,chargesheet_date\n\
                   A,1/15/2024 10:30:00,25/01/2024 16:45\n";
        let (ds, report) = load_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(report.missing_date_reported, 0);
        let reported = ds.records[0].date_reported.unwrap();
        assert_eq!(reported.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(reported.format("%H:%M").to_string(), "10:30");
        let filed = ds.records[0].chargesheet_date.unwrap();
        assert_eq!(filed.format("%Y-%m-%d %H:%M").to_string(), "2024-01-25 16:45");
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let csv = "case_id,crime_type\nA,Theft\n";
        let err = load_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn("date_reported")));
    }
}
