use crate::filter::FilterCriteria;
use crate::types::Dataset;
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::Parser;
use std::path::PathBuf;

/// Published CSV export of the incident sheet.
pub const DEFAULT_SOURCE: &str = "https://docs.google.com/spreadsheets/d/1m1K7kwXxiLClu4dPbb3YgpnCTok6sGoJarjZkIV_1gE/export?format=csv";

#[derive(Debug, Parser)]
#[command(
    name = "crime_dashboard",
    about = "Crime incident dashboard: case status, arrest timeliness and chargesheet deadlines"
)]
pub struct Cli {
    /// CSV file path or http(s) URL of the incident sheet
    #[arg(long, env = "CRIME_DASHBOARD_SOURCE", default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// First report date to include (YYYY-MM-DD). Defaults to the earliest in the data
    #[arg(long, value_parser = parse_day)]
    pub from: Option<NaiveDate>,

    /// Last report date to include (YYYY-MM-DD). Defaults to the latest in the data
    #[arg(long, value_parser = parse_day)]
    pub to: Option<NaiveDate>,

    /// Police station to include (repeatable). Defaults to all
    #[arg(long = "station")]
    pub stations: Vec<String>,

    /// Crime type to include (repeatable). Defaults to all
    #[arg(long = "crime-type")]
    pub crime_types: Vec<String>,

    /// Search by FIR number; ignores every other filter
    #[arg(long)]
    pub fir: Option<String>,

    /// List cases whose chargesheet deadline is within 10 days
    #[arg(long, conflicts_with = "unarrested")]
    pub due_soon: bool,

    /// List cases with the accused not arrested after 45 days
    #[arg(long)]
    pub unarrested: bool,

    /// Reference date for deadline arithmetic (YYYY-MM-DD). Defaults to now
    #[arg(long, env = "CRIME_DASHBOARD_TODAY", value_parser = parse_day)]
    pub today: Option<NaiveDate>,

    /// Directory to write CSV tables and summary.json into
    #[arg(long, env = "CRIME_DASHBOARD_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,

    /// Rows to show per table preview
    #[arg(long, default_value_t = 10)]
    pub preview_rows: usize,
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("'{s}': {e} (expected YYYY-MM-DD)"))
}

/// Trim option values the same way cells are trimmed on load, dropping
/// blanks.
fn trimmed(values: &[String]) -> impl Iterator<Item = String> + '_ {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Cli {
    /// Reference time for lag and deadline arithmetic. An explicit `--today`
    /// is taken at midnight.
    pub fn reference_time(&self) -> NaiveDateTime {
        self.today
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_else(|| Local::now().naive_local())
    }

    /// Build the dashboard criteria, starting from "everything selected" and
    /// narrowing by whatever was given on the command line.
    pub fn criteria(&self, dataset: &Dataset) -> FilterCriteria {
        let mut criteria = FilterCriteria::defaults_for(dataset);
        if self.from.is_some() || self.to.is_some() {
            let (lo, hi) = criteria
                .date_range
                .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
            criteria.date_range = Some((self.from.unwrap_or(lo), self.to.unwrap_or(hi)));
        }
        if !self.stations.is_empty() {
            criteria.stations = trimmed(&self.stations).collect();
        }
        if !self.crime_types.is_empty() {
            criteria.crime_types = trimmed(&self.crime_types).collect();
        }
        criteria.fir_query = self.fir.clone();
        criteria
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CrimeRecord;
    use clap::CommandFactory;

    fn dataset() -> Dataset {
        let at = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(0, 0, 0)
        };
        Dataset::new(vec![
            CrimeRecord {
                police_station: Some("Kotwali".into()),
                crime_type: Some("Theft".into()),
                date_reported: at("2024-01-01"),
                ..CrimeRecord::empty("1")
            },
            CrimeRecord {
                police_station: Some("Bodhghat".into()),
                crime_type: Some("Murder".into()),
                date_reported: at("2024-06-30"),
                ..CrimeRecord::empty("2")
            },
        ])
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_select_whole_dataset() {
        let cli = Cli::parse_from(["crime_dashboard", "--source", "cases.csv"]);
        let c = cli.criteria(&dataset());
        assert_eq!(c.stations.len(), 2);
        assert_eq!(c.crime_types.len(), 2);
        assert_eq!(
            c.date_range,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
            ))
        );
        assert!(c.fir_query.is_none());
    }

    #[test]
    fn flags_narrow_the_selection() {
        let cli = Cli::parse_from([
            "crime_dashboard",
            "--source",
            "cases.csv",
            "--from",
            "2024-03-01",
            "--station",
            "Kotwali",
            "--fir",
            "101",
            "--today",
            "2024-02-25",
        ]);
        let c = cli.criteria(&dataset());
        assert_eq!(
            c.date_range,
            Some((
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
            ))
        );
        assert_eq!(c.stations.len(), 1);
        assert_eq!(c.search_term(), Some("101"));
        assert_eq!(
            cli.reference_time(),
            NaiveDate::from_ymd_opt(2024, 2, 25)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn padded_station_and_crime_type_still_match() {
        let ds = dataset();
        let cli = Cli::parse_from([
            "crime_dashboard",
            "--station",
            " Kotwali ",
            "--station",
            "  ",
            "--crime-type",
            "Theft\t",
        ]);
        let c = cli.criteria(&ds);
        assert_eq!(c.stations.len(), 1);
        assert!(c.stations.contains("Kotwali"));
        assert!(c.crime_types.contains("Theft"));
        let hits = crate::filter::filter(&ds.records, &c);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].case_id, "1");
    }

    #[test]
    fn rejects_bad_dates_and_conflicting_modes() {
        assert!(Cli::try_parse_from(["crime_dashboard", "--from", "01/02/2024"]).is_err());
        assert!(Cli::try_parse_from(["crime_dashboard", "--due-soon", "--unarrested"]).is_err());
    }
}
