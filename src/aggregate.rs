use crate::metrics::{MonthBucket, Season};
use crate::types::CrimeRecord;
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};

/// Category used by the bar and pie breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    CrimeType,
    Station,
    Status,
    Season,
}

impl GroupKey {
    pub const ALL: [GroupKey; 4] = [
        GroupKey::CrimeType,
        GroupKey::Station,
        GroupKey::Status,
        GroupKey::Season,
    ];

    pub fn title(self) -> &'static str {
        match self {
            GroupKey::CrimeType => "Crime Type Distribution",
            GroupKey::Station => "Cases per Police Station",
            GroupKey::Status => "Case Status Overview",
            GroupKey::Season => "Seasonal Crime Analysis",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            GroupKey::CrimeType => "crime_types.csv",
            GroupKey::Station => "stations.csv",
            GroupKey::Status => "status.csv",
            GroupKey::Season => "seasons.csv",
        }
    }

    fn category(self, record: &CrimeRecord) -> Option<String> {
        match self {
            GroupKey::CrimeType => record.crime_type.clone(),
            GroupKey::Station => record.police_station.clone(),
            GroupKey::Status => record.status.clone(),
            GroupKey::Season => record
                .date_reported
                .and_then(|d| Season::from_month(d.month()))
                .map(|s| s.to_string()),
        }
    }
}

/// Count records per category, largest first (ties by name). Records with no
/// value for the category are left out.
pub fn aggregate(records: &[&CrimeRecord], key: GroupKey) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for r in records {
        if let Some(cat) = key.category(r) {
            *counts.entry(cat).or_default() += 1;
        }
    }
    let mut out: Vec<(String, usize)> = counts.into_iter().collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

/// One line of the monthly trend chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendSeries {
    pub crime_type: String,
    /// Chronological. Months without cases are absent, not zero.
    pub points: Vec<(MonthBucket, usize)>,
}

/// Cases per (month, crime type), one series per crime type ordered by name.
/// Records without a report date or crime type do not contribute.
pub fn monthly_trend(records: &[&CrimeRecord]) -> Vec<TrendSeries> {
    let mut grid: BTreeMap<&str, BTreeMap<MonthBucket, usize>> = BTreeMap::new();
    for r in records {
        let (Some(reported), Some(crime)) = (r.date_reported, r.crime_type.as_deref()) else {
            continue;
        };
        *grid
            .entry(crime)
            .or_default()
            .entry(MonthBucket::of(reported))
            .or_default() += 1;
    }
    grid.into_iter()
        .map(|(crime, months)| TrendSeries {
            crime_type: crime.to_string(),
            points: months.into_iter().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn rec(id: &str, crime: Option<&str>, status: Option<&str>, date: Option<&str>) -> CrimeRecord {
        CrimeRecord {
            crime_type: crime.map(str::to_string),
            status: status.map(str::to_string),
            date_reported: date.map(at),
            ..CrimeRecord::empty(id)
        }
    }

    #[test]
    fn counts_largest_first_and_skips_nulls() {
        let recs = [
            rec("1", Some("Theft"), Some("Open"), None),
            rec("2", Some("Murder"), None, None),
            rec("3", Some("Theft"), Some("Closed"), None),
            rec("4", None, Some("Open"), None),
            rec("5", Some("Assault"), Some("Open"), None),
        ];
        let refs: Vec<&CrimeRecord> = recs.iter().collect();
        assert_eq!(
            aggregate(&refs, GroupKey::CrimeType),
            vec![
                ("Theft".to_string(), 2),
                ("Assault".to_string(), 1),
                ("Murder".to_string(), 1),
            ]
        );
        assert_eq!(
            aggregate(&refs, GroupKey::Status),
            vec![("Open".to_string(), 3), ("Closed".to_string(), 1)]
        );
    }

    #[test]
    fn season_counts_use_report_month() {
        let recs = [
            rec("1", None, None, Some("2024-01-10")),
            rec("2", None, None, Some("2024-12-10")),
            rec("3", None, None, Some("2024-07-10")),
            rec("4", None, None, None),
        ];
        let refs: Vec<&CrimeRecord> = recs.iter().collect();
        assert_eq!(
            aggregate(&refs, GroupKey::Season),
            vec![("Winter".to_string(), 2), ("Monsoon".to_string(), 1)]
        );
    }

    #[test]
    fn empty_input_gives_empty_tables() {
        assert!(aggregate(&[], GroupKey::Station).is_empty());
        assert!(monthly_trend(&[]).is_empty());
    }

    #[test]
    fn trend_is_chronological_with_gaps() {
        let recs = [
            rec("1", Some("Theft"), None, Some("2024-01-03")),
            rec("2", Some("Theft"), None, Some("2023-02-14")),
            rec("3", Some("Theft"), None, Some("2024-01-20")),
            rec("4", Some("Murder"), None, Some("2023-03-01")),
            rec("5", Some("Theft"), None, None),
            rec("6", None, None, Some("2023-03-01")),
        ];
        let refs: Vec<&CrimeRecord> = recs.iter().collect();
        let trend = monthly_trend(&refs);
        assert_eq!(trend.len(), 2);

        assert_eq!(trend[0].crime_type, "Murder");
        assert_eq!(trend[0].points, vec![(MonthBucket { year: 2023, month: 3 }, 1)]);

        assert_eq!(trend[1].crime_type, "Theft");
        let labels: Vec<String> = trend[1].points.iter().map(|(m, _)| m.to_string()).collect();
        assert_eq!(labels, vec!["Feb-2023", "Jan-2024"]);
        assert_eq!(trend[1].points[1].1, 2);
    }
}
