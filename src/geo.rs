// Map marker extraction.
//
// Rendering is someone else's job; this module only turns records into
// points. A record whose `location` does not parse is dropped from the map
// and nowhere else.
use crate::error::LocationError;
use crate::types::CrimeRecord;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Jagdalpur, the default map center.
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    latitude: 19.0748,
    longitude: 82.0186,
};

pub const FALLBACK_COLOR: &str = "gray";

static MARKER_COLORS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Theft", "red"),
        ("Murder", "black"),
        ("Assault", "orange"),
        ("Drugs", "green"),
        ("Cybercrime", "blue"),
        ("Other", "purple"),
    ])
});

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub coordinate: Coordinate,
    pub fir_number: Option<String>,
    pub crime_type: Option<String>,
    pub date_reported: Option<NaiveDateTime>,
}

/// Parse `"lat,lon"`. Exactly two finite numbers, whitespace allowed around
/// each.
pub fn parse_location(s: &str) -> Result<Coordinate, LocationError> {
    if s.trim().is_empty() {
        return Err(LocationError::Empty);
    }
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return Err(LocationError::WrongArity(parts.len()));
    }
    let num = |p: &str| {
        p.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| LocationError::NotNumeric(p.to_string()))
    };
    Ok(Coordinate {
        latitude: num(parts[0])?,
        longitude: num(parts[1])?,
    })
}

/// Marker color for a crime type; unlisted types are gray.
pub fn marker_color(crime_type: Option<&str>) -> &'static str {
    crime_type
        .and_then(|c| MARKER_COLORS.get(c).copied())
        .unwrap_or(FALLBACK_COLOR)
}

/// Points for every record with a usable location, in input order.
pub fn map_points(records: &[&CrimeRecord]) -> Vec<MapPoint> {
    let mut skipped = 0usize;
    let points: Vec<MapPoint> = records
        .iter()
        .filter_map(|r| {
            let raw = r.location.as_deref()?;
            match parse_location(raw) {
                Ok(coordinate) => Some(MapPoint {
                    coordinate,
                    fir_number: r.fir_number.clone(),
                    crime_type: r.crime_type.clone(),
                    date_reported: r.date_reported,
                }),
                Err(e) => {
                    log::debug!("Case {}: location '{raw}' skipped ({e})", r.case_id);
                    skipped += 1;
                    None
                }
            }
        })
        .collect();
    if skipped > 0 {
        log::info!("{skipped} records with malformed locations left off the map");
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, GroupKey};

    #[test]
    fn parses_two_numbers() {
        let c = parse_location("19.0748, 82.0186").unwrap();
        assert!((c.latitude - 19.0748).abs() < f64::EPSILON);
        assert!((c.longitude - 82.0186).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_malformed_locations() {
        assert_eq!(parse_location(""), Err(LocationError::Empty));
        assert_eq!(parse_location("not,a,coord"), Err(LocationError::WrongArity(3)));
        assert_eq!(parse_location("19.07"), Err(LocationError::WrongArity(1)));
        assert_eq!(
            parse_location("north,82.01"),
            Err(LocationError::NotNumeric("north".to_string()))
        );
        assert!(parse_location("NaN,82.01").is_err());
    }

    #[test]
    fn colors_by_crime_type() {
        assert_eq!(marker_color(Some("Theft")), "red");
        assert_eq!(marker_color(Some("Cybercrime")), "blue");
        assert_eq!(marker_color(Some("Arson")), "gray");
        assert_eq!(marker_color(None), "gray");
    }

    #[test]
    fn malformed_location_dropped_from_map_only() {
        let good = CrimeRecord {
            crime_type: Some("Theft".into()),
            fir_number: Some("FIR-1".into()),
            location: Some("19.07,82.01".into()),
            ..CrimeRecord::empty("good")
        };
        let bad = CrimeRecord {
            crime_type: Some("Theft".into()),
            location: Some("not,a,coord".into()),
            ..CrimeRecord::empty("bad")
        };
        let missing = CrimeRecord {
            crime_type: Some("Murder".into()),
            ..CrimeRecord::empty("missing")
        };
        let refs = vec![&good, &bad, &missing];

        let points = map_points(&refs);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].fir_number.as_deref(), Some("FIR-1"));

        let counts = aggregate(&refs, GroupKey::CrimeType);
        assert_eq!(
            counts,
            vec![("Theft".to_string(), 2), ("Murder".to_string(), 1)]
        );
    }
}
