// Entry point and high-level CLI flow.
//
// One invocation is one dashboard interaction: load the sheet, pick the view
// from the flags, run filter -> derive -> aggregate over the snapshot and
// print (and optionally export) the resulting tables.
// - `--fir` switches to FIR search and ignores every other filter.
// - `--due-soon` and `--unarrested` are standalone follow-up listings.
// - Otherwise the full dashboard is shown for the selected filters.
mod aggregate;
mod config;
mod error;
mod filter;
mod geo;
mod loader;
mod metrics;
mod output;
mod reports;
mod types;
mod util;

use aggregate::GroupKey;
use chrono::NaiveDateTime;
use clap::Parser;
use config::Cli;
use filter::FilterCriteria;
use std::path::Path;
use types::Dataset;

/// Handle the FIR search view. Terminal: no charts, no map.
fn show_search(
    dataset: &Dataset,
    term: &str,
    now: NaiveDateTime,
    cli: &Cli,
    export_dir: Option<&Path>,
) {
    let found = filter::fir_search(&dataset.records, term);
    let rows = reports::case_rows(&found, now);
    println!("FIR Search Result: {term} ({} matches)", util::format_int(rows.len()));
    output::preview_table("Matching cases", &rows, cli.preview_rows);
    output::export_csv(export_dir, "fir_search.csv", &rows);
}

/// Handle the "chargesheet due soon" listing.
fn show_due_soon(dataset: &Dataset, now: NaiveDateTime, cli: &Cli, export_dir: Option<&Path>) {
    let due = filter::chargesheet_due_soon(&dataset.records, now);
    let rows = reports::due_rows(&due, now);
    println!("Chargesheet Due Soon");
    println!(
        "(Not filed, deadline within {} days of {})",
        filter::DUE_SOON_WINDOW_DAYS,
        now.date()
    );
    for row in &rows {
        println!(
            "Case ID: {} | FIR: {} | {} days left (due {})",
            row.case_id, row.fir_number, row.days_left, row.due_date
        );
    }
    output::preview_table("Due soon", &rows, cli.preview_rows);
    output::export_csv(export_dir, "chargesheet_due_soon.csv", &rows);
}

/// Handle the "accused not arrested" listing.
fn show_unarrested(dataset: &Dataset, now: NaiveDateTime, cli: &Cli, export_dir: Option<&Path>) {
    let open = filter::unarrested_beyond_threshold(&dataset.records, now);
    let rows = reports::unarrested_rows(&open, now);
    println!(
        "Accused Not Arrested Beyond {} Days",
        filter::UNARRESTED_THRESHOLD_DAYS
    );
    for row in &rows {
        println!(
            "Case ID: {} | FIR: {} | reported {} days ago",
            row.case_id, row.fir_number, row.days_since_report
        );
    }
    output::preview_table("Unarrested", &rows, cli.preview_rows);
    output::export_csv(export_dir, "unarrested.csv", &rows);
}

/// Handle the main dashboard: metrics, category breakdowns, monthly trend
/// and map points for the current filter selection.
fn show_dashboard(
    dataset: &Dataset,
    criteria: &FilterCriteria,
    cli: &Cli,
    export_dir: Option<&Path>,
) {
    let filtered = filter::filter(&dataset.records, criteria);
    let summary = metrics::summarize(&filtered);

    println!("Crime Dashboard");
    if let Some((from, to)) = criteria.date_range {
        println!("(Reported {from} to {to})");
    }
    println!("\nKey Metrics");
    println!("  Total Cases:              {}", util::format_int(summary.total_cases));
    println!("  FIR Numbers:              {}", util::format_int(summary.fir_numbers));
    println!(
        "  Arrests Made:             {} ({})",
        util::format_int(summary.arrests_made),
        util::format_pct(summary.arrest_rate_pct)
    );
    println!(
        "  Charge Sheets Filed:      {} ({})",
        util::format_int(summary.chargesheets_filed),
        util::format_pct(summary.chargesheet_rate_pct)
    );
    println!(
        "  Avg FIR -> Arrest:        {}",
        util::format_days(summary.avg_fir_to_arrest_days)
    );
    println!(
        "  Avg Arrest -> Chargesheet: {}",
        util::format_days(summary.avg_arrest_to_chargesheet_days)
    );

    for key in GroupKey::ALL {
        let rows = reports::category_rows(&aggregate::aggregate(&filtered, key));
        output::preview_table(key.title(), &rows, cli.preview_rows);
        output::export_csv(export_dir, key.file_name(), &rows);
    }

    let trend = reports::trend_rows(&aggregate::monthly_trend(&filtered));
    output::preview_table("Monthly Crime Trend", &trend, cli.preview_rows);
    output::export_csv(export_dir, "monthly_trend.csv", &trend);

    let points = reports::map_rows(&geo::map_points(&filtered));
    println!(
        "\nCrime Map: {} of {} cases located (center {}, {})",
        util::format_int(points.len()),
        util::format_int(filtered.len()),
        geo::DEFAULT_CENTER.latitude,
        geo::DEFAULT_CENTER.longitude
    );
    output::preview_table("Map points", &points, cli.preview_rows);
    output::export_csv(export_dir, "map_points.csv", &points);

    if let Some(dir) = export_dir {
        let path = dir.join("summary.json");
        if let Err(e) = output::write_json(&path, &summary) {
            log::error!("Write error for {}: {e}", path.display());
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let (dataset, report) = loader::load(&cli.source)?;
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        util::format_int(report.total_rows),
        util::format_int(dataset.len())
    );
    if dataset.is_empty() {
        log::warn!("No usable records in {}", cli.source);
    }
    if report.parse_errors + report.duplicate_ids > 0 {
        println!(
            "Note: {} rows skipped as unreadable, {} as duplicate case ids.",
            util::format_int(report.parse_errors),
            util::format_int(report.duplicate_ids)
        );
    }
    if report.missing_date_reported > 0 {
        println!(
            "Info: {} rows have no report date and are left out of date-based views.",
            util::format_int(report.missing_date_reported)
        );
    }
    println!();

    let export_dir = cli.export_dir.as_deref();
    if let Some(dir) = export_dir {
        std::fs::create_dir_all(dir)?;
    }

    let now = cli.reference_time();
    let criteria = cli.criteria(&dataset);
    log::debug!("Reference time {now}, criteria {criteria:?}");

    if let Some(term) = criteria.search_term() {
        show_search(&dataset, term, now, &cli, export_dir);
    } else if cli.due_soon {
        show_due_soon(&dataset, now, &cli, export_dir);
    } else if cli.unarrested {
        show_unarrested(&dataset, now, &cli, export_dir);
    } else {
        show_dashboard(&dataset, &criteria, &cli, export_dir);
    }
    Ok(())
}
