use crate::error::DashboardError;
use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DashboardError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    log::debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DashboardError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Render the first `max_rows` rows as a markdown table, followed by a
/// count of the rows left out.
pub fn render_preview<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    if rows.is_empty() {
        return "(no rows)\n".to_string();
    }
    let mut out = String::new();
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if !slice.is_empty() {
        out.push_str(&Table::new(slice).with(Style::markdown()).to_string());
        out.push('\n');
    }
    if rows.len() > max_rows {
        out.push_str(&format!("... {} more rows\n", rows.len() - max_rows));
    }
    out
}

/// Print a section heading and its table preview. An empty table is a
/// normal state, not an error.
pub fn preview_table<T>(title: &str, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    println!();
    println!("{}", render_preview(rows, max_rows));
}

/// Write `rows` to `dir/name` when an export directory was requested.
pub fn export_csv<T: Serialize>(dir: Option<&Path>, name: &str, rows: &[T]) {
    let Some(dir) = dir else {
        return;
    };
    let path = dir.join(name);
    match write_csv(&path, rows) {
        Ok(()) => println!("(Full table exported to {})", path.display()),
        Err(e) => log::error!("Write error for {}: {e}", path.display()),
    }
}
