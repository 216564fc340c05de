// src/page/export.rs
// =============================================================================
// CSV export of the aggregate.
//
// One row per URL across all buckets. Every row repeats the page-wide
// counters, so a spreadsheet can filter rows and still see the totals.
// =============================================================================

use chrono::{DateTime, Utc};

use super::aggregate::StatusSnapshot;
use crate::checker::StatusKind;

pub const CSV_HEADER: &str = concat!(
    "Page URL,Link URL,Status,",
    "OK Count,Redirect Count,Broken Count,",
    "Network Error Count,Invalid URL Count,Unknown Count"
);

// Builds the CSV text for a page
//
// With nothing resolved yet, this is just the header line
pub fn generate_csv(page_url: &str, snapshot: &StatusSnapshot) -> String {
    let counts = &snapshot.counts;
    let totals = StatusKind::ALL
        .iter()
        .map(|&kind| counts.get(kind).to_string())
        .collect::<Vec<_>>()
        .join(",");

    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');

    for (kind, url) in snapshot.urls.iter() {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            quote(page_url),
            quote(url),
            quote(kind.as_str()),
            totals
        ));
    }

    csv
}

/// File name the export is saved under, e.g. `link-status-2024-05-01.csv`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("link-status-{}.csv", now.format("%Y-%m-%d"))
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
