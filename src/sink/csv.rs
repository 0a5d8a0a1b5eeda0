use std::fs;
use std::path::Path;

use anyhow::Result;
use csv::WriterBuilder;
use dialoguer::Confirm;

use crate::table::ReviewRecord;

// Written explicitly so even an empty run produces a header line.
const HEADER: [&str; 17] = [
    "hotel_id",
    "hotel_name",
    "source_name",
    "positive_text",
    "negative_text",
    "rating",
    "reviewer_name",
    "reviewer_country",
    "checkin_date",
    "review_created_date",
    "apartment_type",
    "length_of_stay_nights",
    "group_type",
    "partner_reply_text",
    "sentiment",
    "combined_review_text",
    "seen",
];

/// Result of a CSV write attempt.
pub enum CsvOutcome {
    Written(usize),
    Declined,
}

/// Write the full table, asking before clobbering an existing file.
/// Declining leaves the file untouched.
pub fn write(path: &Path, rows: &[ReviewRecord]) -> Result<CsvOutcome> {
    write_with_confirm(path, rows, prompt_overwrite)
}

fn prompt_overwrite(path: &Path) -> bool {
    Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", path.display()))
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn write_with_confirm(
    path: &Path,
    rows: &[ReviewRecord],
    confirm: impl FnOnce(&Path) -> bool,
) -> Result<CsvOutcome> {
    if path.exists() && !confirm(path) {
        return Ok(CsvOutcome::Declined);
    }
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(CsvOutcome::Written(rows.len()))
}

// ── Tests ──
