//! Cumulative zonal summary table
//!
//! One row per reference cell, one column per interpolated variable. The
//! table grows by column only: a column that is already present is never
//! recomputed or rewritten.

use biasgrid_core::io::{format_float, Table};
use biasgrid_core::Result;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::zonal::ZonalResult;
use crate::reference::{ID_FIELD, NO_REFERENCE_ID};

/// How a zonal column was merged into the summary table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The table did not exist and was created with this column
    Created,
    /// The column was joined onto the existing table
    Appended,
    /// The table already had the column; nothing was written
    AlreadyPresent,
}

/// Merge per-cell means as `column` into the summary table at `path`.
///
/// Rows for [`NO_REFERENCE_ID`] are dropped. When the table exists, the new
/// column is inner-joined on `GRIDMET_ID`, keeping the existing row order.
/// Cells without a mean are written as empty fields. Writes are atomic.
pub fn merge_zonal_column<P: AsRef<Path>>(
    path: P,
    column: &str,
    results: &[ZonalResult],
) -> Result<MergeOutcome> {
    let path = path.as_ref();
    let means: Vec<(i64, f64)> = results
        .iter()
        .filter(|r| r.zone_id != NO_REFERENCE_ID)
        .map(|r| (r.zone_id, r.mean.unwrap_or(f64::NAN)))
        .collect();

    if !path.exists() {
        let mut table = Table::new([ID_FIELD, column]);
        for &(id, mean) in &means {
            table.push_row(vec![id.to_string(), format_float(mean)])?;
        }
        table.write_csv(path)?;
        info!("created {} with column {} ({} cells)", path.display(), column, table.len());
        return Ok(MergeOutcome::Created);
    }

    let existing = Table::read_csv(path)?;
    if existing.has_column(column) {
        info!("{} already has column {}, leaving it unchanged", path.display(), column);
        return Ok(MergeOutcome::AlreadyPresent);
    }

    let mut by_id: HashMap<i64, f64> = HashMap::with_capacity(means.len());
    for &(id, mean) in &means {
        by_id.entry(id).or_insert(mean);
    }

    let ids = existing.i64_column(ID_FIELD)?;
    let mut headers = existing.headers().to_vec();
    headers.push(column.to_string());
    let mut merged = Table::new(headers);
    for (id, row) in ids.iter().zip(existing.rows()) {
        if let Some(&mean) = by_id.get(id) {
            let mut row = row.clone();
            row.push(format_float(mean));
            merged.push_row(row)?;
        }
    }

    let dropped = existing.len() - merged.len();
    if dropped > 0 {
        debug!("{} rows of {} have no cell in the grid and were dropped", dropped, path.display());
    }

    merged.write_csv(path)?;
    info!("added column {} to {}", column, path.display());
    Ok(MergeOutcome::Appended)
}
