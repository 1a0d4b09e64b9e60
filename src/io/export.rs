//! DIF report CSV exports.
//!
//! Numeric fields are written with four decimals; rows keep the report order
//! (descending effect size).

use std::io::Write;
use std::path::Path;

use crate::domain::{LogisticDifReport, MhReport};
use crate::error::AppError;

/// Write the Mantel-Haenszel report (`itemId,MH_alpha,delta_MH`).
pub fn write_mh_csv(path: &Path, report: &MhReport) -> Result<(), AppError> {
    let mut w = csv_writer(path)?;
    write_mh_rows(&mut w, report)?;
    w.flush()
        .map_err(|e| AppError::input(format!("Failed to flush '{}': {e}", path.display())))
}

/// Write the logistic DIF report
/// (`itemId,b_group_uniform,b_interaction_nonuniform,n`).
pub fn write_logistic_csv(path: &Path, report: &LogisticDifReport) -> Result<(), AppError> {
    let mut w = csv_writer(path)?;
    write_logistic_rows(&mut w, report)?;
    w.flush()
        .map_err(|e| AppError::input(format!("Failed to flush '{}': {e}", path.display())))
}

fn csv_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, AppError> {
    csv::Writer::from_path(path)
        .map_err(|e| AppError::input(format!("Failed to create CSV '{}': {e}", path.display())))
}

fn write_mh_rows<W: Write>(w: &mut csv::Writer<W>, report: &MhReport) -> Result<(), AppError> {
    w.write_record(["itemId", "MH_alpha", "delta_MH"])
        .map_err(|e| AppError::input(format!("Failed to write CSV header: {e}")))?;
    for r in &report.items {
        w.write_record([
            r.item_id.clone(),
            format!("{:.4}", r.alpha),
            format!("{:.4}", r.delta_mh),
        ])
        .map_err(|e| AppError::input(format!("Failed to write CSV row: {e}")))?;
    }
    Ok(())
}

fn write_logistic_rows<W: Write>(
    w: &mut csv::Writer<W>,
    report: &LogisticDifReport,
) -> Result<(), AppError> {
    w.write_record(["itemId", "b_group_uniform", "b_interaction_nonuniform", "n"])
        .map_err(|e| AppError::input(format!("Failed to write CSV header: {e}")))?;
    for r in &report.items {
        w.write_record([
            r.item_id.clone(),
            format!("{:.4}", r.b_group),
            format!("{:.4}", r.b_interaction),
            r.n.to_string(),
        ])
        .map_err(|e| AppError::input(format!("Failed to write CSV row: {e}")))?;
    }
    Ok(())
}
