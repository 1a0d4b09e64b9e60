//! Mantel-Haenszel DIF.
//!
//! For each item, responses are stratified by `(domain, run-level domain
//! score)` and split into a 2x2 table per stratum:
//!
//! ```text
//!                correct  incorrect
//! focal             A         B
//! reference         C         D
//! ```
//!
//! The common odds ratio is `alpha = Σ(A·D/N) / Σ(B·C/N)` over strata with
//! `N > 0`, reported on the ETS delta scale as `-2.35 · ln(alpha)`. Positive
//! delta means the item is harder for the focal group at equal score.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::aggregate::{DifRow, dif_rows, group_runs};
use crate::dif::MIN_ITEM_ROWS;
use crate::domain::{MhItemResult, MhReport, Run};
use crate::error::AppError;

/// ETS delta-scale multiplier applied to `ln(alpha)`.
pub const ETS_DELTA_SCALE: f64 = -2.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupRole {
    Focal,
    Reference,
}

/// Stratum key: domain plus the run-level domain score.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Stratum {
    pub domain: Option<String>,
    pub score: u32,
}

/// Zero-initialised contingency counts for one `(stratum, role)` key.
///
/// Focal rows only touch `a`/`b`, reference rows only `c`/`d`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StratumCell {
    pub a: u64,
    pub b: u64,
    pub c: u64,
    pub d: u64,
}

impl StratumCell {
    fn record(&mut self, role: GroupRole, correct: bool) {
        match (role, correct) {
            (GroupRole::Focal, true) => self.a += 1,
            (GroupRole::Focal, false) => self.b += 1,
            (GroupRole::Reference, true) => self.c += 1,
            (GroupRole::Reference, false) => self.d += 1,
        }
    }
}

/// Contingency counts for one item, keyed by `(stratum, role)`.
pub fn stratified_cells(rows: &[DifRow]) -> BTreeMap<(Stratum, GroupRole), StratumCell> {
    let mut cells: BTreeMap<(Stratum, GroupRole), StratumCell> = BTreeMap::new();
    for row in rows {
        let role = if row.focal {
            GroupRole::Focal
        } else {
            GroupRole::Reference
        };
        let key = (
            Stratum {
                domain: row.domain.clone(),
                score: row.score,
            },
            role,
        );
        cells.entry(key).or_default().record(role, row.outcome == 1);
    }
    cells
}

/// Mantel-Haenszel common odds ratio.
///
/// Returns `None` when the numerator or denominator is not strictly positive.
pub fn common_odds_ratio(cells: &BTreeMap<(Stratum, GroupRole), StratumCell>) -> Option<f64> {
    // Combine the focal and reference cells of each stratum into one table.
    let mut tables: BTreeMap<&Stratum, StratumCell> = BTreeMap::new();
    for ((stratum, _), cell) in cells {
        let t = tables.entry(stratum).or_default();
        t.a += cell.a;
        t.b += cell.b;
        t.c += cell.c;
        t.d += cell.d;
    }

    let mut num = 0.0;
    let mut den = 0.0;
    for t in tables.values() {
        let n = (t.a + t.b + t.c + t.d) as f64;
        if n <= 0.0 {
            continue;
        }
        num += (t.a * t.d) as f64 / n;
        den += (t.b * t.c) as f64 / n;
    }

    if den > 0.0 && num > 0.0 {
        Some(num / den)
    } else {
        None
    }
}

pub fn delta_mh(alpha: f64) -> f64 {
    ETS_DELTA_SCALE * alpha.ln()
}

/// Run Mantel-Haenszel DIF over a corpus.
///
/// The label with the most runs is the reference group; every other label is
/// pooled as focal.
pub fn analyze_mh(
    runs: &[Run],
    group_path: &str,
    domain_filter: Option<&str>,
) -> Result<MhReport, AppError> {
    let grouped = group_runs(runs, group_path);
    if grouped.is_empty() {
        return Err(AppError::insufficient(format!(
            "No runs found with group attribute '{group_path}'."
        )));
    }
    let labels = grouped.labels();
    if labels.len() < 2 {
        return Err(AppError::insufficient(format!(
            "DIF needs two groups; '{group_path}' only has {labels:?}."
        )));
    }
    if labels.len() > 2 {
        warn!(
            groups = labels.len(),
            "more than two group labels; pooling all non-reference labels as focal"
        );
    }

    let reference = grouped
        .largest_group()
        .map(str::to_string)
        .ok_or_else(|| AppError::insufficient("No reference group could be selected."))?;
    let focal: Vec<String> = labels
        .iter()
        .filter(|l| **l != reference)
        .map(|l| l.to_string())
        .collect();

    let items = dif_rows(&grouped, &reference, domain_filter);

    let mut results = Vec::new();
    for (item_id, rows) in &items {
        if rows.len() < MIN_ITEM_ROWS {
            continue;
        }
        let cells = stratified_cells(rows);
        let Some(alpha) = common_odds_ratio(&cells) else {
            continue;
        };
        let n_focal = rows.iter().filter(|r| r.focal).count();
        results.push(MhItemResult {
            item_id: item_id.clone(),
            alpha,
            delta_mh: delta_mh(alpha),
            n_reference: rows.len() - n_focal,
            n_focal,
        });
    }

    results.sort_by(|x, y| {
        y.delta_mh
            .abs()
            .partial_cmp(&x.delta_mh.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.item_id.cmp(&y.item_id))
    });

    info!(
        reference = %reference,
        items = results.len(),
        candidates = items.len(),
        "Mantel-Haenszel analysis complete"
    );

    Ok(MhReport {
        reference,
        focal,
        items: results,
    })
}
