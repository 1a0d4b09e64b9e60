//! Logistic-regression DIF.
//!
//! Per item we fit
//!
//! ```text
//! logit P(correct) = w0 + w1·s + w2·g + w3·(s·g)
//! ```
//!
//! where `s` is the run-level domain score z-scored over the item's own rows
//! (population sd) and `g` is 1 for the focal group. `w2` measures uniform DIF,
//! `w3` non-uniform DIF. The fit is plain batch gradient descent on log-loss
//! from zero weights for a fixed number of iterations.

use nalgebra::{DMatrix, DVector};
use tracing::info;

use crate::aggregate::{DifRow, dif_rows, group_runs};
use crate::dif::MIN_ITEM_ROWS;
use crate::domain::{LogisticDifItem, LogisticDifReport, OptimizerConfig, Run};
use crate::error::AppError;
use crate::stats::{sigmoid, zscore_population};

const N_COLS: usize = 4;

/// Design matrix `[1, s, g, s·g]` and response vector for one item.
pub fn design_matrix(rows: &[DifRow]) -> (DMatrix<f64>, DVector<f64>) {
    let scores: Vec<f64> = rows.iter().map(|r| f64::from(r.score)).collect();
    let s = zscore_population(&scores);

    let x = DMatrix::from_fn(rows.len(), N_COLS, |i, j| {
        let g = if rows[i].focal { 1.0 } else { 0.0 };
        match j {
            0 => 1.0,
            1 => s[i],
            2 => g,
            _ => s[i] * g,
        }
    });
    let y = DVector::from_iterator(rows.len(), rows.iter().map(|r| f64::from(r.outcome)));
    (x, y)
}

/// Batch gradient descent on the mean log-loss, starting from zero weights.
pub fn fit_logistic(x: &DMatrix<f64>, y: &DVector<f64>, optimizer: &OptimizerConfig) -> DVector<f64> {
    let mut w = DVector::<f64>::zeros(x.ncols());
    let n = y.len();
    if n == 0 {
        return w;
    }

    for _ in 0..optimizer.iterations {
        let p = (x * &w).map(sigmoid);
        let grad = x.tr_mul(&(p - y)) / n as f64;
        w -= grad * optimizer.learning_rate;
    }
    w
}

/// Run logistic-regression DIF over a corpus.
///
/// Exactly two group labels are required. They are sorted; the first is the
/// reference group (`g = 0`), the second the focal group (`g = 1`).
pub fn analyze_logistic(
    runs: &[Run],
    group_path: &str,
    domain_filter: Option<&str>,
    optimizer: &OptimizerConfig,
) -> Result<LogisticDifReport, AppError> {
    let grouped = group_runs(runs, group_path);
    let mut labels: Vec<&str> = grouped.labels();
    labels.sort_unstable();
    let [reference, focal] = labels[..] else {
        return Err(AppError::insufficient(format!(
            "Expected a binary group for logistic DIF. Found labels: {labels:?}"
        )));
    };

    let items = dif_rows(&grouped, reference, domain_filter);

    let mut results = Vec::new();
    for (item_id, rows) in &items {
        if rows.len() < MIN_ITEM_ROWS {
            continue;
        }
        let (x, y) = design_matrix(rows);
        let w = fit_logistic(&x, &y, optimizer);
        results.push(LogisticDifItem {
            item_id: item_id.clone(),
            b_group: w[2],
            b_interaction: w[3],
            n: rows.len(),
        });
    }

    results.sort_by(|a, b| {
        b.effect_size()
            .partial_cmp(&a.effect_size())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.item_id.cmp(&b.item_id))
    });

    info!(
        reference,
        focal,
        items = results.len(),
        "logistic DIF analysis complete"
    );

    Ok(LogisticDifReport {
        reference: reference.to_string(),
        focal: focal.to_string(),
        items: results,
    })
}
