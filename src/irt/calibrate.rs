//! Two-parameter logistic calibration by batch gradient ascent.
//!
//! The model is
//!
//! ```text
//! P(correct | theta) = sigmoid(a * (theta - b))
//! ```
//!
//! with theta held fixed at each person's standardized domain score. Every
//! iteration takes one averaged gradient step on the Bernoulli log-likelihood
//! and then clamps `a` into `[A_MIN, A_MAX]` and `b` into `[B_MIN, B_MAX]`.
//! The clamp keeps separable and near-constant items finite; such items end up
//! on a bound rather than raising an error.

use tracing::{debug, info};

use crate::aggregate::{calibration_data, person_records};
use crate::domain::{Calibration, ItemParameter, OptimizerConfig, Run};
use crate::error::AppError;
use crate::stats::sigmoid;

/// Qualifying persons required before any item is calibrated.
pub const MIN_PERSONS: usize = 80;
/// Observations required for an item to be calibrated.
pub const MIN_ITEM_OBSERVATIONS: usize = 120;

pub const A_MIN: f64 = 0.2;
pub const A_MAX: f64 = 3.0;
pub const B_MIN: f64 = -4.0;
pub const B_MAX: f64 = 4.0;

/// Predicted probabilities are clipped to `[P_EPS, 1 - P_EPS]`.
const P_EPS: f64 = 1e-6;

/// Fit `(a, b)` for one item from `(theta, outcome)` observations.
///
/// Starts from `a = 1, b = 0` and always runs `optimizer.iterations` steps.
/// An empty slice returns the starting point.
pub fn fit_item(observations: &[(f64, u8)], optimizer: &OptimizerConfig) -> ItemParameter {
    let mut a = 1.0_f64;
    let mut b = 0.0_f64;

    if observations.is_empty() {
        return ItemParameter { a, b, c: 0.0 };
    }
    let n = observations.len() as f64;

    for _ in 0..optimizer.iterations {
        let mut da = 0.0;
        let mut db = 0.0;
        for &(theta, u) in observations {
            let p = sigmoid(a * (theta - b)).clamp(P_EPS, 1.0 - P_EPS);
            let r = f64::from(u) - p;
            da += r * (theta - b);
            db += r * (-a);
        }
        a += optimizer.learning_rate * da / n;
        b += optimizer.learning_rate * db / n;
        a = a.clamp(A_MIN, A_MAX);
        b = b.clamp(B_MIN, B_MAX);
    }

    ItemParameter { a, b, c: 0.0 }
}

/// Calibrate every item in `domain` with enough observations.
///
/// Fails when fewer than `MIN_PERSONS` runs have at least
/// `MIN_SCORED_RESPONSES` scored responses in the domain. Items below
/// `MIN_ITEM_OBSERVATIONS` are left out of the result.
pub fn calibrate(
    runs: &[Run],
    domain: &str,
    optimizer: &OptimizerConfig,
) -> Result<Calibration, AppError> {
    let persons = person_records(runs, domain);
    if persons.len() < MIN_PERSONS {
        return Err(AppError::insufficient(format!(
            "Need more runs for calibration: {} qualifying persons in domain '{domain}' (minimum {MIN_PERSONS}).",
            persons.len()
        )));
    }

    let data = calibration_data(&persons);
    debug!(
        score_mean = data.standardizer.mean,
        score_sd = data.standardizer.sd,
        "standardized domain scores"
    );

    let mut params = std::collections::BTreeMap::new();
    let mut skipped = 0usize;
    for (item_id, observations) in &data.items {
        if observations.len() < MIN_ITEM_OBSERVATIONS {
            skipped += 1;
            continue;
        }
        params.insert(item_id.clone(), fit_item(observations, optimizer));
    }

    info!(
        domain,
        persons = data.n_persons,
        items = params.len(),
        skipped,
        "calibration complete"
    );

    Ok(Calibration {
        domain: domain.to_string(),
        params,
        n_persons: data.n_persons,
    })
}
