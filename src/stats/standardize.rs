//! Score standardization and small descriptive helpers.
//!
//! Three flavours of "mean and sd" show up in the pipeline and they are not
//! interchangeable:
//!
//! - `AbilityStandardizer`: sample sd (n-1), falling back to 1.0 when n <= 1 or
//!   the variance is zero. Used to turn raw domain scores into theta for 2PL.
//! - `zscore_population`: population sd (n). Used for the per-item score
//!   covariate in logistic DIF.
//! - `band_mean_sd`: divisor `max(1, n-1)`, sd 1.0 for zero variance. Used for
//!   norm bands.
//!
//! Thetas from `AbilityStandardizer` are only comparable within one corpus.

/// Added to the sd before dividing.
pub const SD_EPS: f64 = 1e-9;

/// Logistic function.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standardizes raw integer scores against their own sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityStandardizer {
    pub mean: f64,
    pub sd: f64,
}

impl AbilityStandardizer {
    pub fn fit(scores: &[u32]) -> Self {
        let n = scores.len();
        let values: Vec<f64> = scores.iter().map(|&s| f64::from(s)).collect();
        let mean = mean(&values);

        let sd = if n <= 1 {
            1.0
        } else {
            let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
            if var > 0.0 { var.sqrt() } else { 1.0 }
        };

        Self { mean, sd }
    }

    pub fn theta(&self, score: u32) -> f64 {
        (f64::from(score) - self.mean) / (self.sd + SD_EPS)
    }
}

/// Z-score `values` with their own mean and population sd.
pub fn zscore_population(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let m = mean(values);
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    let sd = var.sqrt();
    values.iter().map(|x| (x - m) / (sd + SD_EPS)).collect()
}

/// Mean and sd for a norm band.
///
/// Returns `None` for an empty slice.
pub fn band_mean_sd(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let m = mean(values);
    let denom = values.len().saturating_sub(1).max(1) as f64;
    let var = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / denom;
    let sd = if var > 0.0 { var.sqrt() } else { 1.0 };
    Some((m, sd))
}
