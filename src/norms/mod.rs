//! Normative scoring packs.
//!
//! A pack records the raw composite-theta distribution (overall and per age
//! band) next to the target reporting scale (mean 100, sd 15). Applying the
//! linear transform is left to consumers; `NormPack::theta_to_iq` is the
//! reference implementation.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::domain::{NormBand, NormPack, Run, ThetaToIq};
use crate::error::AppError;
use crate::stats::band_mean_sd;

pub const IQ_MEAN: f64 = 100.0;
pub const IQ_SD: f64 = 15.0;

/// Default dotted path of the age-band attribute.
pub const DEFAULT_BAND_PATH: &str = "demographics.ageBandId";
/// Band used for runs without a band attribute.
pub const OVERALL_BAND: &str = "overall";

const NOTES: &str =
    "Generated from collected runs. Non-clinical. Ensure ethical consent and representativeness.";

/// `normpack-YYYYMMDD` for the given instant (UTC).
pub fn default_version(now: DateTime<Utc>) -> String {
    format!("normpack-{}", now.format("%Y%m%d"))
}

/// Build a norm pack from runs carrying `summary.composite.theta`.
///
/// Pure in its inputs: the version label and creation time are passed in.
pub fn build_norm_pack(
    runs: &[Run],
    band_path: &str,
    version: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<NormPack, AppError> {
    let mut thetas = Vec::new();
    let mut by_band: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for run in runs {
        let Some(theta) = run.composite_theta else {
            continue;
        };
        let band = run.label(band_path).unwrap_or_else(|| OVERALL_BAND.to_string());
        thetas.push(theta);
        by_band.entry(band).or_default().push(theta);
    }

    let Some((theta_mean, theta_sd)) = band_mean_sd(&thetas) else {
        return Err(AppError::insufficient("No runs found with composite theta."));
    };

    let age_bands: Vec<NormBand> = by_band
        .into_iter()
        .filter_map(|(id, values)| {
            band_mean_sd(&values).map(|(m, sd)| NormBand {
                label: id.clone(),
                id,
                theta_mean: m,
                theta_sd: sd,
                n: values.len(),
            })
        })
        .collect();

    info!(
        runs = thetas.len(),
        bands = age_bands.len(),
        theta_mean,
        theta_sd,
        "norm pack built"
    );

    Ok(NormPack {
        version: version
            .map(str::to_string)
            .unwrap_or_else(|| default_version(created_at)),
        created_at: created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        notes: NOTES.to_string(),
        theta_to_iq: ThetaToIq {
            mean: IQ_MEAN,
            sd: IQ_SD,
            theta_mean,
            theta_sd,
        },
        age_bands,
    })
}
