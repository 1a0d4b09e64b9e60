//! Shared result and configuration types.
//!
//! Output types are serializable with the camelCase field names consumers of
//! the calibration and norm-pack files expect.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Fixed-iteration gradient optimizer settings.
///
/// There is no convergence test: the optimizer always runs `iterations` steps,
/// which keeps output a deterministic function of the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    pub iterations: usize,
    pub learning_rate: f64,
}

impl OptimizerConfig {
    /// Defaults for 2PL calibration.
    pub const TWO_PL: OptimizerConfig = OptimizerConfig {
        iterations: 200,
        learning_rate: 0.05,
    };

    /// Defaults for logistic-regression DIF.
    pub const LOGISTIC_DIF: OptimizerConfig = OptimizerConfig {
        iterations: 80,
        learning_rate: 0.2,
    };
}

/// Calibrated 2PL parameters for one item. `c` is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemParameter {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

/// Output of a 2PL calibration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calibration {
    pub domain: String,
    pub params: BTreeMap<String, ItemParameter>,
    pub n_persons: usize,
}

/// ETS classification of Mantel-Haenszel DIF magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtsClass {
    /// Negligible: |delta| < 1.0
    A,
    /// Moderate: 1.0 <= |delta| < 1.5
    B,
    /// Large: |delta| >= 1.5
    C,
}

impl EtsClass {
    pub fn from_delta(delta: f64) -> Self {
        let d = delta.abs();
        if d >= 1.5 {
            EtsClass::C
        } else if d >= 1.0 {
            EtsClass::B
        } else {
            EtsClass::A
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EtsClass::A => "A",
            EtsClass::B => "B",
            EtsClass::C => "C",
        }
    }
}

/// Mantel-Haenszel result for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct MhItemResult {
    pub item_id: String,
    /// Common odds ratio (focal vs. reference), always > 0.
    pub alpha: f64,
    /// ETS delta scale; positive values disadvantage the focal group.
    pub delta_mh: f64,
    pub n_reference: usize,
    pub n_focal: usize,
}

impl MhItemResult {
    pub fn ets_class(&self) -> EtsClass {
        EtsClass::from_delta(self.delta_mh)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MhReport {
    pub reference: String,
    /// All non-reference labels, pooled as the focal group.
    pub focal: Vec<String>,
    /// Sorted by descending |delta_MH|.
    pub items: Vec<MhItemResult>,
}

/// Logistic-regression DIF coefficients for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticDifItem {
    pub item_id: String,
    /// Group coefficient (uniform DIF).
    pub b_group: f64,
    /// Score x group coefficient (non-uniform DIF).
    pub b_interaction: f64,
    pub n: usize,
}

impl LogisticDifItem {
    pub fn effect_size(&self) -> f64 {
        self.b_group.abs() + self.b_interaction.abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogisticDifReport {
    pub reference: String,
    pub focal: String,
    /// Sorted by descending `|b_group| + |b_interaction|`.
    pub items: Vec<LogisticDifItem>,
}

/// Linear map from the raw theta distribution onto the reporting scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThetaToIq {
    pub mean: f64,
    pub sd: f64,
    pub theta_mean: f64,
    pub theta_sd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormBand {
    pub id: String,
    pub label: String,
    pub theta_mean: f64,
    pub theta_sd: f64,
    pub n: usize,
}

/// Normative scoring pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormPack {
    pub version: String,
    pub created_at: String,
    pub notes: String,
    #[serde(rename = "thetaToIQ")]
    pub theta_to_iq: ThetaToIq,
    pub age_bands: Vec<NormBand>,
}

impl NormPack {
    /// Map a raw theta onto the pack's reporting scale.
    pub fn theta_to_iq(&self, theta: f64) -> f64 {
        let t = &self.theta_to_iq;
        t.mean + t.sd * (theta - t.theta_mean) / t.theta_sd
    }

    pub fn band(&self, id: &str) -> Option<&NormBand> {
        self.age_bands.iter().find(|b| b.id == id)
    }
}

/// `irtp calibrate` configuration.
#[derive(Debug, Clone)]
pub struct CalibrateConfig {
    pub input: PathBuf,
    pub domain: String,
    pub out: PathBuf,
    pub optimizer: OptimizerConfig,
}

/// `irtp dif-mh` / `irtp dif-logistic` configuration.
#[derive(Debug, Clone)]
pub struct DifConfig {
    pub input: PathBuf,
    /// Dotted path of the grouping attribute.
    pub group: String,
    pub domain: Option<String>,
    pub out: PathBuf,
    /// Only used by the logistic method.
    pub optimizer: OptimizerConfig,
}

/// `irtp norm-pack` configuration.
#[derive(Debug, Clone)]
pub struct NormConfig {
    pub input: PathBuf,
    pub out: PathBuf,
    pub version: Option<String>,
    pub band_path: String,
}

/// `irtp simulate` configuration.
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    pub out_dir: PathBuf,
    pub persons: usize,
    pub items: usize,
    pub domain: String,
    pub seed: u64,
    /// Dotted path written for the group attribute.
    pub group_path: String,
    /// Item index (0-based) that is harder for the focal group.
    pub dif_item: Option<usize>,
    /// Difficulty shift applied to `dif_item` for focal persons.
    pub dif_shift: f64,
    pub age_bands: Vec<String>,
}
