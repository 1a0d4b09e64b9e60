//! Per-subcommand pipelines: load the corpus, run the estimator, return the
//! computed outputs. Writing files and printing is left to `crate::app`.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::data::{SimulatedItem, item_bank, simulate_runs};
use crate::dif::{analyze_logistic, analyze_mh};
use crate::domain::{
    CalibrateConfig, Calibration, DifConfig, LogisticDifReport, MhReport, NormConfig, NormPack,
    SimulateConfig,
};
use crate::error::AppError;
use crate::io::{RunCorpus, load_runs};
use crate::irt::calibrate;
use crate::norms::build_norm_pack;

/// Corpus bookkeeping shared by every output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusStats {
    pub runs: usize,
    pub files_seen: usize,
    pub files_skipped: usize,
}

impl From<&RunCorpus> for CorpusStats {
    fn from(c: &RunCorpus) -> Self {
        CorpusStats {
            runs: c.runs.len(),
            files_seen: c.files_seen,
            files_skipped: c.files_skipped,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CalibrateOutput {
    pub corpus: CorpusStats,
    pub calibration: Calibration,
}

#[derive(Debug, Clone)]
pub struct MhOutput {
    pub corpus: CorpusStats,
    pub report: MhReport,
}

#[derive(Debug, Clone)]
pub struct LogisticOutput {
    pub corpus: CorpusStats,
    pub report: LogisticDifReport,
}

#[derive(Debug, Clone)]
pub struct NormOutput {
    pub corpus: CorpusStats,
    pub pack: NormPack,
}

#[derive(Debug, Clone)]
pub struct SimulateOutput {
    pub runs: Vec<serde_json::Value>,
    pub bank: Vec<SimulatedItem>,
}

pub fn run_calibrate(config: &CalibrateConfig) -> Result<CalibrateOutput, AppError> {
    let corpus = load_runs(&config.input)?;
    let calibration = calibrate(&corpus.runs, &config.domain, &config.optimizer)?;
    Ok(CalibrateOutput {
        corpus: CorpusStats::from(&corpus),
        calibration,
    })
}

pub fn run_mh(config: &DifConfig) -> Result<MhOutput, AppError> {
    let corpus = load_runs(&config.input)?;
    let report = analyze_mh(&corpus.runs, &config.group, config.domain.as_deref())?;
    Ok(MhOutput {
        corpus: CorpusStats::from(&corpus),
        report,
    })
}

pub fn run_logistic(config: &DifConfig) -> Result<LogisticOutput, AppError> {
    let corpus = load_runs(&config.input)?;
    let report = analyze_logistic(
        &corpus.runs,
        &config.group,
        config.domain.as_deref(),
        &config.optimizer,
    )?;
    Ok(LogisticOutput {
        corpus: CorpusStats::from(&corpus),
        report,
    })
}

/// `now` becomes the pack's creation time (and default version date).
pub fn run_norm_pack(config: &NormConfig, now: DateTime<Utc>) -> Result<NormOutput, AppError> {
    let corpus = load_runs(&config.input)?;
    let pack = build_norm_pack(&corpus.runs, &config.band_path, config.version.as_deref(), now)?;
    Ok(NormOutput {
        corpus: CorpusStats::from(&corpus),
        pack,
    })
}

pub fn run_simulate(config: &SimulateConfig) -> Result<SimulateOutput, AppError> {
    let runs = simulate_runs(config)?;
    info!(persons = runs.len(), items = config.items, seed = config.seed, "simulated corpus");
    Ok(SimulateOutput {
        runs,
        bank: item_bank(&config.domain, config.items),
    })
}
