//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - run records and their response events (`Run`, `ResponseEvent`, `Outcome`)
//! - estimator outputs (`Calibration`, `MhReport`, `LogisticDifReport`, `NormPack`)
//! - per-subcommand configuration (`CalibrateConfig`, `DifConfig`, ...)

pub mod run;
pub mod types;

pub use run::*;
pub use types::*;
