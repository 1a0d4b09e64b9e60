//! `irt-pipeline` library crate.
//!
//! The `irtp` binary is a thin wrapper around this library: each subcommand
//! is a batch job that loads a run corpus, runs one estimator, and writes one
//! artifact. Estimators are plain functions over loaded runs so they can be
//! tested without touching the filesystem.

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod dif;
pub mod domain;
pub mod error;
pub mod io;
pub mod irt;
pub mod norms;
pub mod report;
pub mod stats;
pub mod telemetry;
