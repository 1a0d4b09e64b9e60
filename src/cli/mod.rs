//! Command-line parsing for `irtp`.
//!
//! Argument structs stay separate from the config structs the estimators take;
//! `crate::app` converts between them.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::norms::DEFAULT_BAND_PATH;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "irtp",
    version,
    about = "Psychometric batch pipeline: 2PL calibration, DIF screening, norm packs"
)]
pub struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit 2PL item parameters for one domain and write calibration JSON.
    Calibrate(CalibrateArgs),
    /// Mantel-Haenszel DIF screen; writes a CSV report.
    DifMh(DifArgs),
    /// Logistic-regression DIF screen for a two-group attribute; writes a CSV report.
    DifLogistic(LogisticArgs),
    /// Build a norm pack from composite thetas and write it as JSON.
    NormPack(NormPackArgs),
    /// Generate a synthetic run corpus from a known item bank.
    Simulate(SimulateArgs),
}

#[derive(Debug, Args, Clone)]
pub struct CalibrateArgs {
    /// Run JSON file or directory of run files.
    #[arg(short, long, env = "IRTP_INPUT")]
    pub input: PathBuf,

    /// Domain to calibrate.
    #[arg(short, long)]
    pub domain: String,

    /// Output calibration JSON.
    #[arg(short, long)]
    pub out: PathBuf,

    /// Gradient ascent iterations per item.
    #[arg(long, default_value_t = 200)]
    pub iterations: usize,

    /// Gradient ascent step size.
    #[arg(long, default_value_t = 0.05)]
    pub learning_rate: f64,
}

#[derive(Debug, Args, Clone)]
pub struct DifArgs {
    /// Run JSON file or directory of run files.
    #[arg(short, long, env = "IRTP_INPUT")]
    pub input: PathBuf,

    /// Dotted path of the grouping attribute (e.g. demographics.language).
    #[arg(short, long)]
    pub group: String,

    /// Restrict to one domain.
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Output CSV.
    #[arg(short, long)]
    pub out: PathBuf,

    /// Rows shown in the terminal summary.
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

#[derive(Debug, Args, Clone)]
pub struct LogisticArgs {
    #[command(flatten)]
    pub dif: DifArgs,

    /// Gradient descent iterations per item.
    #[arg(long, default_value_t = 80)]
    pub iterations: usize,

    /// Gradient descent step size.
    #[arg(long, default_value_t = 0.2)]
    pub learning_rate: f64,
}

#[derive(Debug, Args, Clone)]
pub struct NormPackArgs {
    /// Run JSON file or directory of run files.
    #[arg(short, long, env = "IRTP_INPUT")]
    pub input: PathBuf,

    /// Output norm pack JSON.
    #[arg(short, long)]
    pub out: PathBuf,

    /// Pack version (default: normpack-YYYYMMDD).
    #[arg(long)]
    pub version: Option<String>,

    /// Dotted path of the band attribute.
    #[arg(long, default_value = DEFAULT_BAND_PATH)]
    pub band: String,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Directory to write run files into.
    #[arg(long)]
    pub out_dir: PathBuf,

    #[arg(long, default_value_t = 300)]
    pub persons: usize,

    #[arg(long, default_value_t = 20)]
    pub items: usize,

    #[arg(long, default_value = "math")]
    pub domain: String,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Dotted path written for the group attribute.
    #[arg(long, default_value = "demographics.language")]
    pub group: String,

    /// 1-based item number that is harder for group B.
    #[arg(long)]
    pub dif_item: Option<usize>,

    /// Difficulty shift applied to the DIF item for group B.
    #[arg(long, default_value_t = 1.0)]
    pub dif_shift: f64,

    /// Age bands to assign (comma separated).
    #[arg(
        long,
        value_delimiter = ',',
        default_values = ["18-29", "30-44", "45-64", "65+"]
    )]
    pub age_bands: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_calibrate_with_defaults() {
        let cli = Cli::parse_from([
            "irtp", "calibrate", "--input", "runs", "--domain", "math", "--out", "p.json",
        ]);
        assert!(!cli.verbose);
        let Command::Calibrate(args) = cli.command else {
            panic!("expected calibrate");
        };
        assert_eq!(args.domain, "math");
        assert_eq!(args.iterations, 200);
        assert!((args.learning_rate - 0.05).abs() < 1e-12);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "irtp", "dif-mh", "-i", "runs", "-g", "demographics.language", "-o", "mh.csv", "-v",
            "--json-logs",
        ]);
        assert!(cli.verbose && cli.json_logs);
        let Command::DifMh(args) = cli.command else {
            panic!("expected dif-mh");
        };
        assert_eq!(args.group, "demographics.language");
        assert_eq!(args.domain, None);
    }

    #[test]
    fn logistic_flattens_dif_args() {
        let cli = Cli::parse_from([
            "irtp", "dif-logistic", "-i", "runs", "-g", "g", "-o", "lr.csv", "--domain", "verbal",
            "--iterations", "10",
        ]);
        let Command::DifLogistic(args) = cli.command else {
            panic!("expected dif-logistic");
        };
        assert_eq!(args.dif.domain.as_deref(), Some("verbal"));
        assert_eq!(args.iterations, 10);
        assert!((args.learning_rate - 0.2).abs() < 1e-12);
    }

    #[test]
    fn norm_pack_band_default() {
        let cli = Cli::parse_from(["irtp", "norm-pack", "-i", "runs", "-o", "pack.json"]);
        let Command::NormPack(args) = cli.command else {
            panic!("expected norm-pack");
        };
        assert_eq!(args.band, "demographics.ageBandId");
        assert_eq!(args.version, None);
    }

    #[test]
    fn simulate_age_band_list() {
        let cli = Cli::parse_from([
            "irtp", "simulate", "--out-dir", "corpus", "--age-bands", "a,b", "--dif-item", "3",
        ]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.age_bands, vec!["a", "b"]);
        assert_eq!(args.dif_item, Some(3));
        assert_eq!(args.persons, 300);
    }
}
