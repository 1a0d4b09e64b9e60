//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module parses arguments,
//! installs logging, runs the selected pipeline, writes its artifact, and
//! prints the terminal summary.

use clap::Parser;
use tracing::Level;

use crate::cli::{CalibrateArgs, Cli, Command, DifArgs, LogisticArgs, NormPackArgs, SimulateArgs};
use crate::domain::{
    CalibrateConfig, DifConfig, NormConfig, OptimizerConfig, SimulateConfig,
};
use crate::error::AppError;
use crate::io::{
    write_calibration_json, write_logistic_csv, write_mh_csv, write_norm_pack_json, write_runs,
};
use crate::report::{
    format_calibration_summary, format_logistic_summary, format_mh_summary, format_norm_summary,
};

pub mod pipeline;

/// Entry point for the `irtp` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    crate::telemetry::init_tracing(cli.json_logs, level);

    match cli.command {
        Command::Calibrate(args) => handle_calibrate(&args),
        Command::DifMh(args) => handle_mh(&args),
        Command::DifLogistic(args) => handle_logistic(&args),
        Command::NormPack(args) => handle_norm_pack(&args),
        Command::Simulate(args) => handle_simulate(&args),
    }
}

fn handle_calibrate(args: &CalibrateArgs) -> Result<(), AppError> {
    let config = calibrate_config_from_args(args)?;
    let out = pipeline::run_calibrate(&config)?;

    write_calibration_json(&config.out, &out.calibration)?;
    println!(
        "Wrote {} ({} items, {} persons)",
        config.out.display(),
        out.calibration.params.len(),
        out.calibration.n_persons
    );
    println!("{}", format_calibration_summary(&out.calibration));
    Ok(())
}

fn handle_mh(args: &DifArgs) -> Result<(), AppError> {
    let config = dif_config_from_args(args, OptimizerConfig::LOGISTIC_DIF)?;
    let out = pipeline::run_mh(&config)?;

    write_mh_csv(&config.out, &out.report)?;
    println!("Wrote {} ({} items)", config.out.display(), out.report.items.len());
    println!("{}", format_mh_summary(&out.report, args.top));
    Ok(())
}

fn handle_logistic(args: &LogisticArgs) -> Result<(), AppError> {
    let optimizer = optimizer_from_args(args.iterations, args.learning_rate)?;
    let config = dif_config_from_args(&args.dif, optimizer)?;
    let out = pipeline::run_logistic(&config)?;

    write_logistic_csv(&config.out, &out.report)?;
    println!("Wrote {} ({} items)", config.out.display(), out.report.items.len());
    println!("{}", format_logistic_summary(&out.report, args.dif.top));
    Ok(())
}

fn handle_norm_pack(args: &NormPackArgs) -> Result<(), AppError> {
    let config = norm_config_from_args(args)?;
    let out = pipeline::run_norm_pack(&config, chrono::Utc::now())?;

    write_norm_pack_json(&config.out, &out.pack)?;
    println!(
        "Wrote {} ({} bands, version {})",
        config.out.display(),
        out.pack.age_bands.len(),
        out.pack.version
    );
    println!("{}", format_norm_summary(&out.pack));
    Ok(())
}

fn handle_simulate(args: &SimulateArgs) -> Result<(), AppError> {
    let config = simulate_config_from_args(args)?;
    let out = pipeline::run_simulate(&config)?;

    let written = write_runs(&config.out_dir, &out.runs)?;
    println!("Wrote {written} run files to {}", config.out_dir.display());
    if let Some(i) = config.dif_item {
        if let Some(item) = out.bank.get(i) {
            println!(
                "DIF item: {} (b={:.3}, +{:.3} for group {})",
                item.id,
                item.b,
                config.dif_shift,
                crate::data::FOCAL_LABEL
            );
        }
    }
    Ok(())
}

fn optimizer_from_args(iterations: usize, learning_rate: f64) -> Result<OptimizerConfig, AppError> {
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(AppError::input("Learning rate must be a positive finite number."));
    }
    Ok(OptimizerConfig {
        iterations,
        learning_rate,
    })
}

fn non_empty(value: &str, what: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::input(format!("{what} must not be empty.")));
    }
    Ok(())
}

pub fn calibrate_config_from_args(args: &CalibrateArgs) -> Result<CalibrateConfig, AppError> {
    non_empty(&args.domain, "Domain")?;
    Ok(CalibrateConfig {
        input: args.input.clone(),
        domain: args.domain.clone(),
        out: args.out.clone(),
        optimizer: optimizer_from_args(args.iterations, args.learning_rate)?,
    })
}

pub fn dif_config_from_args(args: &DifArgs, optimizer: OptimizerConfig) -> Result<DifConfig, AppError> {
    non_empty(&args.group, "Group path")?;
    Ok(DifConfig {
        input: args.input.clone(),
        group: args.group.clone(),
        domain: args.domain.clone(),
        out: args.out.clone(),
        optimizer,
    })
}

pub fn norm_config_from_args(args: &NormPackArgs) -> Result<NormConfig, AppError> {
    non_empty(&args.band, "Band path")?;
    Ok(NormConfig {
        input: args.input.clone(),
        out: args.out.clone(),
        version: args.version.clone(),
        band_path: args.band.clone(),
    })
}

pub fn simulate_config_from_args(args: &SimulateArgs) -> Result<SimulateConfig, AppError> {
    let dif_item = match args.dif_item {
        Some(0) => return Err(AppError::input("--dif-item is 1-based.")),
        Some(n) => Some(n - 1),
        None => None,
    };
    Ok(SimulateConfig {
        out_dir: args.out_dir.clone(),
        persons: args.persons,
        items: args.items,
        domain: args.domain.clone(),
        seed: args.seed,
        group_path: args.group.clone(),
        dif_item,
        dif_shift: args.dif_shift,
        age_bands: args.age_bands.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Command {
        Cli::parse_from(argv.iter().copied()).command
    }

    #[test]
    fn calibrate_config_carries_optimizer() {
        let Command::Calibrate(args) = parse(&[
            "irtp", "calibrate", "-i", "runs", "-d", "math", "-o", "p.json", "--iterations", "50",
        ]) else {
            panic!("expected calibrate");
        };
        let config = calibrate_config_from_args(&args).unwrap();
        assert_eq!(config.optimizer.iterations, 50);
        assert!((config.optimizer.learning_rate - 0.05).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_learning_rate() {
        let Command::Calibrate(args) = parse(&[
            "irtp", "calibrate", "-i", "runs", "-d", "math", "-o", "p.json", "--learning-rate", "0",
        ]) else {
            panic!("expected calibrate");
        };
        let err = calibrate_config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
    }

    #[test]
    fn simulate_dif_item_is_one_based() {
        let Command::Simulate(args) =
            parse(&["irtp", "simulate", "--out-dir", "c", "--dif-item", "4"])
        else {
            panic!("expected simulate");
        };
        assert_eq!(simulate_config_from_args(&args).unwrap().dif_item, Some(3));

        let Command::Simulate(args) =
            parse(&["irtp", "simulate", "--out-dir", "c", "--dif-item", "0"])
        else {
            panic!("expected simulate");
        };
        assert!(simulate_config_from_args(&args).is_err());
    }

    #[test]
    fn empty_group_path_rejected() {
        let Command::DifMh(args) = parse(&["irtp", "dif-mh", "-i", "r", "-g", " ", "-o", "x.csv"])
        else {
            panic!("expected dif-mh");
        };
        assert!(dif_config_from_args(&args, OptimizerConfig::LOGISTIC_DIF).is_err());
    }
}
